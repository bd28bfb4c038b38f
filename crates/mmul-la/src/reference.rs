use crate::{blas, host, LaError, Matrix};
use std::fmt;
use std::str::FromStr;

/// Which routine produces the reference product C.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reference {
    /// `cblas_sgemm` from the linked BLAS.
    Blas,
    /// Portable host loops (`host::gemm_blocked`).
    Host,
    /// Skip the reference; results are not checked.
    Disabled,
}

impl Reference {
    /// The best reference this build can run.
    pub fn available() -> Self {
        if blas::AVAILABLE {
            Self::Blas
        } else {
            Self::Host
        }
    }

    pub fn is_enabled(self) -> bool {
        self != Self::Disabled
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Blas => "blas",
            Self::Host => "host",
            Self::Disabled => "none",
        }
    }

    /// Compute C = A * B. C is overwritten.
    pub fn run(self, a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<(), LaError> {
        match self {
            Self::Blas => {
                // C starts at zero, so beta = 1 reproduces a plain product.
                c.fill_zero();
                blas::gemm(a, b, c, 1.0, 1.0)
            }
            Self::Host => host::gemm_blocked(a, b, c),
            Self::Disabled => Ok(()),
        }
    }
}

impl Default for Reference {
    fn default() -> Self {
        Self::available()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Reference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blas" | "cblas" => Ok(Self::Blas),
            "host" | "cpu" => Ok(Self::Host),
            "none" | "off" => Ok(Self::Disabled),
            other => Err(format!("unknown reference `{other}` (expected blas, host or none)")),
        }
    }
}
