use crate::LaError;

/// First element where the candidate disagrees with the reference.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mismatch {
    pub index: usize,
    pub reference: f32,
    pub candidate: f32,
}

/// Element-wise comparison of a candidate product against the reference.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckReport {
    pub len: usize,
    pub tolerance: f32,
    pub max_abs_err: f32,
    pub max_rel_err: f32,
    pub mismatches: usize,
    pub first_mismatch: Option<Mismatch>,
}

impl CheckReport {
    /// True when every element is within tolerance.
    pub fn matched(&self) -> bool {
        self.mismatches == 0
    }
}

/// Compare `candidate` against `reference`.
///
/// An element passes when `|r - c| <= tolerance * max(1, |r|)`; NaN never passes.
pub fn check_result(reference: &[f32], candidate: &[f32], tolerance: f32) -> Result<CheckReport, LaError> {
    if reference.len() != candidate.len() {
        return Err(LaError::LengthMismatch {
            expected: reference.len(),
            actual: candidate.len(),
        });
    }

    let mut report = CheckReport {
        len: reference.len(),
        tolerance,
        max_abs_err: 0.0,
        max_rel_err: 0.0,
        mismatches: 0,
        first_mismatch: None,
    };

    for (index, (&r, &c)) in reference.iter().zip(candidate).enumerate() {
        let abs = (r - c).abs();
        let scale = r.abs().max(1.0);
        let within = abs <= tolerance * scale;
        if abs.is_nan() {
            report.max_abs_err = f32::NAN;
            report.max_rel_err = f32::NAN;
        } else if !report.max_abs_err.is_nan() {
            report.max_abs_err = report.max_abs_err.max(abs);
            report.max_rel_err = report.max_rel_err.max(abs / scale);
        }
        if !within {
            report.mismatches += 1;
            if report.first_mismatch.is_none() {
                report.first_mismatch = Some(Mismatch { index, reference: r, candidate: c });
            }
        }
    }

    if let Some(m) = report.first_mismatch {
        tracing::warn!(
            mismatches = report.mismatches,
            index = m.index,
            reference = m.reference,
            candidate = m.candidate,
            "arrays do not match"
        );
    }
    Ok(report)
}
