//! Human-readable report lines written to stdout.

use crate::Timing;
use mmul_la::CheckReport;
use std::io::{self, Write};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

pub fn matrix_size(out: &mut impl Write, n: usize) -> io::Result<()> {
    writeln!(out, "Matrix size: {n} x {n}\n")
}

/// Bold section header naming the routine about to run.
pub fn header(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out, "{BOLD}{title}{RESET}")
}

pub fn timing(out: &mut impl Write, timing: &Timing) -> io::Result<()> {
    writeln!(
        out,
        "Elapsed time: {:.3} sec, {:.4} TFLOPS\n",
        timing.seconds, timing.tflops
    )
}

pub fn check(out: &mut impl Write, report: &CheckReport) -> io::Result<()> {
    match report.first_mismatch {
        None => writeln!(
            out,
            "Arrays match. (max abs err {:.3e}, max rel err {:.3e})\n",
            report.max_abs_err, report.max_rel_err
        ),
        Some(m) => {
            writeln!(out, "Arrays do not match!")?;
            writeln!(
                out,
                "host {:5.2} gpu {:5.2} at current {} ({} of {} elements differ)\n",
                m.reference, m.candidate, m.index, report.mismatches, report.len
            )
        }
    }
}

/// Printed when the reference is disabled.
pub fn unchecked(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Reference disabled; result not checked.\n")
}

/// GPU over CPU throughput ratio.
pub fn speedup(out: &mut impl Write, reference: &Timing, gpu: &Timing) -> io::Result<()> {
    writeln!(out, "Speedup (GPU / CPU): {:.2}x", reference.seconds / gpu.seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmul_la::check_result;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn size_and_timing_lines() {
        assert_eq!(render(|o| matrix_size(o, 1024)), "Matrix size: 1024 x 1024\n\n");
        let t = Timing { seconds: 0.123456, tflops: 0.017391 };
        assert_eq!(render(|o| timing(o, &t)), "Elapsed time: 0.123 sec, 0.0174 TFLOPS\n\n");
    }

    #[test]
    fn header_is_bold() {
        assert_eq!(render(|o| header(o, "GEMM")), "\x1b[1mGEMM\x1b[0m\n");
    }

    #[test]
    fn check_lines() {
        let ok = check_result(&[1.0, 2.0], &[1.0, 2.0], 1e-3).unwrap();
        assert!(render(|o| check(o, &ok)).starts_with("Arrays match."));

        let bad = check_result(&[1.0, 2.0], &[1.0, 3.0], 1e-3).unwrap();
        let text = render(|o| check(o, &bad));
        assert!(text.starts_with("Arrays do not match!\n"));
        assert!(text.contains("host  2.00 gpu  3.00 at current 1"));
        assert!(text.contains("(1 of 2 elements differ)"));
    }

    #[test]
    fn speedup_ratio() {
        let cpu = Timing { seconds: 2.0, tflops: 1.0 };
        let gpu = Timing { seconds: 0.5, tflops: 4.0 };
        assert_eq!(render(|o| speedup(o, &cpu, &gpu)), "Speedup (GPU / CPU): 4.00x\n");
    }
}
