//! FLOP accounting for square GEMM.

use std::time::Duration;

/// Floating-point operations in an n×n×n GEMM (one multiply and one add per term).
pub fn gemm_flops(n: usize) -> f64 {
    2.0 * (n as f64).powi(3)
}

/// Throughput in TFLOPS for an n×n GEMM that took `secs` seconds.
pub fn tflops(n: usize, secs: f64) -> f64 {
    gemm_flops(n) / secs / 1e12
}

/// Throughput in GFLOPS.
pub fn gflops(n: usize, secs: f64) -> f64 {
    gemm_flops(n) / secs / 1e9
}

/// Elapsed time and throughput for one routine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    pub seconds: f64,
    pub tflops: f64,
}

impl Timing {
    pub fn new(n: usize, elapsed: Duration) -> Self {
        let seconds = elapsed.as_secs_f64();
        Self {
            seconds,
            tflops: tflops(n, seconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flop_count() {
        assert_eq!(gemm_flops(1), 2.0);
        assert_eq!(gemm_flops(1024), 2.0 * 1024.0 * 1024.0 * 1024.0);
    }

    #[test]
    fn flops_increase_with_size() {
        let sizes: Vec<f64> = (0..14).map(|e| gemm_flops(1 << e)).collect();
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn throughput_units() {
        // 2 * 1000^3 flops in 1 s = 2 GFLOPS = 0.002 TFLOPS
        assert!((gflops(1000, 1.0) - 2.0).abs() < 1e-9);
        assert!((tflops(1000, 1.0) - 0.002).abs() < 1e-12);
        let t = Timing::new(1000, Duration::from_millis(500));
        assert_eq!(t.seconds, 0.5);
        assert!((t.tflops - 0.004).abs() < 1e-12);
    }
}
