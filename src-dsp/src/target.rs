//! Desired response curve, interpolated over the measured spectrum.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Sparse reference response. Control points carry no frequencies of their
/// own; they are spread evenly over the measured window when sampled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetCurve {
    points: Array1<f64>,
}

impl Default for TargetCurve {
    /// Flat 0 dB target with five control points.
    fn default() -> Self {
        Self {
            points: Array1::zeros(5),
        }
    }
}

impl TargetCurve {
    pub fn new(points: Vec<f64>) -> Self {
        Self {
            points: Array1::from(points),
        }
    }

    pub fn points(&self) -> &Array1<f64> {
        &self.points
    }

    /// Piecewise-linear sample of the control points at `n` evenly spaced
    /// positions spanning the control-point axis.
    pub fn sample_onto(&self, n: usize) -> Array1<f64> {
        let m = self.points.len();
        if n == 0 || m == 0 {
            return Array1::zeros(n);
        }
        if m == 1 {
            return Array1::from_elem(n, self.points[0]);
        }

        let last = (m - 1) as f64;
        let mut out = Array1::zeros(n);
        for i in 0..n {
            let x = if n == 1 {
                0.0
            } else {
                last * i as f64 / (n - 1) as f64
            };
            let left = (x.floor() as usize).min(m - 2);
            let t = x - left as f64;
            out[i] = self.points[left] * (1.0 - t) + self.points[left + 1] * t;
        }
        out
    }
}

/// Shift `curve` so its mean equals `level_db`.
pub fn center_on(curve: &Array1<f64>, level_db: f64) -> Array1<f64> {
    match curve.mean() {
        Some(mean) => curve + (level_db - mean),
        None => curve.clone(),
    }
}
