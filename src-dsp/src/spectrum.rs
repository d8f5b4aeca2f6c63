//! FFT magnitude spectrum of a captured waveform.

use ndarray::Array1;
use rustfft::{FftPlanner, num_complex::Complex};
use serde::{Deserialize, Serialize};

use crate::eq::round2;
use crate::error::DspError;

/// Floor applied to bin magnitudes before the dB conversion; a bin of an
/// all-zero capture maps to -200 dB instead of -inf.
const MIN_MAGNITUDE: f64 = 1e-10;

/// Bins at or below this frequency form the measured baseline.
const REFERENCE_CUTOFF_HZ: f64 = 1000.0;

/// Magnitude spectrum restricted to a frequency window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spectrum {
    /// Bin frequencies in Hz, ascending
    pub freq: Array1<f64>,
    /// Bin magnitudes in dB
    pub spl: Array1<f64>,
}

impl Spectrum {
    /// Compute the two-sided DFT of `signal` and keep the bins whose
    /// frequency lies in `[start_freq, end_freq]` inclusive, in original
    /// bin order (ascending for a positive-frequency window).
    pub fn analyze(
        signal: &[f32],
        sample_rate: u32,
        start_freq: f64,
        end_freq: f64,
    ) -> Result<Self, DspError> {
        if signal.is_empty() {
            return Err(DspError::EmptySignal);
        }

        let n = signal.len();
        let mut buffer: Vec<Complex<f64>> = signal
            .iter()
            .map(|&x| Complex::new(x as f64, 0.0))
            .collect();
        let mut planner = FftPlanner::new();
        planner.plan_fft_forward(n).process(&mut buffer);

        let resolution = sample_rate as f64 / n as f64;
        let mut freq = Vec::new();
        let mut spl = Vec::new();
        for (k, bin) in buffer.iter().enumerate() {
            // Bins past N/2 carry the negative frequencies.
            let f = if k <= (n - 1) / 2 {
                k as f64 * resolution
            } else {
                k as f64 * resolution - sample_rate as f64
            };
            if f < start_freq || f > end_freq {
                continue;
            }
            freq.push(f);
            spl.push(20.0 * bin.norm().max(MIN_MAGNITUDE).log10());
        }

        Ok(Self {
            freq: Array1::from(freq),
            spl: Array1::from(spl),
        })
    }

    pub fn len(&self) -> usize {
        self.freq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freq.is_empty()
    }

    /// Measured baseline level: mean magnitude of the bins at or below
    /// 1 kHz, rounded to 2 decimals. Falls back to the mean of the whole
    /// window when the window starts above the cutoff.
    pub fn reference_level(&self) -> f64 {
        if self.spl.is_empty() {
            return 0.0;
        }
        let mut sum = 0.0;
        let mut count = 0usize;
        for (f, s) in self.freq.iter().zip(self.spl.iter()) {
            if *f <= REFERENCE_CUTOFF_HZ {
                sum += *s;
                count += 1;
            }
        }
        if count == 0 {
            sum = self.spl.sum();
            count = self.spl.len();
        }
        round2(sum / count as f64)
    }
}
