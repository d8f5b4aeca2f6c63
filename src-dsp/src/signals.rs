//! Measurement stimulus synthesis.
//!
//! The stimulus is a logarithmic sweep ("chirp"): instantaneous frequency
//! rises exponentially from the start to the end frequency over the sweep
//! duration.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::DspError;

/// Parameters of one measurement sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Start frequency in Hz
    pub start_freq: f64,
    /// End frequency in Hz
    pub end_freq: f64,
    /// Sweep duration in seconds
    pub duration: f64,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Peak amplitude, in (0, 1]
    pub amplitude: f64,
}

impl SweepConfig {
    /// Full-amplitude sweep over `[start_freq, end_freq]`.
    pub fn new(start_freq: f64, end_freq: f64, duration: f64, sample_rate: u32) -> Self {
        Self {
            start_freq,
            end_freq,
            duration,
            sample_rate,
            amplitude: 1.0,
        }
    }

    /// Nyquist frequency for the configured sample rate.
    pub fn nyquist(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    /// Check the sweep invariants: 0 < start < end <= Nyquist, positive
    /// duration, amplitude in (0, 1]. Violations are caller errors and are
    /// never silently corrected.
    pub fn validate(&self) -> Result<(), DspError> {
        if self.start_freq <= 0.0
            || self.end_freq <= self.start_freq
            || self.end_freq > self.nyquist()
        {
            return Err(DspError::InvalidRange {
                start: self.start_freq,
                end: self.end_freq,
                nyquist: self.nyquist(),
            });
        }
        if !(self.duration > 0.0 && self.duration.is_finite()) {
            return Err(DspError::InvalidDuration(self.duration));
        }
        if !(self.amplitude > 0.0 && self.amplitude <= 1.0) {
            return Err(DspError::InvalidAmplitude(self.amplitude));
        }
        Ok(())
    }
}

/// Clip a sample to the PCM-safe range.
#[inline]
pub fn clip(x: f32) -> f32 {
    x.clamp(-0.999_999, 0.999_999)
}

/// Number of frames covering `duration` seconds at `sample_rate`.
///
/// This is the single authority for the duration-to-sample-count rule:
/// round half away from zero.
#[inline]
pub fn frames_for(duration: f64, sample_rate: u32) -> usize {
    (duration * sample_rate as f64).round() as usize
}

/// Generate a logarithmic sweep.
///
/// Phase follows phi(t) = 2*pi*f0*T/ln(f1/f0) * (exp(t/T * ln(f1/f0)) - 1),
/// so the instantaneous frequency is `start_freq` at t = 0 and `end_freq`
/// at t = duration. Phase is computed in f64 and samples emitted as f32.
pub fn log_sweep(config: &SweepConfig) -> Result<Vec<f32>, DspError> {
    config.validate()?;

    let n_frames = frames_for(config.duration, config.sample_rate);
    let mut signal = Vec::with_capacity(n_frames);

    let k = (config.end_freq / config.start_freq).ln() / config.duration;
    let coefficient = 2.0 * PI * config.start_freq / k;

    for n in 0..n_frames {
        let t = n as f64 / config.sample_rate as f64;
        let phase = coefficient * ((k * t).exp() - 1.0);
        signal.push(clip((config.amplitude * phase.sin()) as f32));
    }

    Ok(signal)
}

/// Apply a raised-cosine fade-in and fade-out of `fade_ms` milliseconds,
/// in place. Keeps the stimulus from hitting the speaker with a step.
pub fn apply_fade(signal: &mut [f32], sample_rate: u32, fade_ms: f64) {
    let fade_len = frames_for(fade_ms / 1000.0, sample_rate).min(signal.len() / 2);
    for i in 0..fade_len {
        let gain = (0.5 * (1.0 - (PI * i as f64 / fade_len as f64).cos())) as f32;
        signal[i] *= gain;
        let j = signal.len() - 1 - i;
        signal[j] *= gain;
    }
}
