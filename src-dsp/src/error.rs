use thiserror::Error;

/// Errors produced by the signal-processing layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DspError {
    #[error(
        "invalid sweep range: start {start} Hz, end {end} Hz (need 0 < start < end <= Nyquist {nyquist} Hz)"
    )]
    InvalidRange { start: f64, end: f64, nyquist: f64 },

    #[error("sweep duration {0} s must be positive")]
    InvalidDuration(f64),

    #[error("sweep amplitude {0} must be in (0, 1]")]
    InvalidAmplitude(f64),

    #[error("signal is empty")]
    EmptySignal,

    #[error("smoothing window {0} must be odd")]
    InvalidWindow(usize),

    #[error("unsupported band count {0} (expected 5, 7, 15 or 31)")]
    UnsupportedLayout(u32),

    #[error("malformed GraphicEQ line: {0}")]
    MalformedProfile(String),
}
