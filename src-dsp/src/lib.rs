//! Pure signal processing for sweep-based room measurements.
//!
//! Everything in this crate is synchronous and side-effect free: sweep
//! synthesis, FFT magnitude spectra, display smoothing, target-curve
//! interpolation and graphic-EQ band aggregation. Audio hardware access
//! lives in `roomtune-audio`, orchestration in `roomtune-measure`.

pub mod eq;
pub mod error;
pub mod signals;
pub mod smoothing;
pub mod spectrum;
pub mod target;

pub use eq::{BandGain, BandLayout, DEFAULT_MAX_BOOST_DB, EqProfile};
pub use error::DspError;
pub use signals::{SweepConfig, apply_fade, frames_for, log_sweep};
pub use smoothing::{moving_average, window_for};
pub use spectrum::Spectrum;
pub use target::{TargetCurve, center_on};
