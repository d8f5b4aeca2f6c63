//! Audio hardware access for roomtune measurements.
//!
//! Wraps cpal behind the one capability the measurement core needs: play a
//! mono waveform while recording the response, blocking, with the capture
//! returned time-aligned and of equal length.

pub mod align;
pub mod devices;
pub mod error;
pub mod recorder;

pub use align::{aligned_window, estimate_lag};
pub use devices::{input_device_names, output_device_names};
pub use error::DeviceError;
pub use recorder::PlaybackRecorder;
