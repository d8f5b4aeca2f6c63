//! Measurement session orchestration.
//!
//! Ties the pure DSP pipeline to the audio hardware: one `run` emits the
//! sweep, records the response, and derives the spectrum plus graphic-EQ
//! corrections. The presentation layer above supplies parameters and
//! consumes the results; nothing here renders or persists anything.

pub mod error;
pub mod session;

pub use error::MeasureError;
pub use session::{AudioIo, MeasurementResult, MeasurementSession, SessionState};
