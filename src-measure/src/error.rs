use roomtune_audio::DeviceError;
use roomtune_dsp::DspError;
use thiserror::Error;

/// Errors surfaced by a measurement session.
#[derive(Debug, Error)]
pub enum MeasureError {
    #[error(transparent)]
    Dsp(#[from] DspError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("no completed measurement available")]
    NotReady,
}
