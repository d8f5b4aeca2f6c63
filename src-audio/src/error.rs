use thiserror::Error;

/// Errors from the audio device layer.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no default input device available")]
    NoInputDevice,

    #[error("no default output device available")]
    NoOutputDevice,

    #[error("audio device '{0}' not found")]
    DeviceNotFound(String),

    #[error("failed to enumerate audio devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("failed to read device name: {0}")]
    DeviceName(#[from] cpal::DeviceNameError),

    #[error("failed to query device config: {0}")]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("input channel {channel} exceeds hardware channel count {available} (channels are 0-indexed)")]
    BadInputChannel { channel: u16, available: u16 },

    #[error("capture did not complete within {0:.1} s")]
    Timeout(f64),

    #[error("no samples were recorded")]
    NoSamples,
}
