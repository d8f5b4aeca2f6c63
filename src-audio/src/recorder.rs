//! Blocking play-and-record against real audio hardware.

use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;

use roomtune_dsp::frames_for;

use crate::align::aligned_window;
use crate::devices::find_device;
use crate::error::DeviceError;

/// Extra capture beyond the signal length, covering device latency.
const CAPTURE_MARGIN_SECS: f64 = 0.5;

/// Poll interval while waiting for the capture to fill.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Plays a mono signal while recording the response and returns the
/// capture time-aligned to the signal.
#[derive(Debug, Clone, Default)]
pub struct PlaybackRecorder {
    device: Option<String>,
    input_channel: u16,
}

impl PlaybackRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the named input/output device instead of the system defaults.
    pub fn with_device(mut self, name: impl Into<String>) -> Self {
        self.device = Some(name.into());
        self
    }

    /// Record from this 0-based hardware input channel (default 0).
    pub fn with_input_channel(mut self, channel: u16) -> Self {
        self.input_channel = channel;
        self
    }

    /// Play `signal` and synchronously record the response.
    ///
    /// Blocks until the capture covers the signal plus a latency margin,
    /// bounded by a `2 x duration + 2 s` timeout. The returned waveform is
    /// lag-compensated against `signal` and exactly `signal.len()` samples
    /// long.
    pub fn play_and_record(
        &self,
        signal: &[f32],
        sample_rate: u32,
    ) -> Result<Vec<f32>, DeviceError> {
        let host = cpal::default_host();

        let input_device = match &self.device {
            Some(name) => find_device(&host, name, true)?,
            None => host
                .default_input_device()
                .ok_or(DeviceError::NoInputDevice)?,
        };
        let output_device = match &self.device {
            Some(name) => find_device(&host, name, false)?,
            None => host
                .default_output_device()
                .ok_or(DeviceError::NoOutputDevice)?,
        };

        let input_channels = input_device.default_input_config()?.channels();
        if self.input_channel >= input_channels {
            return Err(DeviceError::BadInputChannel {
                channel: self.input_channel,
                available: input_channels,
            });
        }
        let output_channels = output_device.default_output_config()?.channels();

        log::info!(
            "capturing {} samples at {} Hz from '{}' channel {}",
            signal.len(),
            sample_rate,
            input_device.name().unwrap_or_else(|_| "unknown".into()),
            self.input_channel
        );

        let input_config = cpal::StreamConfig {
            channels: input_channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };
        let output_config = cpal::StreamConfig {
            channels: output_channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        // Input side: extract the chosen channel from interleaved frames.
        let recorded: Arc<Mutex<Vec<f32>>> = Arc::new(Mutex::new(Vec::new()));
        let capture = Arc::clone(&recorded);
        let frame_size = input_channels as usize;
        let channel = self.input_channel as usize;
        let input_stream = input_device.build_input_stream(
            &input_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let mut buffer = capture.lock();
                for frame in data.chunks(frame_size) {
                    if let Some(&sample) = frame.get(channel) {
                        buffer.push(sample);
                    }
                }
            },
            |err| log::error!("input stream error: {err}"),
            None,
        )?;

        // Output side: replicate the mono signal onto every hardware
        // channel, then silence once the signal is exhausted.
        let playback = signal.to_vec();
        let out_channels = output_channels as usize;
        let mut cursor = 0_usize;
        let output_stream = output_device.build_output_stream(
            &output_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(out_channels) {
                    let sample = playback.get(cursor).copied().unwrap_or(0.0);
                    cursor += 1;
                    for slot in frame.iter_mut() {
                        *slot = sample;
                    }
                }
            },
            |err| log::error!("output stream error: {err}"),
            None,
        )?;

        input_stream.play()?;
        output_stream.play()?;

        let duration = signal.len() as f64 / sample_rate as f64;
        let wanted = signal.len() + frames_for(CAPTURE_MARGIN_SECS, sample_rate);
        let timeout = Duration::from_secs_f64(2.0 * duration + 2.0);
        let started = Instant::now();
        loop {
            sleep(POLL_INTERVAL);
            let captured = recorded.lock().len();
            if captured >= wanted {
                break;
            }
            if started.elapsed() >= timeout {
                // Enough for alignment is still a usable capture.
                if captured >= signal.len() {
                    break;
                }
                return Err(DeviceError::Timeout(timeout.as_secs_f64()));
            }
        }

        drop(output_stream);
        drop(input_stream);

        let captured = std::mem::take(&mut *recorded.lock());
        if captured.is_empty() {
            return Err(DeviceError::NoSamples);
        }

        log::debug!("captured {} samples, aligning to reference", captured.len());
        Ok(aligned_window(signal, &captured))
    }
}
