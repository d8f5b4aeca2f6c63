//! The measurement orchestration state machine.

use ndarray::Array1;
use serde::Serialize;

use roomtune_audio::{DeviceError, PlaybackRecorder};
use roomtune_dsp::{
    BandLayout, DEFAULT_MAX_BOOST_DB, EqProfile, Spectrum, SweepConfig, TargetCurve, apply_fade,
    center_on, log_sweep, moving_average, window_for,
};

use crate::error::MeasureError;

/// Fade applied to the sweep edges before playback, in milliseconds.
const FADE_MS: f64 = 20.0;

/// The capability the session needs from the audio layer: play a mono
/// waveform and synchronously record the response, time-aligned and of
/// equal length.
pub trait AudioIo {
    fn play_and_record(
        &mut self,
        signal: &[f32],
        sample_rate: u32,
    ) -> Result<Vec<f32>, DeviceError>;
}

impl AudioIo for PlaybackRecorder {
    fn play_and_record(
        &mut self,
        signal: &[f32],
        sample_rate: u32,
    ) -> Result<Vec<f32>, DeviceError> {
        PlaybackRecorder::play_and_record(self, signal, sample_rate)
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    Sweeping,
    Analyzing,
    Ready,
}

/// Everything derived from one completed measurement.
#[derive(Debug, Clone)]
pub struct MeasurementResult {
    /// Captured response waveform, time-aligned to the sweep
    pub recorded: Vec<f32>,
    /// Raw magnitude spectrum inside the sweep's frequency window
    pub spectrum: Spectrum,
    /// Smoothed display curve (the raw curve when smoothing is 0)
    pub display: Array1<f64>,
    /// Target curve interpolated over the spectrum, centered on the
    /// reference level
    pub target_overlay: Array1<f64>,
    /// Measured low/mid baseline in dB
    pub reference_level: f64,
    /// Band corrections
    pub profile: EqProfile,
}

/// One-shot measurement pipeline: sweep, capture, spectrum, band gains.
///
/// Re-runnable from `Ready`. Results are immutable snapshots owned by the
/// session and replaced wholesale on the next successful run; a failed run
/// keeps the previous snapshot and restores the previous state.
#[derive(Debug)]
pub struct MeasurementSession {
    config: SweepConfig,
    target: TargetCurve,
    layout: BandLayout,
    smoothing: usize,
    max_boost_db: f64,
    state: SessionState,
    result: Option<MeasurementResult>,
}

impl MeasurementSession {
    pub fn new(config: SweepConfig) -> Self {
        Self {
            config,
            target: TargetCurve::default(),
            layout: BandLayout::Fifteen,
            smoothing: 0,
            max_boost_db: DEFAULT_MAX_BOOST_DB,
            state: SessionState::Idle,
            result: None,
        }
    }

    /// Replace the target curve used by subsequent runs.
    pub fn set_target(&mut self, target: TargetCurve) {
        self.target = target;
    }

    /// Choose the band layout used by subsequent runs.
    pub fn set_layout(&mut self, layout: BandLayout) {
        self.layout = layout;
    }

    /// Raw smoothing value; the display window is `2 * raw + 1` bins and 0
    /// disables smoothing.
    pub fn set_smoothing(&mut self, raw: usize) {
        self.smoothing = raw;
    }

    /// Clamp for positive band gains in dB.
    pub fn set_max_boost(&mut self, max_boost_db: f64) {
        self.max_boost_db = max_boost_db;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Latest completed measurement, available once the session is `Ready`.
    pub fn result(&self) -> Result<&MeasurementResult, MeasureError> {
        match (self.state, &self.result) {
            (SessionState::Ready, Some(result)) => Ok(result),
            _ => Err(MeasureError::NotReady),
        }
    }

    /// Run one full measurement cycle.
    ///
    /// Blocks for the sweep duration inside `io.play_and_record`. On error
    /// the cycle is aborted with no partial results: a previous snapshot
    /// (if any) stays accessible and the state returns to `Ready`,
    /// otherwise to `Idle`.
    pub fn run(&mut self, io: &mut dyn AudioIo) -> Result<(), MeasureError> {
        self.state = SessionState::Sweeping;
        match self.measure(io) {
            Ok(result) => {
                self.result = Some(result);
                self.state = SessionState::Ready;
                Ok(())
            }
            Err(e) => {
                self.state = if self.result.is_some() {
                    SessionState::Ready
                } else {
                    SessionState::Idle
                };
                Err(e)
            }
        }
    }

    /// Re-derive the display curve, overlay and profile from the stored
    /// spectrum with a new smoothing value, without re-measuring.
    pub fn recompute(&mut self, smoothing_raw: usize) -> Result<(), MeasureError> {
        let (recorded, spectrum) = match (self.state, &self.result) {
            (SessionState::Ready, Some(result)) => {
                (result.recorded.clone(), result.spectrum.clone())
            }
            _ => return Err(MeasureError::NotReady),
        };
        self.smoothing = smoothing_raw;
        self.result = Some(self.derive_outputs(recorded, spectrum)?);
        Ok(())
    }

    fn measure(&mut self, io: &mut dyn AudioIo) -> Result<MeasurementResult, MeasureError> {
        self.config.validate()?;

        let mut sweep = log_sweep(&self.config)?;
        apply_fade(&mut sweep, self.config.sample_rate, FADE_MS);

        log::info!(
            "sweeping {:.0} Hz -> {:.0} Hz over {:.1} s at {} Hz",
            self.config.start_freq,
            self.config.end_freq,
            self.config.duration,
            self.config.sample_rate
        );
        let recorded = io.play_and_record(&sweep, self.config.sample_rate)?;

        self.state = SessionState::Analyzing;
        let spectrum = Spectrum::analyze(
            &recorded,
            self.config.sample_rate,
            self.config.start_freq,
            self.config.end_freq,
        )?;
        self.derive_outputs(recorded, spectrum)
    }

    /// Everything downstream of the raw spectrum, shared by `run` and
    /// `recompute`.
    fn derive_outputs(
        &self,
        recorded: Vec<f32>,
        spectrum: Spectrum,
    ) -> Result<MeasurementResult, MeasureError> {
        let display = if self.smoothing > 0 {
            moving_average(&spectrum.spl, window_for(self.smoothing))?
        } else {
            spectrum.spl.clone()
        };

        let smoothed = Spectrum {
            freq: spectrum.freq.clone(),
            spl: display.clone(),
        };
        let reference_level = smoothed.reference_level();
        let target_overlay = center_on(&self.target.sample_onto(display.len()), reference_level);
        let profile = EqProfile::aggregate(
            self.layout,
            &smoothed.freq,
            &smoothed.spl,
            reference_level,
            self.max_boost_db,
        );

        log::info!(
            "reference level {:.2} dB across {} bins, {} bands",
            reference_level,
            display.len(),
            profile.bands.len()
        );

        Ok(MeasurementResult {
            recorded,
            spectrum,
            display,
            target_overlay,
            reference_level,
            profile,
        })
    }
}
