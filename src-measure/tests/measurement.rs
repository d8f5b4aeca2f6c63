//! End-to-end measurement tests against mock audio hardware.

use roomtune_audio::DeviceError;
use roomtune_dsp::{BandLayout, DspError, EqProfile, SweepConfig, frames_for};
use roomtune_measure::{AudioIo, MeasureError, MeasurementSession, SessionState};

/// Feeds back a unit impulse: its spectrum is exactly 0 dB in every bin.
struct ImpulseIo;

impl AudioIo for ImpulseIo {
    fn play_and_record(
        &mut self,
        signal: &[f32],
        _sample_rate: u32,
    ) -> Result<Vec<f32>, DeviceError> {
        let mut response = vec![0.0_f32; signal.len()];
        if let Some(first) = response.first_mut() {
            *first = 1.0;
        }
        Ok(response)
    }
}

/// Echoes the sweep back unchanged, like a perfect loopback cable.
struct LoopbackIo;

impl AudioIo for LoopbackIo {
    fn play_and_record(
        &mut self,
        signal: &[f32],
        _sample_rate: u32,
    ) -> Result<Vec<f32>, DeviceError> {
        Ok(signal.to_vec())
    }
}

/// Loopback with a small amount of capture noise.
struct NoisyLoopbackIo;

impl AudioIo for NoisyLoopbackIo {
    fn play_and_record(
        &mut self,
        signal: &[f32],
        _sample_rate: u32,
    ) -> Result<Vec<f32>, DeviceError> {
        Ok(signal
            .iter()
            .map(|&x| x + 1e-4 * (rand::random::<f32>() - 0.5))
            .collect())
    }
}

/// Always fails, like unplugged hardware.
struct DeadIo;

impl AudioIo for DeadIo {
    fn play_and_record(
        &mut self,
        _signal: &[f32],
        _sample_rate: u32,
    ) -> Result<Vec<f32>, DeviceError> {
        Err(DeviceError::NoInputDevice)
    }
}

/// Records the length of the signal it was asked to play.
struct ProbeIo {
    played_len: usize,
}

impl AudioIo for ProbeIo {
    fn play_and_record(
        &mut self,
        signal: &[f32],
        _sample_rate: u32,
    ) -> Result<Vec<f32>, DeviceError> {
        self.played_len = signal.len();
        let mut response = vec![0.0_f32; signal.len()];
        response[0] = 1.0;
        Ok(response)
    }
}

#[test]
fn flat_response_yields_all_zero_gains() {
    let config = SweepConfig::new(20.0, 20000.0, 1.0, 44100);
    let mut session = MeasurementSession::new(config);
    session.set_layout(BandLayout::Five);

    session.run(&mut ImpulseIo).unwrap();

    assert_eq!(session.state(), SessionState::Ready);
    let result = session.result().unwrap();
    assert!(result.reference_level.abs() < 1e-9);
    for band in &result.profile.bands {
        assert_eq!(band.gain, 0.0);
    }
    assert_eq!(
        result.profile.render(),
        "# GraphicEQ: 60 0.0; 230 0.0; 910 0.0; 3600 0.0; 14000 0.0"
    );
}

#[test]
fn rendered_profile_parses_back_to_the_same_bands() {
    let config = SweepConfig::new(20.0, 20000.0, 1.0, 44100);
    let mut session = MeasurementSession::new(config);
    session.set_layout(BandLayout::Seven);
    session.run(&mut LoopbackIo).unwrap();

    let profile = &session.result().unwrap().profile;
    let reparsed = EqProfile::parse(&profile.render()).unwrap();
    assert_eq!(&reparsed, profile);
}

#[test]
fn loopback_measurement_reaches_ready() {
    let config = SweepConfig::new(20.0, 20000.0, 1.0, 44100);
    let mut session = MeasurementSession::new(config);
    session.set_smoothing(15);

    session.run(&mut LoopbackIo).unwrap();

    assert_eq!(session.state(), SessionState::Ready);
    let result = session.result().unwrap();
    assert_eq!(result.profile.bands.len(), 15);
    assert_eq!(result.display.len(), result.spectrum.len());
    assert_eq!(result.target_overlay.len(), result.spectrum.len());
    assert!(result.reference_level.is_finite());
    for band in &result.profile.bands {
        assert!(band.gain.is_finite());
        assert!(band.gain <= 8.0);
    }
}

#[test]
fn capture_noise_does_not_break_the_pipeline() {
    let config = SweepConfig::new(20.0, 20000.0, 0.5, 44100);
    let mut session = MeasurementSession::new(config);
    session.set_smoothing(5);

    session.run(&mut NoisyLoopbackIo).unwrap();

    assert_eq!(session.state(), SessionState::Ready);
    for &spl in session.result().unwrap().display.iter() {
        assert!(spl.is_finite());
    }
}

#[test]
fn session_plays_a_sweep_of_the_configured_length() {
    let config = SweepConfig::new(20.0, 20000.0, 0.25, 48000);
    let mut session = MeasurementSession::new(config);
    let mut io = ProbeIo { played_len: 0 };

    session.run(&mut io).unwrap();

    assert_eq!(io.played_len, frames_for(0.25, 48000));
}

#[test]
fn device_failure_leaves_the_session_idle() {
    let config = SweepConfig::new(20.0, 20000.0, 1.0, 44100);
    let mut session = MeasurementSession::new(config);

    let err = session.run(&mut DeadIo).unwrap_err();
    assert!(matches!(err, MeasureError::Device(_)));
    assert_eq!(session.state(), SessionState::Idle);
    assert!(matches!(session.result(), Err(MeasureError::NotReady)));
}

#[test]
fn invalid_config_is_rejected_before_any_audio_io() {
    let config = SweepConfig::new(0.0, 20000.0, 1.0, 44100);
    let mut session = MeasurementSession::new(config);

    let err = session.run(&mut DeadIo).unwrap_err();
    assert!(matches!(
        err,
        MeasureError::Dsp(DspError::InvalidRange { .. })
    ));
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn failed_rerun_keeps_the_previous_result() {
    let config = SweepConfig::new(20.0, 20000.0, 0.5, 44100);
    let mut session = MeasurementSession::new(config);
    session.set_layout(BandLayout::Five);

    session.run(&mut ImpulseIo).unwrap();
    let first_render = session.result().unwrap().profile.render();

    let err = session.run(&mut DeadIo).unwrap_err();
    assert!(matches!(err, MeasureError::Device(_)));

    // The session stays Ready with the earlier snapshot intact.
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.result().unwrap().profile.render(), first_render);
}

#[test]
fn recompute_requires_a_completed_measurement() {
    let config = SweepConfig::new(20.0, 20000.0, 1.0, 44100);
    let mut session = MeasurementSession::new(config);
    assert!(matches!(session.recompute(3), Err(MeasureError::NotReady)));
}

#[test]
fn recompute_reuses_the_stored_spectrum() {
    let config = SweepConfig::new(20.0, 20000.0, 0.5, 44100);
    let mut session = MeasurementSession::new(config);
    session.set_layout(BandLayout::Five);

    session.run(&mut ImpulseIo).unwrap();
    let raw_spectrum_len = session.result().unwrap().spectrum.len();

    session.recompute(10).unwrap();

    let result = session.result().unwrap();
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(result.spectrum.len(), raw_spectrum_len);
    // Smoothing a flat 0 dB curve changes nothing: gains stay zero.
    assert_eq!(
        result.profile.render(),
        "# GraphicEQ: 60 0.0; 230 0.0; 910 0.0; 3600 0.0; 14000 0.0"
    );
}
