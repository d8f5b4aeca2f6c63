use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;

use roomtune_audio::{PlaybackRecorder, input_device_names, output_device_names};
use roomtune_dsp::{BandLayout, SweepConfig, TargetCurve};
use roomtune_measure::{MeasurementResult, MeasurementSession};

/// Sweep a speaker, record the room response and derive graphic-EQ gains.
#[derive(Parser)]
#[command(name = "roomtune")]
#[command(
    about = "Measure a speaker+room frequency response and print GraphicEQ corrections",
    long_about = None
)]
struct Cli {
    /// Sweep start frequency in Hz
    #[arg(long, default_value_t = 20.0)]
    start_freq: f64,

    /// Sweep end frequency in Hz
    #[arg(long, default_value_t = 20000.0)]
    end_freq: f64,

    /// Sweep duration in seconds
    #[arg(long, default_value_t = 5.0)]
    duration: f64,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 44100)]
    sample_rate: u32,

    /// Playback amplitude in (0, 1]
    #[arg(long, default_value_t = 0.5)]
    amplitude: f64,

    /// Raw smoothing value; the display window is 2*value + 1 bins
    #[arg(long, default_value_t = 15)]
    smoothing: usize,

    /// Number of EQ bands (5, 7, 15 or 31)
    #[arg(long, default_value_t = 15)]
    bands: u32,

    /// Maximum boost per band in dB
    #[arg(long, default_value_t = 8.0)]
    max_boost: f64,

    /// Target curve control points as comma-separated dB values
    /// (default: flat 0 dB)
    #[arg(long)]
    target: Option<String>,

    /// Audio device name (default: system default devices)
    #[arg(long)]
    device: Option<String>,

    /// Hardware input channel to record from (0-based)
    #[arg(long, default_value_t = 0)]
    input_channel: u16,

    /// List audio devices and exit
    #[arg(long, default_value_t = false)]
    list_devices: bool,

    /// Print the spectrum and profile as JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Save the captured waveform to this WAV file
    #[arg(long)]
    save_wav: Option<PathBuf>,

    /// Save the display spectrum to this CSV file (frequency_hz,spl_db)
    #[arg(long)]
    save_csv: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.list_devices {
        println!("Input devices:");
        for name in input_device_names()? {
            println!("  {name}");
        }
        println!("Output devices:");
        for name in output_device_names()? {
            println!("  {name}");
        }
        return Ok(());
    }

    let mut config = SweepConfig::new(cli.start_freq, cli.end_freq, cli.duration, cli.sample_rate);
    config.amplitude = cli.amplitude;

    let mut session = MeasurementSession::new(config);
    session.set_layout(BandLayout::from_count(cli.bands)?);
    session.set_smoothing(cli.smoothing);
    session.set_max_boost(cli.max_boost);
    if let Some(spec) = &cli.target {
        session.set_target(parse_target(spec)?);
    }

    let mut recorder = PlaybackRecorder::new().with_input_channel(cli.input_channel);
    if let Some(device) = &cli.device {
        recorder = recorder.with_device(device);
    }

    session.run(&mut recorder)?;
    let result = session.result()?;

    if let Some(path) = &cli.save_wav {
        write_wav(path, &result.recorded, cli.sample_rate)?;
    }
    if let Some(path) = &cli.save_csv {
        write_csv(path, result)?;
    }

    if cli.json {
        let report = serde_json::json!({
            "reference_level_db": result.reference_level,
            "frequencies_hz": result.spectrum.freq.to_vec(),
            "magnitudes_db": result.display.to_vec(),
            "profile": result.profile,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Reference level: {:.2} dB", result.reference_level);
        println!("{}", result.profile.render());
    }

    Ok(())
}

fn parse_target(spec: &str) -> Result<TargetCurve, String> {
    let points = spec
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid target point: {p}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TargetCurve::new(points))
}

fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}

fn write_csv(path: &Path, result: &MeasurementResult) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "frequency_hz,spl_db")?;
    for (freq, spl) in result.spectrum.freq.iter().zip(result.display.iter()) {
        writeln!(file, "{freq:.6},{spl:.3}")?;
    }
    Ok(())
}
