//! Band layouts, gain aggregation and the GraphicEQ text format.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::DspError;

/// Default clamp for positive band gains, in dB. Cuts are never clamped.
pub const DEFAULT_MAX_BOOST_DB: f64 = 8.0;

const BANDS_5: [f64; 5] = [60.0, 230.0, 910.0, 3600.0, 14000.0];
const BANDS_7: [f64; 7] = [64.0, 160.0, 400.0, 1000.0, 2500.0, 6300.0, 16000.0];
const BANDS_15: [f64; 15] = [
    25.0, 40.0, 63.0, 100.0, 160.0, 250.0, 400.0, 630.0, 1000.0, 1600.0, 2500.0, 4000.0, 6300.0,
    10000.0, 16000.0,
];
const BANDS_31: [f64; 31] = [
    20.0, 25.0, 32.0, 40.0, 50.0, 63.0, 80.0, 100.0, 125.0, 160.0, 200.0, 250.0, 315.0, 400.0,
    500.0, 630.0, 800.0, 1000.0, 1250.0, 1600.0, 2000.0, 2500.0, 3150.0, 4000.0, 5000.0, 6300.0,
    8000.0, 10000.0, 12500.0, 16000.0, 20000.0,
];

/// One of the four fixed graphic-equalizer layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandLayout {
    Five,
    Seven,
    Fifteen,
    ThirtyOne,
}

impl BandLayout {
    /// Look up a layout by its band count.
    pub fn from_count(count: u32) -> Result<Self, DspError> {
        match count {
            5 => Ok(Self::Five),
            7 => Ok(Self::Seven),
            15 => Ok(Self::Fifteen),
            31 => Ok(Self::ThirtyOne),
            other => Err(DspError::UnsupportedLayout(other)),
        }
    }

    /// Ascending band-edge frequencies in Hz.
    pub fn edges(&self) -> &'static [f64] {
        match self {
            Self::Five => &BANDS_5,
            Self::Seven => &BANDS_7,
            Self::Fifteen => &BANDS_15,
            Self::ThirtyOne => &BANDS_31,
        }
    }

    pub fn count(&self) -> usize {
        self.edges().len()
    }
}

/// Gain assigned to one band edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandGain {
    /// Band edge frequency in Hz
    pub freq: f64,
    /// Correction in dB
    pub gain: f64,
}

/// Per-band corrections, renderable as a `# GraphicEQ:` line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqProfile {
    pub bands: Vec<BandGain>,
}

impl EqProfile {
    /// Derive one gain per band edge of `layout` from a measured curve.
    ///
    /// Bins with `from <= freq < to` (previous edge to current edge,
    /// starting from 0 Hz) form one band; its gain is the rounded distance
    /// from the band's mean magnitude to `target_level_db`, with positive
    /// gains clamped at `max_boost_db`. A band containing no bins gets
    /// gain 0.
    pub fn aggregate(
        layout: BandLayout,
        freq: &Array1<f64>,
        spl: &Array1<f64>,
        target_level_db: f64,
        max_boost_db: f64,
    ) -> Self {
        let mut bands = Vec::with_capacity(layout.count());
        let mut from = 0.0;
        for &to in layout.edges() {
            let mut sum = 0.0;
            let mut count = 0usize;
            for (f, s) in freq.iter().zip(spl.iter()) {
                if *f >= from && *f < to {
                    sum += *s;
                    count += 1;
                }
            }
            let gain = if count > 0 {
                clamp_boost(round2(target_level_db - sum / count as f64), max_boost_db)
            } else {
                0.0
            };
            bands.push(BandGain { freq: to, gain });
            from = to;
        }
        Self { bands }
    }

    /// Serialize as `# GraphicEQ: f1 g1; f2 g2; ...` with integer
    /// frequencies and no trailing separator.
    pub fn render(&self) -> String {
        let entries: Vec<String> = self
            .bands
            .iter()
            .map(|band| format!("{} {}", band.freq.round() as i64, format_gain(band.gain)))
            .collect();
        format!("# GraphicEQ: {}", entries.join("; "))
    }

    /// Parse a line produced by [`EqProfile::render`].
    pub fn parse(line: &str) -> Result<Self, DspError> {
        let rest = line
            .trim()
            .strip_prefix("# GraphicEQ:")
            .ok_or_else(|| DspError::MalformedProfile("missing '# GraphicEQ:' prefix".into()))?;

        let mut bands = Vec::new();
        for entry in rest.split(';') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let mut fields = entry.split_whitespace();
            let freq = fields.next().and_then(|s| s.parse::<f64>().ok());
            let gain = fields.next().and_then(|s| s.parse::<f64>().ok());
            match (freq, gain, fields.next()) {
                (Some(freq), Some(gain), None) => bands.push(BandGain { freq, gain }),
                _ => return Err(DspError::MalformedProfile(entry.to_string())),
            }
        }
        if bands.is_empty() {
            return Err(DspError::MalformedProfile("no band entries".into()));
        }
        Ok(Self { bands })
    }
}

/// Round half away from zero to two decimals, normalizing -0.0 to 0.0.
pub(crate) fn round2(x: f64) -> f64 {
    let rounded = (x * 100.0).round() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Clamp only positive gains to `max_db`; cuts pass through unchanged.
fn clamp_boost(gain: f64, max_db: f64) -> f64 {
    if gain > 0.0 { gain.min(max_db) } else { gain }
}

/// Two decimals with trailing zeros trimmed, keeping at least one
/// fractional digit: `0.0`, `1.25`, `-3.5`.
fn format_gain(gain: f64) -> String {
    let mut s = format!("{:.2}", round2(gain));
    if s.ends_with('0') {
        s.pop();
        if s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.push('0');
        }
    }
    s
}
