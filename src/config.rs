//! Codec, dataset and pitch-sequence settings.
//!
//! All three structs deserialize from JSON with every field optional, so a
//! caller only spells out what differs from the defaults.

use crate::codec::reconstruct::MAX_TEMPO_MICROS;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Output resolution of the feature encoding, in ticks per quarter note.
pub const DEFAULT_OUTPUT_TICKS_PER_QUARTER: u32 = 384;

/// Tempo written into reconstructed files.
pub const DEFAULT_TEMPO_BPM: u32 = 45;

/// A tempo event holds at most 24 bits of microseconds per quarter note.
fn validate_bpm(name: &str, bpm: u32) -> Result<()> {
    if bpm == 0 || 60_000_000 / bpm > MAX_TEMPO_MICROS {
        return Err(Error::Config(format!(
            "{} {} is out of range, at least 4 is required",
            name, bpm
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub output_ticks_per_quarter_note: u32,
    /// Number of simultaneous tones bundled into one frame.
    pub tones_per_cell: usize,
    /// Insert a silent marker note at every quarter note while encoding.
    pub pace_events: bool,
    pub tempo_bpm: u32,
    /// Delta of the closing EndOfTrack event. `None` means one output quarter note.
    pub end_of_track_delta: Option<u32>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            output_ticks_per_quarter_note: DEFAULT_OUTPUT_TICKS_PER_QUARTER,
            tones_per_cell: 1,
            pace_events: false,
            tempo_bpm: DEFAULT_TEMPO_BPM,
            end_of_track_delta: None,
        }
    }
}

impl CodecConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CodecConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    pub fn with_tones_per_cell(mut self, tones_per_cell: usize) -> Self {
        self.tones_per_cell = tones_per_cell;
        self
    }

    pub fn with_pace_events(mut self, pace_events: bool) -> Self {
        self.pace_events = pace_events;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.output_ticks_per_quarter_note == 0 {
            return Err(Error::Config(
                "output_ticks_per_quarter_note must be positive".to_string(),
            ));
        }
        if self.output_ticks_per_quarter_note > u16::MAX as u32 >> 1 {
            return Err(Error::Config(format!(
                "output_ticks_per_quarter_note {} does not fit a metrical header",
                self.output_ticks_per_quarter_note
            )));
        }
        if self.tones_per_cell == 0 {
            return Err(Error::Config("tones_per_cell must be at least 1".to_string()));
        }
        validate_bpm("tempo_bpm", self.tempo_bpm)
    }

    /// Width of one feature frame: `(length, frequency, velocity)` per tone plus the timing column.
    pub fn num_song_features(&self) -> usize {
        crate::codec::frames::num_song_features(self.tones_per_cell)
    }

    pub fn end_of_track_delta(&self) -> u32 {
        self.end_of_track_delta
            .unwrap_or(self.output_ticks_per_quarter_note)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Genre labels, one subdirectory of the data directory each.
    pub genres: Vec<String>,
    pub validation_percentage: f64,
    pub test_percentage: f64,
    /// Shuffle the songs before splitting.
    pub shuffle: bool,
}

impl DatasetConfig {
    pub fn new<S: Into<String>>(genres: impl IntoIterator<Item = S>) -> Self {
        DatasetConfig {
            genres: genres.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.genres.is_empty() {
            return Err(Error::Config("at least one genre is required".to_string()));
        }
        let in_range = |p: f64| (0.0..=100.0).contains(&p);
        if !in_range(self.validation_percentage)
            || !in_range(self.test_percentage)
            || self.validation_percentage + self.test_percentage > 100.0
        {
            return Err(Error::Config(format!(
                "validation ({}) and test ({}) percentages must add up to at most 100",
                self.validation_percentage, self.test_percentage
            )));
        }
        Ok(())
    }
}

/// Settings of the monophonic pitch-token encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MelodyParams {
    pub output_ticks_per_quarter_note: u32,
    /// Output ticks covered by one token.
    pub ticks_per_step: u32,
    pub pitch_min: u8,
    pub pitch_max: u8,
    pub bpm: u32,
    pub velocity: u8,
    pub max_tokens: usize,
}

impl Default for MelodyParams {
    fn default() -> Self {
        MelodyParams {
            output_ticks_per_quarter_note: 120,
            ticks_per_step: 15,
            pitch_min: 40,
            pitch_max: 84,
            bpm: DEFAULT_TEMPO_BPM,
            velocity: 100,
            max_tokens: 3000,
        }
    }
}

impl MelodyParams {
    pub fn validate(&self) -> Result<()> {
        if self.output_ticks_per_quarter_note == 0 || self.ticks_per_step == 0 {
            return Err(Error::Config("melody resolutions must be positive".to_string()));
        }
        if self.output_ticks_per_quarter_note > u16::MAX as u32 >> 1 {
            return Err(Error::Config(format!(
                "output_ticks_per_quarter_note {} does not fit a metrical header",
                self.output_ticks_per_quarter_note
            )));
        }
        validate_bpm("bpm", self.bpm)?;
        if self.pitch_min > self.pitch_max || self.pitch_max > 127 {
            return Err(Error::Config(format!(
                "invalid pitch range {}..={}",
                self.pitch_min, self.pitch_max
            )));
        }
        if self.pitch_max - self.pitch_min < 12 {
            return Err(Error::Config(
                "pitch range must span at least one octave".to_string(),
            ));
        }
        Ok(())
    }

    /// Token of a pitch already inside the configured range.
    pub fn pitch_token(&self, pitch: u8) -> u32 {
        (pitch - self.pitch_min) as u32 + 2
    }
}
