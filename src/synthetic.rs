//! Synthetic songs of random diatonic triads, for checking a model end to end
//! without a MIDI corpus.

use crate::codec::frequency::tone_to_frequency;
use crate::codec::note::{Note, SongData};
use crate::codec::pacing::inject_pace_events;
use crate::config::CodecConfig;
use crate::dataset::{Dataset, LabeledSong};
use crate::genre::GenreTable;
use rand::Rng;
use tracing::{debug, info};

/// Scale degrees of the chord roots, in semitones above the key.
const BASE_TONES: [u8; 6] = [0, 2, 4, 5, 7, 9];
const CHORD_IS_MAJOR: [bool; 6] = [true, false, false, true, true, false];

const MAJOR_THIRD_OFFSET: u8 = 4;
const MINOR_THIRD_OFFSET: u8 = 3;
const FIFTH_OFFSET: u8 = 7;

const VELOCITY: f64 = 100.0;

#[derive(Clone, Debug)]
pub struct ChordConfig {
    pub num_songs: usize,
    /// Chords per song.
    pub song_length: usize,
    pub genre: String,
}

impl Default for ChordConfig {
    fn default() -> Self {
        ChordConfig {
            num_songs: 1000,
            song_length: 500,
            genre: "classical".to_string(),
        }
    }
}

/// One song: a chord on every quarter note, each held one tick short of the next.
pub fn chord_song<R: Rng + ?Sized>(
    song_length: usize,
    quarter_note: f64,
    rng: &mut R,
) -> SongData {
    let key: u8 = rng.gen_range(0..=100);
    let mut song = SongData::default();
    for j in 0..song_length {
        let onset_tick = j as f64 * quarter_note;
        let length = quarter_note - 1.0;

        let degree = rng.gen_range(0..BASE_TONES.len());
        let base_tone = key + BASE_TONES[degree];
        let third = if CHORD_IS_MAJOR[degree] {
            base_tone + MAJOR_THIRD_OFFSET
        } else {
            base_tone + MINOR_THIRD_OFFSET
        };
        let fifth = base_tone + FIFTH_OFFSET;

        for tone in [base_tone, third, fifth] {
            song.notes.push(Note::new(
                onset_tick,
                length,
                tone_to_frequency(tone as f64),
                VELOCITY,
            ));
        }
    }
    song.sort();
    song
}

/// Generates the chord dataset. Song `i` goes to validation when `i % 100 == 0`,
/// to test when `i % 100 == 1`, and to train otherwise.
pub fn generate_chords<R: Rng + ?Sized>(
    config: &ChordConfig,
    codec_config: &CodecConfig,
    rng: &mut R,
) -> Dataset {
    let quarter_note = codec_config.output_ticks_per_quarter_note as f64;
    let mut train = Vec::new();
    let mut validation = Vec::new();
    let mut test = Vec::new();

    for i in 0..config.num_songs {
        if i % 100 == 99 {
            debug!("Generating songs {}: {}", config.genre, i + 1);
        }
        let mut song = chord_song(config.song_length, quarter_note, rng);
        if codec_config.pace_events {
            inject_pace_events(&mut song, quarter_note);
        }
        let labeled = LabeledSong { genre: 0, song };
        match i % 100 {
            0 => validation.push(labeled),
            1 => test.push(labeled),
            _ => train.push(labeled),
        }
    }

    info!(
        "lens: train: {}, val: {}, test: {}",
        train.len(),
        validation.len(),
        test.len()
    );
    Dataset::from_splits(
        GenreTable::new([config.genre.as_str()]),
        codec_config.tones_per_cell,
        train,
        validation,
        test,
    )
}
