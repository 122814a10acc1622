//! Monophonic pitch-token encoding.
//!
//! A song becomes a sequence of tokens, one per `ticks_per_step` output
//! ticks: a pitch token (`pitch - pitch_min + 2`) where a note starts, hold
//! tokens (`1`) while it sounds and an off token (`0`) where it ends. Only
//! one note sounds at a time and the gaps between notes are not encoded.

use crate::codec::event::{RawEvent, RawEventKind};
use crate::codec::reconstruct::{events_to_track, single_track_smf, TimedEvent};
use crate::codec::tick::TickScale;
use crate::config::MelodyParams;
use crate::error::{Error, Result};
use midly::Smf;
use ndarray::Array2;
use rand::Rng;
use std::path::Path;
use tracing::debug;

pub const OFF_TOKEN: u32 = 0;
pub const HOLD_TOKEN: u32 = 1;

pub struct MelodyCodec {
    params: MelodyParams,
}

/// Inputs and next-token targets of a language-model batch.
#[derive(Clone, PartialEq, Debug)]
pub struct MelodyBatch {
    /// `[batch, song_length]`
    pub inputs: Array2<f32>,
    /// `inputs` shifted one step ahead.
    pub targets: Array2<f32>,
    /// Offset of the next batch.
    pub next_offset: usize,
}

struct OpenMelodyNote {
    key: u8,
    onset_tick: u64,
}

impl MelodyCodec {
    pub fn new(params: MelodyParams) -> Result<Self> {
        params.validate()?;
        Ok(MelodyCodec { params })
    }

    pub fn params(&self) -> &MelodyParams {
        &self.params
    }

    pub fn encode_file(&self, path: impl AsRef<Path>) -> Result<Vec<u32>> {
        let data = std::fs::read(path.as_ref())?;
        self.encode_bytes(&data)
    }

    pub fn encode_bytes(&self, data: &[u8]) -> Result<Vec<u32>> {
        let smf = Smf::parse(data)?;
        self.encode_smf(&smf)
    }

    /// Encodes the file track after track. The native resolution must be a
    /// multiple of the output resolution.
    pub fn encode_smf(&self, smf: &Smf) -> Result<Vec<u32>> {
        let ticks_per_beat = match smf.header.timing {
            midly::Timing::Metrical(ticks_per_beat) => ticks_per_beat.as_int(),
            midly::Timing::Timecode(_, _) => return Err(Error::UnsupportedTiming),
        };
        let scale = TickScale::exact(ticks_per_beat, self.params.output_ticks_per_quarter_note)?;
        let ratio = scale.factor() as u64;

        let mut tokens = Vec::new();
        for track in smf.tracks.iter() {
            let mut tick: u64 = 0;
            let mut open: Option<OpenMelodyNote> = None;
            for event in track.iter().map(RawEvent::from) {
                if tokens.len() >= self.params.max_tokens {
                    debug!("Token limit {} reached", self.params.max_tokens);
                    return Ok(tokens);
                }
                tick += event.delta as u64;
                let output_tick = tick / ratio;

                if let Some(key) = event.released_key() {
                    match open.take() {
                        Some(note) if note.key == key => {
                            self.push_note(&mut tokens, note.key, output_tick - note.onset_tick);
                        }
                        other => open = other,
                    }
                } else if let RawEventKind::NoteOn { key, .. } = event.kind {
                    if open.is_none() {
                        open = Some(OpenMelodyNote {
                            key,
                            onset_tick: output_tick,
                        });
                    }
                }
            }
        }
        Ok(tokens)
    }

    fn push_note(&self, tokens: &mut Vec<u32>, key: u8, length: u64) {
        let steps = length / self.params.ticks_per_step as u64;
        tokens.push(self.params.pitch_token(self.fold_pitch(key)));
        for _ in 1..steps {
            tokens.push(HOLD_TOKEN);
        }
        tokens.push(OFF_TOKEN);
    }

    /// Moves a pitch into the configured range by whole octaves.
    pub fn fold_pitch(&self, pitch: u8) -> u8 {
        let (min, max) = (self.params.pitch_min, self.params.pitch_max);
        if pitch > max {
            pitch - ((pitch - max) / 12 + 1) * 12
        } else if pitch < min {
            pitch + ((min - pitch) / 12 + 1) * 12
        } else {
            pitch
        }
    }

    fn token_pitch(&self, token: u32) -> u8 {
        token
            .saturating_sub(2)
            .saturating_add(self.params.pitch_min as u32)
            .min(127) as u8
    }

    /// Decodes tokens into a single-track file. A note still open at the end
    /// is closed after the last token.
    pub fn tokens_to_smf(&self, tokens: &[u32]) -> Smf<'static> {
        let step = self.params.ticks_per_step as f64;
        let mut events = Vec::new();
        let mut open: Option<u8> = None;

        for (i, &token) in tokens.iter().enumerate() {
            match open {
                None if token > HOLD_TOKEN => {
                    let key = self.token_pitch(token);
                    let tick = i as f64 * step;
                    events.push(TimedEvent::note_on(tick, key, self.params.velocity));
                    open = Some(key);
                }
                Some(key) if token == OFF_TOKEN => {
                    events.push(TimedEvent::note_off(i as f64 * step, key));
                    open = None;
                }
                _ => {}
            }
        }
        if let Some(key) = open {
            events.push(TimedEvent::note_off(tokens.len() as f64 * step, key));
        }

        let track = events_to_track(
            &events,
            self.params.bpm,
            self.params.output_ticks_per_quarter_note,
        );
        single_track_smf(track, self.params.output_ticks_per_quarter_note)
    }

    pub fn save(&self, path: impl AsRef<Path>, tokens: &[u32]) -> Result<()> {
        self.tokens_to_smf(tokens).save(path.as_ref())?;
        Ok(())
    }
}

/// Reads `batch_size` songs starting at `offset`, wrapping to the start of
/// `songs` when the batch would run past the end. Each song contributes a
/// random window of `song_length + 1` tokens.
pub fn next_batch<R: Rng + ?Sized>(
    songs: &[Vec<u32>],
    offset: usize,
    batch_size: usize,
    song_length: usize,
    rng: &mut R,
) -> Result<MelodyBatch> {
    if songs.is_empty() || batch_size == 0 || batch_size > songs.len() {
        return Err(Error::InsufficientSongs {
            needed: batch_size,
            available: songs.len(),
        });
    }
    let spare = songs.len() - batch_size;
    let offset = if offset > spare {
        if spare == 0 {
            0
        } else {
            offset % spare
        }
    } else {
        offset
    };

    let window = song_length + 1;
    let mut inputs = Array2::zeros((batch_size, song_length));
    let mut targets = Array2::zeros((batch_size, song_length));
    for (s, song) in songs[offset..offset + batch_size].iter().enumerate() {
        if song.len() < window {
            return Err(Error::SongTooShort {
                len: song.len(),
                needed: window,
            });
        }
        let begin = rng.gen_range(0..=song.len() - window);
        for t in 0..song_length {
            inputs[[s, t]] = song[begin + t] as f32;
            targets[[s, t]] = song[begin + t + 1] as f32;
        }
    }

    Ok(MelodyBatch {
        inputs,
        targets,
        next_offset: offset + batch_size,
    })
}
