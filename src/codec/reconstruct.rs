//! Feature frames back to a single-track MIDI file.

use super::frames::{
    num_song_features, FREQUENCY, FREQUENCY_DIVISOR, LENGTH, LENGTH_DIVISOR,
    NUM_FEATURES_PER_TONE, TICKS_DIVISOR, TICKS_FROM_PREV_START, VELOCITY, VELOCITY_DIVISOR,
};
use super::frequency::frequency_to_tone;
use crate::error::{Error, Result};
use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use ndarray::ArrayView2;

const CHANNEL: u8 = 0;

/// Largest delta a track event can carry.
pub const MAX_DELTA: u32 = (1 << 28) - 1;

/// Largest tempo, in microseconds per quarter note, a tempo event can carry.
pub const MAX_TEMPO_MICROS: u32 = (1 << 24) - 1;

/// Microseconds per quarter note at `bpm`, saturated to what a tempo event holds.
pub fn tempo_micros(bpm: u32) -> u32 {
    (60_000_000 / bpm.max(1)).min(MAX_TEMPO_MICROS)
}

/// A note event at an absolute output tick.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TimedEvent {
    pub tick: f64,
    pub message: MidiMessage,
}

impl TimedEvent {
    pub fn note_on(tick: f64, key: u8, vel: u8) -> Self {
        TimedEvent {
            tick,
            message: MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(vel),
            },
        }
    }

    pub fn note_off(tick: f64, key: u8) -> Self {
        TimedEvent {
            tick,
            message: MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(0),
            },
        }
    }
}

/// Moves a tone into `0..=127` by whole octaves.
pub fn fold_into_midi_range(mut tone: i32) -> u8 {
    while tone < 0 {
        tone += 12;
    }
    while tone > 127 {
        tone -= 12;
    }
    tone as u8
}

/// Decodes frames into note-on/note-off pairs sorted by absolute tick.
///
/// Slots without a valid tone, with no velocity or with no length produce
/// nothing.
pub fn frames_to_events(
    frames: ArrayView2<f32>,
    tones_per_cell: usize,
) -> Result<Vec<TimedEvent>> {
    let expected = num_song_features(tones_per_cell);
    if frames.ncols() != expected {
        return Err(Error::FrameWidth {
            expected,
            actual: frames.ncols(),
        });
    }

    let mut events = Vec::new();
    let mut abs_tick = 0.0;
    for frame in frames.rows() {
        abs_tick += frame[TICKS_FROM_PREV_START] as f64 * TICKS_DIVISOR;
        for slot in 0..tones_per_cell {
            let offset = slot * NUM_FEATURES_PER_TONE;
            let length = (frame[offset + LENGTH] as f64 * LENGTH_DIVISOR).round();
            let frequency = frame[offset + FREQUENCY] as f64 * FREQUENCY_DIVISOR;
            let velocity = (frame[offset + VELOCITY] as f64 * VELOCITY_DIVISOR)
                .round()
                .clamp(0.0, 127.0) as u8;
            let Some(tone) = frequency_to_tone(frequency) else {
                continue;
            };
            if velocity == 0 || length <= 0.0 {
                continue;
            }
            let key = fold_into_midi_range(tone.tone);
            events.push(TimedEvent::note_on(abs_tick, key, velocity));
            events.push(TimedEvent::note_off(abs_tick + length, key));
        }
    }

    events.sort_by(|e1, e2| e1.tick.total_cmp(&e2.tick));
    Ok(events)
}

fn output_tick(tick: f64) -> u32 {
    tick.round().max(0.0) as u32
}

/// Builds a track: a tempo event, the given events as deltas, and an end of
/// track marker `end_of_track_delta` ticks after the last event.
///
/// Deltas longer than `MAX_DELTA` are shortened to it.
pub fn events_to_track(
    events: &[TimedEvent],
    tempo_bpm: u32,
    end_of_track_delta: u32,
) -> Track<'static> {
    let mut track: Track<'static> = Vec::with_capacity(events.len() + 2);
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_micros(tempo_bpm)))),
    });

    let mut pre_tick = 0;
    for event in events {
        let tick = output_tick(event.tick).max(pre_tick);
        track.push(TrackEvent {
            delta: u28::new((tick - pre_tick).min(MAX_DELTA)),
            kind: TrackEventKind::Midi {
                channel: u4::new(CHANNEL),
                message: event.message,
            },
        });
        pre_tick = tick;
    }

    track.push(TrackEvent {
        delta: u28::new(end_of_track_delta.min(MAX_DELTA)),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    track
}

/// Wraps one track into a Format 0 file at the given resolution.
pub fn single_track_smf(track: Track<'static>, ticks_per_quarter: u32) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(ticks_per_quarter as u16)),
    ));
    smf.tracks.push(track);
    smf
}
