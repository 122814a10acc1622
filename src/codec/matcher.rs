use super::event::{RawEvent, RawEventKind};
use super::note::{Note, SongData};
use super::tick::TickScale;
use tracing::debug;

mod open_note;
use open_note::OpenNote;

/// Pairs note-on and note-off events of one track into closed notes.
///
/// Open notes are kept in the order they started. A release closes the
/// oldest open note with the same channel and key; releases with nothing to
/// close are dropped.
pub struct TrackMatcher {
    scale: TickScale,
    tick: u64,
    open_notes: Vec<OpenNote>,
    closed_notes: Vec<Note>,
    unmatched: usize,
}

impl TrackMatcher {
    pub fn new(scale: TickScale) -> Self {
        TrackMatcher {
            scale,
            tick: 0,
            open_notes: Vec::new(),
            closed_notes: Vec::new(),
            unmatched: 0,
        }
    }

    fn get_open_note(&self, channel: u8, key: u8) -> Option<usize> {
        self.open_notes
            .iter()
            .position(|note| note.is(channel, key))
    }

    pub fn push_event(&mut self, event: &RawEvent) {
        self.tick += event.delta as u64;
        let event_tick = self.scale.to_output(self.tick);

        if let Some(key) = event.released_key() {
            match self.get_open_note(event.channel, key) {
                Some(index) => {
                    let note = self.open_notes.remove(index);
                    let length = event_tick - note.onset_tick;
                    self.closed_notes.push(note.close(length));
                }
                None => self.unmatched += 1,
            }
        } else if let RawEventKind::NoteOn { key, vel } = event.kind {
            self.open_notes
                .push(OpenNote::new(event.channel, key, event_tick, vel));
        }
    }

    /// Closes the notes still sounding with a length of one quarter note.
    pub fn finish(mut self) -> Vec<Note> {
        if !self.open_notes.is_empty() {
            debug!(
                "Closing {} notes without release at end of track",
                self.open_notes.len()
            );
        }
        if self.unmatched > 0 {
            debug!("Ignored {} releases without an open note", self.unmatched);
        }
        let quarter_note = self.scale.quarter_note();
        for note in self.open_notes.drain(..) {
            self.closed_notes.push(note.close(quarter_note));
        }
        self.closed_notes
    }
}

pub fn match_track<'a>(
    events: impl IntoIterator<Item = &'a RawEvent>,
    scale: TickScale,
) -> Vec<Note> {
    let mut matcher = TrackMatcher::new(scale);
    for event in events {
        matcher.push_event(event);
    }
    matcher.finish()
}

/// Matches every track and merges the notes into one song sorted by onset.
pub fn match_tracks<T>(tracks: &[T], scale: TickScale) -> SongData
where
    T: AsRef<[RawEvent]>,
{
    let mut song = SongData::default();
    for track in tracks {
        song.notes.extend(match_track(track.as_ref(), scale));
    }
    song.sort();
    song
}
