use super::note::{Note, SongData};

/// Frequency of pacing markers. They are silent, so any valid frequency does.
pub const PACE_FREQUENCY: f64 = 440.0;

/// Inserts a silent zero-length marker note every `interval` ticks from 0 up
/// to the end of the last note, then re-sorts the song.
pub fn inject_pace_events(song: &mut SongData, interval: f64) {
    let Some(song_end) = song.end_tick() else {
        return;
    };
    if interval <= 0.0 {
        return;
    }
    let mut pace = 0.0;
    while pace < song_end {
        song.notes.push(Note::new(pace, 0.0, PACE_FREQUENCY, 0.0));
        pace += interval;
    }
    song.sort();
}
