//! Song notes to feature frames.
//!
//! A frame holds the time since the previous frame's onset followed by
//! `(length, frequency, velocity)` for each of `tones_per_cell` tone slots.
//! Notes sharing an onset are bundled into one frame, in list order, until
//! the slots are full; any further notes at that onset start the next frame
//! with a zero time offset.

use super::note::{Note, SongData};
use crate::genre::one_hot;
use ndarray::{Array2, Array3, ArrayViewMut1, ArrayViewMut2, Axis};
use rand::Rng;

pub const TICKS_FROM_PREV_START: usize = 0;
pub const LENGTH: usize = 1;
pub const FREQUENCY: usize = 2;
pub const VELOCITY: usize = 3;

pub const NUM_FEATURES_PER_TONE: usize = 3;

pub const TICKS_DIVISOR: f64 = 100.0;
pub const LENGTH_DIVISOR: f64 = 100.0;
pub const FREQUENCY_DIVISOR: f64 = 1000.0;
pub const VELOCITY_DIVISOR: f64 = 100.0;

pub fn num_song_features(tones_per_cell: usize) -> usize {
    NUM_FEATURES_PER_TONE * tones_per_cell + 1
}

/// Training batch: one genre row and one frame sequence per song.
#[derive(Clone, PartialEq, Debug)]
pub struct Batch {
    /// `[batch, num_genres]`
    pub meta_one_hot: Array2<f32>,
    /// `[batch, sequence_length, num_song_features]`
    pub frames: Array3<f32>,
}

impl Batch {
    pub fn batch_size(&self) -> usize {
        self.frames.len_of(Axis(0))
    }
}

/// First note of a window. Songs with more notes than the window could ever
/// need get a uniformly random start.
pub fn window_start<R: Rng + ?Sized>(
    song_len: usize,
    sequence_length: usize,
    tones_per_cell: usize,
    rng: &mut R,
) -> usize {
    let needed = sequence_length * tones_per_cell;
    if song_len > needed {
        rng.gen_range(0..=song_len - needed)
    } else {
        0
    }
}

fn write_tone(frame: &mut ArrayViewMut1<f32>, slot: usize, note: &Note) {
    let offset = slot * NUM_FEATURES_PER_TONE;
    frame[offset + LENGTH] = (note.length / LENGTH_DIVISOR) as f32;
    frame[offset + FREQUENCY] = (note.frequency / FREQUENCY_DIVISOR) as f32;
    frame[offset + VELOCITY] = (note.velocity / VELOCITY_DIVISOR) as f32;
}

/// Writes frames for `notes[start..]` into the rows of `frames`, bundling up
/// to `tones_per_cell` notes per row. Rows past the end of the song are left
/// untouched. Returns the number of rows written.
pub fn fill_frames(
    notes: &[Note],
    start: usize,
    tones_per_cell: usize,
    mut frames: ArrayViewMut2<f32>,
) -> usize {
    let mut n = start;
    let mut row = 0;
    let mut prev_onset: Option<f64> = None;
    while row < frames.nrows() && n < notes.len() {
        let primary = &notes[n];
        let mut frame = frames.row_mut(row);
        let ticks = prev_onset.map_or(0.0, |onset| primary.onset_tick - onset);
        frame[TICKS_FROM_PREV_START] = (ticks / TICKS_DIVISOR) as f32;
        write_tone(&mut frame, 0, primary);

        let mut tone_count = 1;
        while tone_count < tones_per_cell
            && n + tone_count < notes.len()
            && notes[n + tone_count].onset_tick == primary.onset_tick
        {
            write_tone(&mut frame, tone_count, &notes[n + tone_count]);
            tone_count += 1;
        }

        prev_onset = Some(primary.onset_tick);
        n += tone_count;
        row += 1;
    }
    row
}

/// `sequence_length` frames from a random window of the song, zero-padded.
pub fn song_frames<R: Rng + ?Sized>(
    song: &SongData,
    sequence_length: usize,
    tones_per_cell: usize,
    rng: &mut R,
) -> Array2<f32> {
    let mut frames = Array2::zeros((sequence_length, num_song_features(tones_per_cell)));
    let start = window_start(song.len(), sequence_length, tones_per_cell, rng);
    fill_frames(&song.notes, start, tones_per_cell, frames.view_mut());
    frames
}

/// Every frame of the song from its first note, without padding.
pub fn full_song_frames(song: &SongData, tones_per_cell: usize) -> Array2<f32> {
    let mut frames = Array2::zeros((song.len(), num_song_features(tones_per_cell)));
    let rows = fill_frames(&song.notes, 0, tones_per_cell, frames.view_mut());
    frames.slice_axis_inplace(Axis(0), (0..rows).into());
    frames
}

/// Builds a batch from `(genre index, song)` pairs.
pub fn assemble_batch<R: Rng + ?Sized>(
    songs: &[(usize, &SongData)],
    num_genres: usize,
    sequence_length: usize,
    tones_per_cell: usize,
    rng: &mut R,
) -> Batch {
    let num_features = num_song_features(tones_per_cell);
    let mut meta_one_hot = Array2::zeros((songs.len(), num_genres));
    let mut frames = Array3::zeros((songs.len(), sequence_length, num_features));

    for (s, &(genre, song)) in songs.iter().enumerate() {
        meta_one_hot.row_mut(s).assign(&one_hot(genre, num_genres));
        let start = window_start(song.len(), sequence_length, tones_per_cell, rng);
        fill_frames(
            &song.notes,
            start,
            tones_per_cell,
            frames.index_axis_mut(Axis(0), s),
        );
    }

    Batch {
        meta_one_hot,
        frames,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn assert_row(actual: ndarray::ArrayView1<f32>, expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!(close(*a, *e), "column {}: {} != {}", i, a, e);
        }
    }

    #[test]
    fn test_two_note_song() {
        let song = SongData::new(vec![
            Note::new(0.0, 383.0, 440.0, 100.0),
            Note::new(384.0, 383.0, 880.0, 100.0),
        ]);
        let frames = song_frames(&song, 2, 1, &mut rng());
        assert_eq!(frames.dim(), (2, 4));
        assert_row(frames.row(0), &[0.0, 3.83, 0.44, 1.0]);
        assert_row(frames.row(1), &[3.84, 3.83, 0.88, 1.0]);
    }

    #[test]
    fn test_short_song_is_zero_padded() {
        let song = SongData::new(vec![Note::new(0.0, 10.0, 440.0, 50.0)]);
        let frames = song_frames(&song, 3, 1, &mut rng());
        assert_row(frames.row(0), &[0.0, 0.1, 0.44, 0.5]);
        assert_row(frames.row(1), &[0.0; 4]);
        assert_row(frames.row(2), &[0.0; 4]);
    }

    #[test]
    fn test_simultaneous_notes_bundled_up_to_cap() {
        // Three notes at onset 0, cap of two tones per cell.
        let song = SongData::new(vec![
            Note::new(0.0, 100.0, 100.0, 10.0),
            Note::new(0.0, 200.0, 200.0, 20.0),
            Note::new(0.0, 300.0, 300.0, 30.0),
            Note::new(50.0, 400.0, 400.0, 40.0),
        ]);
        let frames = song_frames(&song, 3, 2, &mut rng());
        assert_eq!(frames.dim(), (3, 7));
        assert_row(frames.row(0), &[0.0, 1.0, 0.1, 0.1, 2.0, 0.2, 0.2]);
        // Overflow note starts the next frame at the same onset.
        assert_row(frames.row(1), &[0.0, 3.0, 0.3, 0.3, 0.0, 0.0, 0.0]);
        // Bundling stops at the first onset that differs.
        assert_row(frames.row(2), &[0.5, 4.0, 0.4, 0.4, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_window_start_range() {
        let mut rng = rng();
        assert_eq!(window_start(8, 4, 2, &mut rng), 0);
        assert_eq!(window_start(3, 4, 1, &mut rng), 0);
        for _ in 0..100 {
            let start = window_start(10, 3, 2, &mut rng);
            assert!(start <= 4);
        }
    }

    #[test]
    fn test_window_first_frame_has_no_offset() {
        let notes: Vec<Note> = (0..20)
            .map(|i| Note::new(i as f64 * 96.0, 90.0, 440.0, 64.0))
            .collect();
        let song = SongData::new(notes);
        let frames = song_frames(&song, 4, 1, &mut rng());
        assert_eq!(frames[[0, TICKS_FROM_PREV_START]], 0.0);
        for row in 1..4 {
            assert!(close(frames[[row, TICKS_FROM_PREV_START]], 0.96));
        }
    }

    #[test]
    fn test_full_song_frames() {
        let song = SongData::new(vec![
            Note::new(0.0, 100.0, 100.0, 10.0),
            Note::new(0.0, 200.0, 200.0, 20.0),
            Note::new(96.0, 100.0, 300.0, 30.0),
        ]);
        let frames = full_song_frames(&song, 2);
        assert_eq!(frames.dim(), (2, 7));
        assert!(close(frames[[1, TICKS_FROM_PREV_START]], 0.96));
    }

    #[test]
    fn test_batch_shapes() {
        let a = SongData::new(vec![Note::new(0.0, 10.0, 440.0, 50.0)]);
        let b = SongData::new(vec![Note::new(0.0, 10.0, 220.0, 50.0); 40]);
        let batch = assemble_batch(&[(0, &a), (2, &b)], 3, 16, 2, &mut rng());
        assert_eq!(batch.batch_size(), 2);
        assert_eq!(batch.frames.dim(), (2, 16, 7));
        assert_eq!(batch.meta_one_hot.dim(), (2, 3));
        assert_eq!(batch.meta_one_hot.row(1).to_vec(), vec![0.0, 0.0, 1.0]);
        assert!(close(batch.frames[[1, 15, FREQUENCY]], 0.22));
    }
}
