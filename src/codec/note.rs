use std::cmp::Ordering;

/// A closed tone in output-tick units.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Note {
    pub onset_tick: f64,
    pub length: f64,
    /// Hz.
    pub frequency: f64,
    pub velocity: f64,
}

impl Note {
    pub fn new(onset_tick: f64, length: f64, frequency: f64, velocity: f64) -> Self {
        Note {
            onset_tick,
            length,
            frequency,
            velocity,
        }
    }

    pub fn end_tick(&self) -> f64 {
        self.onset_tick + self.length
    }
}

/// Notes of one song, ordered by onset once `sort` has run.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct SongData {
    pub notes: Vec<Note>,
}

impl SongData {
    pub fn new(notes: Vec<Note>) -> Self {
        SongData { notes }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Stable sort by onset; notes sharing an onset keep their order.
    pub fn sort(&mut self) {
        self.notes
            .sort_by(|n1, n2| n1.onset_tick.partial_cmp(&n2.onset_tick).unwrap_or(Ordering::Equal));
    }

    pub fn is_sorted(&self) -> bool {
        self.notes
            .windows(2)
            .all(|pair| pair[0].onset_tick <= pair[1].onset_tick)
    }

    /// End of the last note in list order.
    pub fn end_tick(&self) -> Option<f64> {
        self.notes.last().map(Note::end_tick)
    }
}
