use crate::codec::frequency::tone_to_frequency;
use crate::codec::note::Note;

/// A sounding note still waiting for its release.
pub struct OpenNote {
    pub channel: u8,
    pub key: u8,
    pub onset_tick: f64,
    pub velocity: u8,
}

impl OpenNote {
    pub fn new(channel: u8, key: u8, onset_tick: f64, velocity: u8) -> Self {
        OpenNote {
            channel,
            key,
            onset_tick,
            velocity,
        }
    }

    pub fn is(&self, channel: u8, key: u8) -> bool {
        self.channel == channel && self.key == key
    }

    pub fn close(self, length: f64) -> Note {
        Note::new(
            self.onset_tick,
            length,
            tone_to_frequency(self.key as f64),
            self.velocity as f64,
        )
    }
}
