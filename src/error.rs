//! Error types for the MIDI tensor codec.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MIDI parse error: {0}")]
    MidiParse(String),

    #[error("MIDI files with timecode timing are not supported")]
    UnsupportedTiming,

    #[error("Unusable resolution: {0} ticks per quarter note")]
    UnusableResolution(u16),

    #[error("Resolution {native} is not a multiple of the output resolution {output}")]
    IncompatibleResolution { native: u16, output: u32 },

    #[error("Frames have {actual} columns, {expected} expected")]
    FrameWidth { expected: usize, actual: usize },

    #[error("Song has {len} tokens, at least {needed} are required")]
    SongTooShort { len: usize, needed: usize },

    #[error("Batch of {needed} songs requested, only {available} available")]
    InsufficientSongs { needed: usize, available: usize },

    #[error("Invalid config: {0}")]
    Config(String),
}

impl From<midly::Error> for Error {
    fn from(e: midly::Error) -> Self {
        Error::MidiParse(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
