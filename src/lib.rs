//! Converts MIDI files into fixed-shape tensors for sequence models, and
//! generated tensors back into MIDI files.
//!
//! - `codec`: note matching, tick normalization, frame assembly and
//!   reconstruction
//! - `dataset`: genre-labelled songs split into train/validation/test with
//!   cursor-based batching
//! - `synthetic`: random triad songs
//! - `melody`: a monophonic pitch-token variant of the encoding

pub mod codec;
pub mod config;
pub mod dataset;
pub mod error;
pub mod genre;
pub mod melody;
pub mod synthetic;

pub use codec::frames::Batch;
pub use codec::note::{Note, SongData};
pub use codec::Codec;
pub use config::{CodecConfig, DatasetConfig, MelodyParams};
pub use dataset::{Dataset, Split, SplitCursor};
pub use error::{Error, Result};
pub use genre::GenreTable;
