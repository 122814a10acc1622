//! Songs grouped by genre and split into train, validation and test sets.
//!
//! Batches are read through a `SplitCursor` value: `get_batch` takes the
//! cursor and hands back the advanced one, so several readers can walk the
//! same split independently.

use crate::codec::frames::{assemble_batch, Batch};
use crate::codec::note::SongData;
use crate::codec::Codec;
use crate::config::DatasetConfig;
use crate::error::Result;
use crate::genre::GenreTable;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Split {
    Train,
    Validation,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Validation, Split::Test];
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Split::Train => "train",
            Split::Validation => "validation",
            Split::Test => "test",
        };
        f.write_str(name)
    }
}

/// Read position inside one split.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SplitCursor {
    pub split: Split,
    pub offset: usize,
}

impl SplitCursor {
    pub fn new(split: Split) -> Self {
        SplitCursor { split, offset: 0 }
    }

    pub fn rewind(self) -> Self {
        Self::new(self.split)
    }

    pub fn advanced(self, batch_size: usize) -> Self {
        SplitCursor {
            split: self.split,
            offset: self.offset + batch_size,
        }
    }

    /// Back to the start of the split when the next batch would not fit.
    pub fn wrapped(self, split_len: usize, batch_size: usize) -> Self {
        if self.offset + batch_size > split_len {
            self.rewind()
        } else {
            self
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct LabeledSong {
    /// Index into the dataset's genre table.
    pub genre: usize,
    pub song: SongData,
}

pub struct Dataset {
    genres: GenreTable,
    tones_per_cell: usize,
    train: Vec<LabeledSong>,
    validation: Vec<LabeledSong>,
    test: Vec<LabeledSong>,
}

impl Dataset {
    pub fn from_splits(
        genres: GenreTable,
        tones_per_cell: usize,
        train: Vec<LabeledSong>,
        validation: Vec<LabeledSong>,
        test: Vec<LabeledSong>,
    ) -> Self {
        Dataset {
            genres,
            tones_per_cell,
            train,
            validation,
            test,
        }
    }

    /// Splits `songs` in order: the first `test_percentage` go to test, the
    /// next `validation_percentage` to validation, the rest to train.
    pub fn from_songs(
        genres: GenreTable,
        tones_per_cell: usize,
        mut songs: Vec<LabeledSong>,
        validation_percentage: f64,
        test_percentage: f64,
    ) -> Self {
        let count = songs.len();
        let test_len = (test_percentage / 100.0 * count as f64) as usize;
        let validation_len = (validation_percentage / 100.0 * count as f64) as usize;
        let train = songs.split_off((test_len + validation_len).min(count));
        let validation = songs.split_off(test_len.min(songs.len()));
        let dataset = Self::from_splits(genres, tones_per_cell, train, validation, songs);
        dataset.log_sizes();
        dataset
    }

    /// Reads every file in `<datadir>/<genre>/` for each configured genre.
    ///
    /// Files that fail to decode, or contain no notes, are logged and left out.
    pub fn load<R: Rng + ?Sized>(
        datadir: impl AsRef<Path>,
        config: &DatasetConfig,
        codec: &Codec,
        rng: &mut R,
    ) -> Result<Self> {
        config.validate()?;
        let genres = GenreTable::new(config.genres.iter().cloned());
        let mut songs = Vec::new();

        for (genre, label) in genres.labels().iter().enumerate() {
            let current_path = datadir.as_ref().join(label);
            if !current_path.is_dir() {
                warn!("Path does not exist: {}", current_path.display());
                continue;
            }
            for path in Self::list_files(&current_path)? {
                match codec.encode_file(&path) {
                    Ok(song) if song.is_empty() => {
                        warn!("No notes in {}, skipping", path.display());
                    }
                    Ok(song) => {
                        debug!("Read {} ({})", path.display(), label);
                        songs.push(LabeledSong { genre, song });
                    }
                    Err(err) => warn!("Error reading {}: {}", path.display(), err),
                }
            }
        }

        if config.shuffle {
            songs.shuffle(rng);
        }
        Ok(Self::from_songs(
            genres,
            codec.config().tones_per_cell,
            songs,
            config.validation_percentage,
            config.test_percentage,
        ))
    }

    fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir)?.map(|entry| entry.map(|e| e.path()));
        Ok(Self::readable_files(dir, entries))
    }

    /// Sorted regular files among `entries`. Entries that failed to read are
    /// logged and skipped.
    fn readable_files(
        dir: &Path,
        entries: impl IntoIterator<Item = std::io::Result<PathBuf>>,
    ) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(err) => {
                    warn!("Error listing {}: {}", dir.display(), err);
                    continue;
                }
            };
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        files
    }

    fn log_sizes(&self) {
        let sizes: Vec<String> = Split::ALL
            .iter()
            .map(|split| format!("{} {}", split, self.len(*split)))
            .collect();
        info!("songs: {}", sizes.join(", "));
    }

    pub fn genres(&self) -> &GenreTable {
        &self.genres
    }

    pub fn songs(&self, split: Split) -> &[LabeledSong] {
        match split {
            Split::Train => &self.train,
            Split::Validation => &self.validation,
            Split::Test => &self.test,
        }
    }

    pub fn len(&self, split: Split) -> usize {
        self.songs(split).len()
    }

    pub fn num_song_features(&self) -> usize {
        crate::codec::frames::num_song_features(self.tones_per_cell)
    }

    pub fn num_meta_features(&self) -> usize {
        self.genres.len()
    }

    /// Next `batch_size` songs of the cursor's split as a batch, with the
    /// cursor moved past them. `None` when the split is empty or fewer than
    /// `batch_size` songs are left.
    pub fn get_batch<R: Rng + ?Sized>(
        &self,
        cursor: SplitCursor,
        batch_size: usize,
        sequence_length: usize,
        rng: &mut R,
    ) -> Option<(Batch, SplitCursor)> {
        let songs = self.songs(cursor.split);
        if songs.is_empty() || batch_size == 0 || cursor.offset + batch_size > songs.len() {
            debug!(
                "{} split exhausted at {} of {} (batch {})",
                cursor.split,
                cursor.offset,
                songs.len(),
                batch_size
            );
            return None;
        }

        let selected: Vec<(usize, &SongData)> = songs[cursor.offset..cursor.offset + batch_size]
            .iter()
            .map(|labeled| (labeled.genre, &labeled.song))
            .collect();
        let batch = assemble_batch(
            &selected,
            self.genres.len(),
            sequence_length,
            self.tones_per_cell,
            rng,
        );
        Some((batch, cursor.advanced(batch_size)))
    }
}
