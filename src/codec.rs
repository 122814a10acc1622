use crate::config::CodecConfig;
use crate::error::Result;
use midly::Smf;
use ndarray::{Array2, ArrayView2};
use rand::Rng;
use std::path::Path;
use tracing::debug;

pub mod event;
pub mod frames;
pub mod frequency;
pub mod matcher;
pub mod note;
pub mod pacing;
pub mod reconstruct;
pub mod tick;

use event::RawEvent;
use note::SongData;
use tick::TickScale;

/// Encodes MIDI files into songs and feature frames, and decodes frames back
/// into MIDI files.
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    pub fn new(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Codec { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn encode_file(&self, path: impl AsRef<Path>) -> Result<SongData> {
        let data = std::fs::read(path.as_ref())?;
        debug!("Reading {}", path.as_ref().display());
        self.encode_bytes(&data)
    }

    pub fn encode_bytes(&self, data: &[u8]) -> Result<SongData> {
        let smf = Smf::parse(data)?;
        self.encode_smf(&smf)
    }

    pub fn encode_smf(&self, smf: &Smf) -> Result<SongData> {
        let scale = TickScale::from_timing(
            smf.header.timing,
            self.config.output_ticks_per_quarter_note,
        )?;
        debug!(
            "ticks_per_beat {} track num: {}",
            scale.native_ticks_per_quarter(),
            smf.tracks.len()
        );

        let tracks: Vec<Vec<RawEvent>> = smf
            .tracks
            .iter()
            .map(|track| track.iter().map(RawEvent::from).collect())
            .collect();
        let mut song = matcher::match_tracks(&tracks, scale);

        if self.config.pace_events {
            pacing::inject_pace_events(&mut song, scale.quarter_note());
        }
        debug!("Encoded {} notes", song.len());
        Ok(song)
    }

    /// `sequence_length` frames from a random window of `song`.
    pub fn song_frames<R: Rng + ?Sized>(
        &self,
        song: &SongData,
        sequence_length: usize,
        rng: &mut R,
    ) -> Array2<f32> {
        frames::song_frames(song, sequence_length, self.config.tones_per_cell, rng)
    }

    /// The whole song as frames, starting at its first note.
    pub fn full_song_frames(&self, song: &SongData) -> Array2<f32> {
        frames::full_song_frames(song, self.config.tones_per_cell)
    }

    pub fn decode(&self, frames: ArrayView2<f32>) -> Result<Smf<'static>> {
        let events = reconstruct::frames_to_events(frames, self.config.tones_per_cell)?;
        let track = reconstruct::events_to_track(
            &events,
            self.config.tempo_bpm,
            self.config.end_of_track_delta(),
        );
        Ok(reconstruct::single_track_smf(
            track,
            self.config.output_ticks_per_quarter_note,
        ))
    }

    /// Decodes `frames` and writes the file when a path is given.
    pub fn decode_to_file(
        &self,
        path: Option<&Path>,
        frames: ArrayView2<f32>,
    ) -> Result<Smf<'static>> {
        let smf = self.decode(frames)?;
        if let Some(path) = path {
            smf.save(path)?;
            debug!("Wrote {}", path.display());
        }
        Ok(smf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::{
        num::{u15, u28, u4, u7},
        Format, Header, MidiMessage, Timing, TrackEvent, TrackEventKind,
    };

    fn note(delta: u32, key: u8, vel: u8) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOn {
                    key: u7::new(key),
                    vel: u7::new(vel),
                },
            },
        }
    }

    fn smf(ticks_per_beat: u16, track: Vec<TrackEvent<'static>>) -> Smf<'static> {
        let mut smf = Smf::new(Header::new(
            Format::SingleTrack,
            Timing::Metrical(u15::new(ticks_per_beat)),
        ));
        smf.tracks.push(track);
        smf
    }

    #[test]
    fn test_encode_rescales_ticks() {
        let codec = Codec::new(CodecConfig::default()).unwrap();
        let song = codec
            .encode_smf(&smf(96, vec![note(0, 60, 90), note(48, 60, 0)]))
            .unwrap();
        assert_eq!(song.len(), 1);
        assert_eq!(song.notes[0].length, 192.0);
    }

    #[test]
    fn test_unclosed_note_gets_quarter_length() {
        let codec = Codec::new(CodecConfig::default()).unwrap();
        let song = codec.encode_smf(&smf(480, vec![note(0, 60, 90)])).unwrap();
        assert_eq!(song.notes[0].length, 384.0);
    }

    #[test]
    fn test_pacing_applied_from_config() {
        let codec = Codec::new(CodecConfig::default().with_pace_events(true)).unwrap();
        let song = codec
            .encode_smf(&smf(384, vec![note(0, 60, 90), note(1000, 60, 0)]))
            .unwrap();
        assert_eq!(song.len(), 4);
        assert!(song.is_sorted());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let codec = Codec::new(CodecConfig::default()).unwrap();
        assert!(matches!(
            codec.encode_bytes(b"not a midi file"),
            Err(crate::Error::MidiParse(_))
        ));
    }

    #[test]
    fn test_decode_without_path_only_returns() {
        let codec = Codec::new(CodecConfig::default()).unwrap();
        let frames = ndarray::array![[0.0f32, 1.0, 0.44, 1.0]];
        let smf = codec.decode_to_file(None, frames.view()).unwrap();
        assert_eq!(smf.tracks.len(), 1);
        assert_eq!(smf.header.timing, Timing::Metrical(u15::new(384)));
        // Tempo, note on, note off, end of track.
        assert_eq!(smf.tracks[0].len(), 4);
    }
}
