use midi_tensor::codec::frequency::frequency_to_tone;
use midi_tensor::{Codec, CodecConfig, SongData};
use midly::{
    num::{u15, u28, u4, u7},
    Format, Header, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
};
use pretty_assertions::assert_eq;

fn key_event(delta: u32, key: u8, vel: u8) -> TrackEvent<'static> {
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

/// `count` back-to-back notes, each `length` ticks long with `gap` ticks of
/// rest after it.
fn melody_bytes(ticks_per_beat: u16, count: u8, length: u32, gap: u32) -> Vec<u8> {
    let mut track = Vec::new();
    for i in 0..count {
        let delta = if i == 0 { 0 } else { gap };
        track.push(key_event(delta, 60 + i, 80));
        track.push(key_event(length, 60 + i, 0));
    }
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(ticks_per_beat)),
    ));
    smf.tracks.push(track);
    let mut bytes = Vec::new();
    smf.write_std(&mut bytes).unwrap();
    bytes
}

fn tones(song: &SongData) -> Vec<i32> {
    song.notes
        .iter()
        .map(|n| frequency_to_tone(n.frequency).unwrap().tone)
        .collect()
}

#[test]
fn encode_decode_encode_keeps_notes() {
    let codec = Codec::new(CodecConfig::default()).unwrap();
    let song = codec.encode_bytes(&melody_bytes(384, 8, 300, 100)).unwrap();
    assert_eq!(song.len(), 8);

    let frames = codec.full_song_frames(&song);
    assert_eq!(frames.dim(), (8, 4));
    let decoded = codec.decode(frames.view()).unwrap();
    let mut bytes = Vec::new();
    decoded.write_std(&mut bytes).unwrap();
    let again = codec.encode_bytes(&bytes).unwrap();

    assert_eq!(tones(&again), tones(&song));
    assert_eq!(tones(&song), (60..68).collect::<Vec<i32>>());
    for (before, after) in song.notes.iter().zip(again.notes.iter()) {
        assert!((before.onset_tick - after.onset_tick).abs() <= 1.0);
        assert!((before.length - after.length).abs() <= 1.0);
        assert_eq!(before.velocity, after.velocity);
    }
}

#[test]
fn native_resolution_is_rescaled() {
    let codec = Codec::new(CodecConfig::default()).unwrap();
    let song = codec.encode_bytes(&melody_bytes(768, 3, 600, 200)).unwrap();
    let onsets: Vec<f64> = song.notes.iter().map(|n| n.onset_tick).collect();
    assert_eq!(onsets, vec![0.0, 400.0, 800.0]);
    assert!(song.notes.iter().all(|n| n.length == 300.0));
}

#[test]
fn bundled_chord_survives_round_trip() {
    let codec = Codec::new(CodecConfig::default().with_tones_per_cell(3)).unwrap();
    // C major triad held for a quarter note.
    let mut track = vec![key_event(0, 60, 90), key_event(0, 64, 90), key_event(0, 67, 90)];
    track.extend([key_event(384, 60, 0), key_event(0, 64, 0), key_event(0, 67, 0)]);
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(384)),
    ));
    smf.tracks.push(track);

    let song = codec.encode_smf(&smf).unwrap();
    let frames = codec.full_song_frames(&song);
    assert_eq!(frames.nrows(), 1);

    let decoded = codec.decode(frames.view()).unwrap();
    let mut bytes = Vec::new();
    decoded.write_std(&mut bytes).unwrap();
    let again = codec.encode_bytes(&bytes).unwrap();
    let mut decoded_tones = tones(&again);
    decoded_tones.sort();
    assert_eq!(decoded_tones, vec![60, 64, 67]);
}

#[test]
fn decode_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.mid");
    let codec = Codec::new(CodecConfig::default()).unwrap();
    let song = codec.encode_bytes(&melody_bytes(384, 2, 100, 0)).unwrap();

    codec
        .decode_to_file(Some(path.as_path()), codec.full_song_frames(&song).view())
        .unwrap();
    let read_back = codec.encode_file(&path).unwrap();
    assert_eq!(tones(&read_back), vec![60, 61]);
}
