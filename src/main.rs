use std::env;
use std::path::{Path, PathBuf};

use midi_tensor::{Codec, CodecConfig};

struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.len() > 3 {
        return Err(format!(
            "Usage: {} <midi_filepath> [output_filepath]",
            args[0]
        ));
    }

    Ok(Args {
        input: PathBuf::from(&args[1]),
        output: args.get(2).map(PathBuf::from),
    })
}

fn run(args: &Args) -> midi_tensor::Result<()> {
    let codec = Codec::new(CodecConfig::default().with_pace_events(true))?;
    println!("File: {}", args.input.display());
    let song = codec.encode_file(&args.input)?;

    println!("length, frequency, velocity, time from previous start.");
    let mut last_start = 0.0;
    for note in song.notes.iter() {
        println!(
            "[{}, {}, {}, {}]",
            note.length,
            note.frequency,
            note.velocity,
            note.onset_tick - last_start
        );
        last_start = note.onset_tick;
    }

    if let Some(output) = &args.output {
        save(&codec, &song, output)?;
    }
    Ok(())
}

fn save(codec: &Codec, song: &midi_tensor::SongData, output: &Path) -> midi_tensor::Result<()> {
    if output.exists() {
        println!("File already exists: {}. Not saving.", output.display());
        return Ok(());
    }
    println!("Saving: {}.", output.display());
    let frames = codec.full_song_frames(song);
    codec.decode_to_file(Some(output), frames.view())?;
    Ok(())
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}", msg);
            std::process::exit(termination::EXIT_FAILURE);
        }
    };

    if let Err(err) = run(&args) {
        eprintln!("{}", err);
        std::process::exit(termination::EXIT_FAILURE);
    }
}
