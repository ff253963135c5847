use std::fs::File;
use std::io::Write;

use common::constants::{PIXEL_BYTES, SCREEN_HEIGHT, SCREEN_WIDTH};
use computer::Computer;

use clap::Parser;
use clap_stdin::FileOrStdin;

/// C16 virtual computer
#[derive(Parser)]
struct Args {
    /// Assembly source, or - for stdin
    input: FileOrStdin,

    /// Instructions to run per frame
    #[arg(long, default_value_t = 1_000)]
    cycles: usize,

    /// Number of frames to run
    #[arg(long, default_value_t = 60)]
    frames: usize,

    /// Where to write the final frame (PPM)
    #[arg(short, long)]
    output: Option<String>,
}

fn write_ppm(path: &str, pixels: &[u8]) -> std::io::Result<()> {
    let mut out = File::create(path)?;
    write!(out, "P6\n{SCREEN_WIDTH} {SCREEN_HEIGHT}\n255\n")?;
    for px in pixels.chunks_exact(PIXEL_BYTES) {
        out.write_all(&px[..3])?;
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    let source = match args.input.contents() {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let mut comp = Computer::new();
    if let Err(err) = comp.load_assembly(&source) {
        eprintln!("{err}");
        std::process::exit(1);
    }

    for _ in 0..args.frames {
        if let Err(err) = comp.run(args.cycles) {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }

    if let Some(path) = &args.output {
        let pixels = match comp.display_pixels() {
            Ok(pixels) => pixels,
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(1);
            }
        };
        if let Err(err) = write_ppm(path, &pixels) {
            eprintln!("{path}: {err}");
            std::process::exit(1);
        }
    }
}
