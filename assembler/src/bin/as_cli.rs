use std::fs::File;

use as_lib::assemble;
use common::misc::WriteU16;

use clap::Parser;
use clap_stdin::FileOrStdin;

/// C16 assembler
#[derive(Parser)]
#[command(about)]
struct Args {
    /// Input assembly file
    input: FileOrStdin,

    /// File name to output to
    #[arg(long, short)]
    output: Option<String>,
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    let input = args.input.contents().unwrap();
    let prog = match assemble(input.as_str()) {
        Ok(prog) => prog,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let outname = args.output.as_deref().unwrap_or("a.img");
    let mut out = File::create(outname).unwrap();
    for word in &prog.words {
        out.write_u16(*word);
    }
}
