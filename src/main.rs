use clap::Parser;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use console::Console;
use cpu::decoder::decode;
use tracing::{debug, error, Level};
use tracing_subscriber::FmtSubscriber;

mod console;
mod cpu;
mod loader;
mod memory;
mod trap;

fn parse_level(s: &str) -> Result<Level, String> {
    s.parse::<Level>().map_err(|_| {
        format!(
            "'{}' is not a valid log level. Possible values are: error, warn, info, debug, trace.",
            s
        )
    })
}

#[derive(Parser, Debug)]
#[command(version, about = "Universal Machine emulator", long_about = None)]
struct Args {
    /// Program image (big-endian 32-bit words)
    image: String,

    /// Print a listing of the image instead of running it
    #[arg(short, long, default_value_t = false)]
    disassemble: bool,

    #[arg(long, default_value_t = Level::WARN, value_parser = parse_level)]
    log_level: Level,
}

fn disassemble(image: &[u8]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for (index, word) in loader::words(image).enumerate() {
        match decode(word) {
            Ok(instruction) => writeln!(out, "{:>08x}: {:>08x}  {}", index, word, instruction)?,
            Err(_) => writeln!(out, "{:>08x}: {:>08x}  .word", index, word)?,
        }
    }
    out.flush()
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Program output owns stdout, so diagnostics go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_writer(io::stderr)
        .without_time()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to set global subscriber");
    }

    let image = match fs::read(&args.image) {
        Ok(image) => image,
        Err(e) => {
            error!("cannot read {}: {}", args.image, e);
            return ExitCode::FAILURE;
        }
    };

    if args.disassemble {
        return match disassemble(&image) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("disassembly failed: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let mut um = match loader::load(&image) {
        Ok(um) => um,
        Err(fault) => {
            error!("cannot load {}: {}", args.image, fault);
            return ExitCode::from(fault.exit_code());
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(stdin.lock(), BufWriter::new(stdout.lock()));

    let result = um.run(&mut console);
    debug!("{} instructions executed", um.instruction_count());
    um.destroy();
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(fault) => {
            error!("{}", fault);
            ExitCode::from(fault.exit_code())
        }
    }
}
