//! laxents CLI - convert between LaTeX accent escapes and Unicode characters

#[cfg(feature = "cli")]
use clap::{ArgGroup, CommandFactory, Parser};
#[cfg(feature = "cli")]
use laxents::{convert_stream, ConversionError, ConversionResult, ConvertOptions, Direction};
#[cfg(feature = "cli")]
use std::fs::File;
#[cfg(feature = "cli")]
use std::io::{self, BufReader, BufWriter, IsTerminal, Write};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "laxents")]
#[command(version)]
#[command(about = "Convert between LaTeX accent escapes and Unicode characters", long_about = None)]
#[command(group(
    ArgGroup::new("direction")
        .required(true)
        .args(["to_unicode", "to_latex"])
))]
struct Cli {
    /// Replace LaTeX accent escapes (\'e, \c{c}, {\oe}) with Unicode characters
    #[arg(short = 'u', long)]
    to_unicode: bool,

    /// Replace accented Unicode characters with LaTeX accent escapes
    #[arg(short = 'l', long)]
    to_latex: bool,

    /// Input file path (reads from stdin if neither this nor TEXT is given)
    #[arg(short, long, conflicts_with = "text")]
    input: Option<PathBuf>,

    /// Output file path (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Text to convert
    text: Option<String>,

    /// Require UTF-8 input and fail on malformed bytes instead of
    /// detecting the charset
    #[arg(long)]
    strict: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[cfg(feature = "cli")]
impl Cli {
    fn direction(&self) -> Direction {
        if self.to_unicode {
            Direction::ToUnicode
        } else {
            Direction::ToLatex
        }
    }

    fn options(&self) -> ConvertOptions {
        if self.strict {
            ConvertOptions::strict_utf8()
        } else {
            ConvertOptions::default()
        }
    }
}

#[cfg(feature = "cli")]
fn main() -> io::Result<()> {
    // no arguments at all: show usage instead of a missing-argument error
    if std::env::args_os().len() <= 1 {
        Cli::command().print_help()?;
        return Ok(());
    }

    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn run(cli: &Cli) -> ConversionResult<()> {
    let direction = cli.direction();
    let options = cli.options();

    let output: Box<dyn Write> = match cli.output {
        Some(ref path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut output = match (&cli.text, &cli.input) {
        (Some(text), _) => convert_stream(text.as_bytes(), output, direction, &options)?,
        (None, Some(path)) => {
            let file = File::open(path)?;
            log::debug!("reading {}", path.display());
            convert_stream(BufReader::new(file), output, direction, &options)?
        }
        (None, None) => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                return Err(ConversionError::invalid("no input data provided"));
            }
            convert_stream(stdin.lock(), output, direction, &options)?
        }
    };
    output.flush()?;

    if let Some(ref path) = cli.output {
        eprintln!("✓ Output written to: {}", path.display());
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install laxents --features cli");
    eprintln!("  laxents (--to-unicode | --to-latex) [-i INPUT] [-o OUTPUT] [TEXT]");
    std::process::exit(1);
}
