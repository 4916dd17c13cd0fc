//! Rotor cipher machine command-line driver.
//!
//! # Usage
//!
//! ```bash
//! # Messages from a file, output to stdout
//! enigma demos/default.conf demos/trivial.in
//!
//! # Messages from stdin, output to a file
//! enigma demos/default.conf - out.txt < demos/trivial.in
//! ```

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use enigma::MachineConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Rotor cipher machine simulator
#[derive(Parser, Debug)]
#[command(name = "enigma")]
#[command(about = "Encrypt and decrypt messages on a configurable rotor cipher machine")]
#[command(version)]
struct Args {
    /// Machine configuration file
    config: PathBuf,

    /// Message file (stdin when absent or "-")
    input: Option<PathBuf>,

    /// Output file (stdout when absent)
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let text = fs::read_to_string(&args.config)
        .with_context(|| format!("could not open {}", args.config.display()))?;
    let config: MachineConfig = text
        .parse()
        .with_context(|| format!("invalid configuration {}", args.config.display()))?;
    tracing::info!(
        rotors = config.rotors().len(),
        slots = config.num_rotors(),
        "configuration loaded"
    );

    let input: Box<dyn io::BufRead> = match &args.input {
        Some(path) if path.as_os_str() != "-" => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("could not open {}", path.display()))?,
        )),
        _ => Box::new(io::stdin().lock()),
    };

    match &args.output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("could not open {}", path.display()))?;
            enigma::process(&config, input, BufWriter::new(file))?;
        }
        None => enigma::process(&config, input, io::stdout().lock())?,
    }

    Ok(())
}
