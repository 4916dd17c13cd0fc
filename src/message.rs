//! Message stream driver.
//!
//! Reads settings lines and message lines, converts every message line on
//! the machine configured by the most recent settings line and writes the
//! result in groups of five symbols.

use std::io::{BufRead, Write};

use tracing::{debug, trace};

use crate::alphabet::Alphabet;
use crate::config::{MachineConfig, MessageSettings};
use crate::error::{EnigmaError, Result};

/// Number of symbols per output group.
const GROUP: usize = 5;

/// Splits `msg` into space-separated groups of five symbols.
///
/// The last group may be shorter; an empty message stays empty.
///
/// # Examples
///
/// ```
/// use enigma::format_message;
///
/// assert_eq!(format_message("QVPQSOKOILPUBKJZPISFXDW"), "QVPQS OKOIL PUBKJ ZPISF XDW");
/// assert_eq!(format_message(""), "");
/// ```
pub fn format_message(msg: &str) -> String {
    let mut out = String::with_capacity(msg.len() + msg.len() / GROUP);
    for (i, ch) in msg.chars().enumerate() {
        if i > 0 && i % GROUP == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

/// Drops whitespace and folds symbols missing from `alphabet` to upper
/// case when the upper-case form is present.
fn normalize(line: &str, alphabet: &Alphabet) -> String {
    line.chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| {
            if alphabet.contains(ch) {
                return ch;
            }
            let mut upper = ch.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(u), None) if alphabet.contains(u) => u,
                _ => ch,
            }
        })
        .collect()
}

/// Processes every line of `input` on a machine built from `config`.
///
/// The first non-blank line must be a settings line. Each settings line
/// reconfigures the machine; each other line is converted and written to
/// `output` in groups of five, blank lines as blank lines.
///
/// # Errors
/// - [`EnigmaError::Configuration`] for a missing or invalid settings line,
///   or a message symbol outside the alphabet.
/// - [`EnigmaError::Io`] if reading or writing fails.
pub fn process<R: BufRead, W: Write>(
    config: &MachineConfig,
    input: R,
    mut output: W,
) -> Result<()> {
    let mut machine = config.build()?;
    let mut configured = false;

    for (n, line) in input.lines().enumerate() {
        let line = line?;
        let lineno = n + 1;

        if MessageSettings::is_settings_line(&line) {
            let settings = MessageSettings::parse(&line, machine.num_rotors())?;
            settings.apply(&mut machine)?;
            debug!(
                line = lineno,
                rotors = ?settings.rotors(),
                setting = settings.setting(),
                "applied settings"
            );
            configured = true;
            continue;
        }

        if !configured {
            if line.trim().is_empty() {
                continue;
            }
            return Err(EnigmaError::configuration(format!(
                "missing settings line before line {}",
                lineno
            )));
        }

        let msg = normalize(&line, machine.alphabet());
        let converted = machine.convert_str(&msg)?;
        trace!(line = lineno, symbols = msg.len(), "converted message line");
        writeln!(output, "{}", format_message(&converted))?;
    }

    output.flush()?;
    Ok(())
}
