//! Configuration text and per-message settings lines.
//!
//! A configuration describes the alphabet, the slot and pawl counts and the
//! catalog of available rotors:
//!
//! ```text
//! ABCDEFGHIJKLMNOPQRSTUVWXYZ
//! 5 3
//!  I MQ      (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
//!  Beta N    (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
//!  B R       (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP)
//!            (RX) (SZ) (TV)
//! ```
//!
//! The type token is `M` followed by the notch symbols, `N` for a fixed
//! rotor or `R` for a reflector. Every following token that starts with
//! `(` belongs to the wiring, so an entry may continue on the next line.
//!
//! A settings line selects rotors and positions for the messages after it:
//!
//! ```text
//! * B Beta III IV I AXLE [RINGS] (HQ) (EX) (IP) (TR) (BY)
//! ```

use std::rc::Rc;
use std::str::FromStr;

use tracing::debug;

use crate::alphabet::Alphabet;
use crate::error::{EnigmaError, Result};
use crate::machine::Machine;
use crate::permutation::Permutation;
use crate::rotor::Rotor;

/// Parsed machine configuration: alphabet, counts and rotor catalog.
///
/// The catalog is kept so any number of machines can be built from it.
#[derive(Debug, Clone)]
pub struct MachineConfig {
    alphabet: Rc<Alphabet>,
    num_rotors: usize,
    pawls: usize,
    rotors: Vec<Rotor>,
}

impl MachineConfig {
    /// Creates a configuration from already constructed parts.
    pub fn new(
        alphabet: Rc<Alphabet>,
        num_rotors: usize,
        pawls: usize,
        rotors: Vec<Rotor>,
    ) -> Self {
        MachineConfig {
            alphabet,
            num_rotors,
            pawls,
            rotors,
        }
    }

    /// Parses configuration text.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if the text is truncated, a
    /// rotor entry is malformed, or any alphabet, permutation or rotor
    /// constraint is violated.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let alphabet_line = lines
            .by_ref()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(truncated)?;
        let alphabet = Rc::new(Alphabet::new(alphabet_line)?);

        let mut tokens = lines.flat_map(str::split_whitespace).peekable();
        let num_rotors = parse_count(tokens.next())?;
        let pawls = parse_count(tokens.next())?;
        debug!(
            symbols = alphabet.size(),
            num_rotors, pawls, "parsed machine shape"
        );

        let mut rotors = Vec::new();
        while let Some(name) = tokens.next() {
            if name.starts_with('(') {
                return Err(bad_rotor(format!("wiring {} has no rotor name", name)));
            }
            let kind = tokens
                .next()
                .ok_or_else(|| bad_rotor(format!("rotor {} has no type", name)))?;
            let mut cycles = String::new();
            while let Some(cycle) = tokens.next_if(|t| t.starts_with('(')) {
                if !cycles.is_empty() {
                    cycles.push(' ');
                }
                cycles.push_str(cycle);
            }
            if cycles.is_empty() {
                return Err(bad_rotor(format!("rotor {} has no wiring", name)));
            }
            let rotor = parse_rotor(name, kind, &cycles, &alphabet)?;
            debug!(name, kind, "parsed rotor");
            rotors.push(rotor);
        }

        Ok(Self::new(alphabet, num_rotors, pawls, rotors))
    }

    /// Builds a fresh machine over a copy of the catalog.
    ///
    /// # Errors
    /// Returns the [`Machine::new`] validation errors.
    pub fn build(&self) -> Result<Machine> {
        Machine::new(
            Rc::clone(&self.alphabet),
            self.num_rotors,
            self.pawls,
            self.rotors.clone(),
        )
    }

    /// Shared alphabet.
    pub fn alphabet(&self) -> &Rc<Alphabet> {
        &self.alphabet
    }

    /// Number of rotor slots.
    pub fn num_rotors(&self) -> usize {
        self.num_rotors
    }

    /// Number of pawls.
    pub fn num_pawls(&self) -> usize {
        self.pawls
    }

    /// Rotor catalog in file order.
    pub fn rotors(&self) -> &[Rotor] {
        &self.rotors
    }
}

impl FromStr for MachineConfig {
    type Err = EnigmaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn truncated() -> EnigmaError {
    EnigmaError::configuration("configuration file truncated")
}

fn bad_rotor(detail: String) -> EnigmaError {
    EnigmaError::configuration(format!("bad rotor description: {}", detail))
}

fn parse_count(token: Option<&str>) -> Result<usize> {
    let token = token.ok_or_else(truncated)?;
    token.parse().map_err(|_| {
        EnigmaError::configuration(format!("expected a rotor or pawl count, found {:?}", token))
    })
}

fn parse_rotor(name: &str, kind: &str, cycles: &str, alphabet: &Rc<Alphabet>) -> Result<Rotor> {
    let permutation = Permutation::new(cycles, Rc::clone(alphabet))?;
    match kind.split_at(kind.chars().next().map_or(0, char::len_utf8)) {
        ("M", notches) => Rotor::moving(name, permutation, notches),
        ("N", "") => Ok(Rotor::fixed(name, permutation)),
        ("R", "") => Rotor::reflector(name, permutation),
        _ => Err(bad_rotor(format!("rotor {} has unknown type {}", name, kind))),
    }
}

/// One `*` settings line: rotor names, positions, optional rings and plugboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSettings {
    rotors: Vec<String>,
    setting: String,
    rings: Option<String>,
    plugboard: String,
}

impl MessageSettings {
    /// True if `line` is a settings line rather than a message.
    pub fn is_settings_line(line: &str) -> bool {
        line.trim_start().starts_with('*')
    }

    /// Parses a settings line for a machine with `num_rotors` slots.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if the line does not start
    /// with `*`, names fewer than `num_rotors` rotors, lacks the setting
    /// token, or has stray tokens among the plugboard cycles.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::MessageSettings;
    ///
    /// let s = MessageSettings::parse("* B Beta III IV I AXLE (HQ) (EX)", 5).unwrap();
    /// assert_eq!(s.rotors(), ["B", "Beta", "III", "IV", "I"]);
    /// assert_eq!(s.setting(), "AXLE");
    /// assert_eq!(s.rings(), None);
    /// assert_eq!(s.plugboard(), "(HQ) (EX)");
    /// ```
    pub fn parse(line: &str, num_rotors: usize) -> Result<Self> {
        let body = line
            .trim_start()
            .strip_prefix('*')
            .ok_or_else(|| EnigmaError::configuration("settings line must start with '*'"))?;
        let mut tokens = body.split_whitespace().peekable();

        let mut rotors = Vec::with_capacity(num_rotors);
        while rotors.len() < num_rotors {
            match tokens.next_if(|t| !t.starts_with('(')) {
                Some(name) => rotors.push(name.to_string()),
                None => break,
            }
        }
        if rotors.len() != num_rotors {
            return Err(EnigmaError::configuration(format!(
                "settings line names {} rotors, machine has {} slots",
                rotors.len(),
                num_rotors
            )));
        }

        let setting = tokens
            .next_if(|t| !t.starts_with('('))
            .ok_or_else(|| EnigmaError::configuration("settings line has no rotor setting"))?
            .to_string();
        let rings = tokens.next_if(|t| !t.starts_with('(')).map(str::to_string);

        let mut plugboard = String::new();
        for token in tokens {
            if !token.starts_with('(') {
                return Err(EnigmaError::configuration(format!(
                    "unexpected {:?} in plugboard cycles",
                    token
                )));
            }
            if !plugboard.is_empty() {
                plugboard.push(' ');
            }
            plugboard.push_str(token);
        }

        Ok(MessageSettings {
            rotors,
            setting,
            rings,
            plugboard,
        })
    }

    /// Rotor names, slot 0 first.
    pub fn rotors(&self) -> &[String] {
        &self.rotors
    }

    /// Initial positions of slots 1..n.
    pub fn setting(&self) -> &str {
        &self.setting
    }

    /// Ring offsets of slots 1..n, if given.
    pub fn rings(&self) -> Option<&str> {
        self.rings.as_deref()
    }

    /// Plugboard cycles, empty for no plugs.
    pub fn plugboard(&self) -> &str {
        &self.plugboard
    }

    /// Inserts the rotors, sets positions and rings, and installs the plugboard.
    ///
    /// The machine is unchanged on error: rotors, settings, rings and
    /// plugboard all stay as they were before the call.
    ///
    /// # Errors
    /// Returns the errors of [`Machine::insert_rotors`], [`Machine::set_rotors`],
    /// [`Machine::set_rings`], [`Permutation::new`] and
    /// [`Machine::set_plugboard`].
    pub fn apply(&self, machine: &mut Machine) -> Result<()> {
        let mut next = machine.clone();
        next.insert_rotors(&self.rotors)?;
        next.set_rotors(&self.setting)?;
        if let Some(rings) = &self.rings {
            next.set_rings(rings)?;
        }
        let plugboard = Permutation::new(&self.plugboard, Rc::clone(next.alphabet()))?;
        next.set_plugboard(plugboard)?;
        *machine = next;
        Ok(())
    }
}
