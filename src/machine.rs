//! Machine: rotor slots, plugboard, stepping and the signal path.
//!
//! # Slot layout
//!
//! ```text
//! slot 0          reflector
//! slot 1..n-p     fixed rotors
//! slot n-p..n     moving rotors (one pawl each), slot n-1 is the fastest
//! ```
//!
//! where `n` is the number of rotors and `p` the number of pawls.
//!
//! # Signal path
//!
//! For every symbol the rotors first step, then the signal runs
//! plugboard → slots n-1..1 forward → reflector → slots 1..n-1 backward →
//! plugboard.
//!
//! A [`Machine`] holds its alphabet behind an [`Rc`] and mutates rotor
//! settings in place on every conversion, so one instance belongs to one
//! message stream on one thread.

use std::rc::Rc;

use crate::alphabet::Alphabet;
use crate::error::{EnigmaError, Result};
use crate::permutation::Permutation;
use crate::rotor::Rotor;

/// A configured rotor cipher machine.
#[derive(Debug, Clone)]
pub struct Machine {
    alphabet: Rc<Alphabet>,
    num_rotors: usize,
    pawls: usize,
    catalog: Vec<Rotor>,
    slots: Vec<Rotor>,
    plugboard: Permutation,
}

impl Machine {
    /// Creates a machine with `num_rotors` slots and `pawls` pawls that can
    /// be loaded with rotors from `all_rotors`.
    ///
    /// No rotors are inserted yet and the plugboard is the identity.
    ///
    /// # Parameters
    /// - `alphabet`: Alphabet shared with every rotor of the catalog.
    /// - `num_rotors`: Number of slots, reflector included (at least 2).
    /// - `pawls`: Number of rightmost slots holding moving rotors
    ///   (`0 <= pawls < num_rotors`).
    /// - `all_rotors`: Catalog of available rotors, names distinct.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if the counts are out of range,
    /// a catalog name repeats, or a rotor is wired over a different alphabet
    /// size.
    pub fn new(
        alphabet: Rc<Alphabet>,
        num_rotors: usize,
        pawls: usize,
        all_rotors: Vec<Rotor>,
    ) -> Result<Self> {
        if num_rotors < 2 {
            return Err(EnigmaError::configuration(format!(
                "machine needs at least 2 rotor slots, got {}",
                num_rotors
            )));
        }
        if pawls >= num_rotors {
            return Err(EnigmaError::configuration(format!(
                "{} pawls do not fit {} rotor slots",
                pawls, num_rotors
            )));
        }
        for (i, rotor) in all_rotors.iter().enumerate() {
            if rotor.size() != alphabet.size() {
                return Err(EnigmaError::configuration(format!(
                    "rotor {} is wired for {} symbols, alphabet has {}",
                    rotor.name(),
                    rotor.size(),
                    alphabet.size()
                )));
            }
            if all_rotors[..i].iter().any(|r| r.name() == rotor.name()) {
                return Err(EnigmaError::configuration(format!(
                    "rotor {} defined twice",
                    rotor.name()
                )));
            }
        }
        let plugboard = Permutation::identity(Rc::clone(&alphabet));
        Ok(Machine {
            alphabet,
            num_rotors,
            pawls,
            catalog: all_rotors,
            slots: Vec::new(),
            plugboard,
        })
    }

    /// Number of rotor slots.
    pub fn num_rotors(&self) -> usize {
        self.num_rotors
    }

    /// Number of pawls.
    pub fn num_pawls(&self) -> usize {
        self.pawls
    }

    /// Shared alphabet.
    pub fn alphabet(&self) -> &Rc<Alphabet> {
        &self.alphabet
    }

    /// Rotors available for insertion.
    pub fn catalog(&self) -> &[Rotor] {
        &self.catalog
    }

    /// Inserted rotors, slot 0 first. Empty until [`insert_rotors`](Self::insert_rotors).
    pub fn rotors(&self) -> &[Rotor] {
        &self.slots
    }

    /// The rotor in `slot`, if rotors are inserted and `slot` is in range.
    pub fn rotor(&self, slot: usize) -> Option<&Rotor> {
        self.slots.get(slot)
    }

    /// Current plugboard.
    pub fn plugboard(&self) -> &Permutation {
        &self.plugboard
    }

    /// First slot holding a moving rotor.
    fn first_moving_slot(&self) -> usize {
        self.num_rotors - self.pawls
    }

    /// Loads the named catalog rotors into the slots, leftmost first.
    ///
    /// Each inserted rotor is a fresh copy of its catalog entry, so settings
    /// and rings start at zero.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if the number of names is not
    /// [`num_rotors`](Self::num_rotors), a name is unknown or repeated, slot 0
    /// does not hold a reflector, a reflector appears elsewhere, a pawl slot
    /// holds a non-moving rotor, or a slot left of the pawls holds a moving
    /// rotor. The machine is unchanged on error.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::MachineConfig;
    ///
    /// let config: MachineConfig = "ABCD\n 3 1\n I MA (ABCD)\n F N (AB)\n R R (AC) (BD)"
    ///     .parse()
    ///     .unwrap();
    /// let mut machine = config.build().unwrap();
    /// machine.insert_rotors(&["R", "F", "I"]).unwrap();
    /// assert!(machine.insert_rotors(&["R", "I", "F"]).is_err());
    /// ```
    pub fn insert_rotors<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        if names.len() != self.num_rotors {
            return Err(EnigmaError::configuration(format!(
                "expected {} rotor names, got {}",
                self.num_rotors,
                names.len()
            )));
        }
        let mut chosen = Vec::with_capacity(self.num_rotors);
        for (slot, name) in names.iter().map(|n| n.as_ref()).enumerate() {
            if names[..slot].iter().any(|n| n.as_ref() == name) {
                return Err(EnigmaError::configuration(format!(
                    "rotor {} inserted twice",
                    name
                )));
            }
            let rotor = self
                .catalog
                .iter()
                .find(|r| r.name() == name)
                .ok_or_else(|| EnigmaError::configuration(format!("unknown rotor {}", name)))?;
            self.check_slot(slot, rotor)?;
            chosen.push(rotor.clone());
        }
        self.slots = chosen;
        Ok(())
    }

    fn check_slot(&self, slot: usize, rotor: &Rotor) -> Result<()> {
        let problem = if slot == 0 {
            (!rotor.reflecting()).then_some("slot 0 requires a reflector")
        } else if rotor.reflecting() {
            Some("a reflector is only allowed in slot 0")
        } else if slot >= self.first_moving_slot() {
            (!rotor.rotates()).then_some("a pawl slot requires a moving rotor")
        } else {
            rotor
                .rotates()
                .then_some("a moving rotor is only allowed in a pawl slot")
        };
        match problem {
            Some(reason) => Err(EnigmaError::configuration(format!(
                "cannot place rotor {} in slot {}: {}",
                rotor.name(),
                slot,
                reason
            ))),
            None => Ok(()),
        }
    }

    fn require_rotors(&self) -> Result<()> {
        if self.slots.is_empty() {
            return Err(EnigmaError::invalid_state("no rotors inserted"));
        }
        Ok(())
    }

    /// Resolves a per-rotor string (one symbol per slot 1..n) to indices.
    fn positions(&self, symbols: &str, what: &str) -> Result<Vec<usize>> {
        self.require_rotors()?;
        let expected = self.num_rotors - 1;
        let count = symbols.chars().count();
        if count != expected {
            return Err(EnigmaError::configuration(format!(
                "{} {:?} must have {} symbols, got {}",
                what, symbols, expected, count
            )));
        }
        symbols
            .chars()
            .map(|ch| self.alphabet.to_index(ch))
            .collect()
    }

    /// Sets the rotors in slots 1..n from the symbols of `setting`.
    ///
    /// # Errors
    /// - [`EnigmaError::InvalidState`] if no rotors are inserted.
    /// - [`EnigmaError::Configuration`] if `setting` does not have
    ///   `num_rotors - 1` symbols or holds a symbol outside the alphabet.
    pub fn set_rotors(&mut self, setting: &str) -> Result<()> {
        let positions = self.positions(setting, "setting")?;
        for (rotor, posn) in self.slots[1..].iter_mut().zip(positions) {
            rotor.set(posn)?;
        }
        Ok(())
    }

    /// Sets the ring offsets of the rotors in slots 1..n from `rings`.
    ///
    /// # Errors
    /// Same conditions as [`set_rotors`](Self::set_rotors).
    pub fn set_rings(&mut self, rings: &str) -> Result<()> {
        let positions = self.positions(rings, "ring setting")?;
        for (rotor, posn) in self.slots[1..].iter_mut().zip(positions) {
            rotor.set_ring(posn)?;
        }
        Ok(())
    }

    /// Current settings of slots 1..n as symbols, one per slot.
    ///
    /// Empty until rotors are inserted.
    pub fn settings(&self) -> String {
        self.slots
            .iter()
            .skip(1)
            .map(|r| self.alphabet.wrapped_char(r.setting()))
            .collect()
    }

    /// Installs `plugboard`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if the plugboard is over a
    /// different alphabet size or is not its own inverse (only swaps of
    /// pairs are allowed).
    pub fn set_plugboard(&mut self, plugboard: Permutation) -> Result<()> {
        if plugboard.size() != self.alphabet.size() {
            return Err(EnigmaError::configuration(format!(
                "plugboard has {} symbols, alphabet has {}",
                plugboard.size(),
                self.alphabet.size()
            )));
        }
        if !plugboard.is_involution() {
            return Err(EnigmaError::configuration(
                "plugboard may only swap pairs of symbols",
            ));
        }
        self.plugboard = plugboard;
        Ok(())
    }

    /// Steps the pawl-driven rotors once.
    ///
    /// The rightmost rotor always moves. Another moving rotor moves when its
    /// right neighbor is at a notch, or when it is at its own notch and its
    /// left neighbor has a pawl (the double step). Slots are visited left to
    /// right so every decision reads settings from before this step.
    ///
    /// Being at its own notch is not enough for the leftmost moving rotor:
    /// it has no pawled neighbor to its left, so like the leftmost wheel of
    /// the classic machine it only moves when its right neighbor is at a
    /// notch. This holds whether slot `n-p-1` is a fixed rotor or the
    /// reflector.
    fn advance_rotors(&mut self) -> Result<()> {
        let last = self.num_rotors - 1;
        let first = self.first_moving_slot();
        for slot in first..=last {
            let moves = slot == last
                || self.slots[slot + 1].at_notch()
                || (slot > first && self.slots[slot].at_notch());
            if moves {
                self.slots[slot].advance()?;
            }
        }
        Ok(())
    }

    /// Steps the rotors, then converts `index`.
    ///
    /// # Errors
    /// - [`EnigmaError::InvalidState`] if no rotors are inserted.
    /// - [`EnigmaError::IndexOutOfRange`] if `index` is outside the alphabet;
    ///   the rotors do not step in that case.
    pub fn convert(&mut self, index: usize) -> Result<usize> {
        self.require_rotors()?;
        if index >= self.alphabet.size() {
            return Err(EnigmaError::index_out_of_range(index, self.alphabet.size()));
        }
        self.advance_rotors()?;

        let mut c = self.plugboard.permute(index)?;
        // Right to left, ending in the reflector.
        for rotor in self.slots.iter().rev() {
            c = rotor.convert_forward(c)?;
        }
        for rotor in &self.slots[1..] {
            c = rotor.convert_backward(c)?;
        }
        self.plugboard.permute(c)
    }

    /// Steps the rotors, then converts the symbol `ch`.
    ///
    /// # Errors
    /// As [`convert`](Self::convert), plus [`EnigmaError::Configuration`] if
    /// `ch` is not in the alphabet.
    pub fn convert_char(&mut self, ch: char) -> Result<char> {
        let index = self.alphabet.to_index(ch)?;
        let out = self.convert(index)?;
        self.alphabet.to_char(out)
    }

    /// Converts every symbol of `msg` in order.
    ///
    /// All symbols are checked against the alphabet before any rotor steps.
    ///
    /// # Errors
    /// As [`convert_char`](Self::convert_char).
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::MachineConfig;
    ///
    /// let config: MachineConfig = "ABCD\n 3 1\n I MA (ABCD)\n F N (AB)\n R R (AC) (BD)"
    ///     .parse()
    ///     .unwrap();
    /// let mut machine = config.build().unwrap();
    /// machine.insert_rotors(&["R", "F", "I"]).unwrap();
    /// machine.set_rotors("AA").unwrap();
    /// let cipher = machine.convert_str("ABCD").unwrap();
    ///
    /// machine.set_rotors("AA").unwrap();
    /// assert_eq!(machine.convert_str(&cipher).unwrap(), "ABCD");
    /// ```
    pub fn convert_str(&mut self, msg: &str) -> Result<String> {
        let indices = msg
            .chars()
            .map(|ch| self.alphabet.to_index(ch))
            .collect::<Result<Vec<_>>>()?;
        let mut out = String::with_capacity(msg.len());
        for index in indices {
            let c = self.convert(index)?;
            out.push(self.alphabet.to_char(c)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn az() -> Rc<Alphabet> {
        Rc::new(Alphabet::upper_case())
    }

    fn catalog(alphabet: &Rc<Alphabet>) -> Vec<Rotor> {
        let perm = |cycles: &str| Permutation::new(cycles, Rc::clone(alphabet)).unwrap();
        vec![
            Rotor::moving(
                "I",
                perm("(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)"),
                "Q",
            )
            .unwrap(),
            Rotor::moving(
                "II",
                perm("(FIXVYOMW) (CDKLHUP) (ESZ) (BJ) (GR) (NT) (A) (Q)"),
                "E",
            )
            .unwrap(),
            Rotor::moving("III", perm("(ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)"), "V").unwrap(),
            Rotor::moving("IV", perm("(AEPLIYWCOXMRFZBSTGJQNH) (DV) (KU)"), "J").unwrap(),
            Rotor::fixed("Beta", perm("(ALBEVFCYODJWUGNMQTZSKPR) (HIX)")),
            Rotor::fixed("Gamma", perm("(AFNIRLBSQWVXGUZDKMTPCOYJHE)")),
            Rotor::reflector(
                "B",
                perm("(AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP) (RX) (SZ) (TV)"),
            )
            .unwrap(),
        ]
    }

    fn machine() -> Machine {
        let alphabet = az();
        let rotors = catalog(&alphabet);
        Machine::new(alphabet, 5, 3, rotors).unwrap()
    }

    fn loaded(names: [&str; 5], setting: &str) -> Machine {
        let mut m = machine();
        m.insert_rotors(&names).unwrap();
        m.set_rotors(setting).unwrap();
        m
    }

    #[test]
    fn test_construction_limits() {
        let alphabet = az();
        assert!(Machine::new(Rc::clone(&alphabet), 1, 0, vec![]).is_err());
        assert!(Machine::new(Rc::clone(&alphabet), 3, 3, vec![]).is_err());
        assert!(Machine::new(Rc::clone(&alphabet), 2, 0, vec![]).is_ok());
    }

    #[test]
    fn test_duplicate_catalog_names() {
        let alphabet = az();
        let mut rotors = catalog(&alphabet);
        rotors.push(rotors[0].clone());
        let err = Machine::new(alphabet, 5, 3, rotors).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_catalog_alphabet_size_mismatch() {
        let small = Rc::new(Alphabet::new("ABCD").unwrap());
        let rotors = vec![Rotor::fixed("X", Permutation::identity(Rc::clone(&small)))];
        assert!(Machine::new(az(), 3, 1, rotors).is_err());
    }

    #[test]
    fn test_insert_rotors_fresh_copies() {
        let mut m = machine();
        m.insert_rotors(&["B", "Beta", "III", "IV", "I"]).unwrap();
        assert_eq!(m.rotor(0).unwrap().name(), "B");
        assert_eq!(m.rotor(4).unwrap().name(), "I");
        assert_eq!(m.settings(), "AAAA");
        assert!(m.rotor(5).is_none());
        // Catalog entries are untouched by conversions.
        m.set_rotors("AXLE").unwrap();
        m.convert(0).unwrap();
        assert!(m.catalog().iter().all(|r| r.setting() == 0));
    }

    #[test]
    fn test_insert_rotors_errors() {
        let mut m = machine();
        let cases: [&[&str]; 7] = [
            &["B", "Beta", "III", "IV"],
            &["B", "Beta", "III", "IV", "VIII"],
            &["B", "Beta", "III", "IV", "IV"],
            &["Beta", "B", "III", "IV", "I"],
            &["B", "Beta", "Gamma", "IV", "I"],
            &["B", "II", "III", "IV", "I"],
            &["B", "Beta", "III", "IV", "B"],
        ];
        for names in cases {
            let err = m.insert_rotors(names).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration, "names {:?}", names);
        }
        assert!(m.rotors().is_empty());
    }

    #[test]
    fn test_set_rotors_errors() {
        let mut m = machine();
        assert_eq!(
            m.set_rotors("AXLE").unwrap_err().kind(),
            ErrorKind::InvalidState
        );
        m.insert_rotors(&["B", "Beta", "III", "IV", "I"]).unwrap();
        assert!(m.set_rotors("AXL").is_err());
        assert!(m.set_rotors("AXLEE").is_err());
        assert!(m.set_rotors("AXl1").is_err());
        m.set_rotors("AXLE").unwrap();
        assert_eq!(m.settings(), "AXLE");
    }

    #[test]
    fn test_convert_requires_rotors() {
        let mut m = machine();
        assert_eq!(m.convert(0).unwrap_err().kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_convert_out_of_range_does_not_step() {
        let mut m = loaded(["B", "Beta", "III", "IV", "I"], "AXLE");
        assert_eq!(
            m.convert(26).unwrap_err().kind(),
            ErrorKind::IndexOutOfRange
        );
        assert_eq!(m.settings(), "AXLE");
    }

    #[test]
    fn test_known_message() {
        let mut m = loaded(["B", "Beta", "III", "IV", "I"], "AXLE");
        let plugs = Permutation::new("(HQ) (EX) (IP) (TR) (BY)", az()).unwrap();
        m.set_plugboard(plugs).unwrap();
        assert_eq!(
            m.convert_str("FROMHISSHOULDERHIAWATHA").unwrap(),
            "QVPQSOKOILPUBKJZPISFXDW"
        );
    }

    #[test]
    fn test_plugboard_must_swap_pairs() {
        let mut m = machine();
        let cycle = Permutation::new("(ABC)", az()).unwrap();
        assert_eq!(
            m.set_plugboard(cycle).unwrap_err().kind(),
            ErrorKind::Configuration
        );
        let small = Permutation::identity(Rc::new(Alphabet::new("AB").unwrap()));
        assert!(m.set_plugboard(small).is_err());
        assert!(m.plugboard().is_involution());
    }

    #[test]
    fn test_rightmost_always_steps() {
        let mut m = loaded(["B", "Beta", "I", "II", "III"], "AAAA");
        m.convert(0).unwrap();
        assert_eq!(m.settings(), "AAAB");
        m.convert(0).unwrap();
        assert_eq!(m.settings(), "AAAC");
    }

    #[test]
    fn test_odometer_carry() {
        // III has its notch at V.
        let mut m = loaded(["B", "Beta", "I", "II", "III"], "AAAV");
        m.convert(0).unwrap();
        assert_eq!(m.settings(), "AABW");
    }

    #[test]
    fn test_double_step() {
        let mut m = loaded(["B", "Beta", "I", "II", "III"], "AADU");
        m.convert(0).unwrap();
        assert_eq!(m.settings(), "AADV");
        m.convert(0).unwrap();
        assert_eq!(m.settings(), "AAEW");
        m.convert(0).unwrap();
        assert_eq!(m.settings(), "ABFX");
        m.convert(0).unwrap();
        assert_eq!(m.settings(), "ABFY");
    }

    #[test]
    fn test_leftmost_moving_rotor_does_not_self_step() {
        // I sits on its notch Q, but the fixed rotor to its left has no pawl.
        let mut m = loaded(["B", "Beta", "I", "II", "III"], "AQAA");
        m.convert(0).unwrap();
        assert_eq!(m.settings(), "AQAB");
    }

    #[test]
    fn test_leftmost_moving_rotor_beside_reflector() {
        // Every rotor but the reflector has a pawl; I sits on its notch Q.
        let alphabet = az();
        let rotors = catalog(&alphabet);
        let mut m = Machine::new(alphabet, 4, 3, rotors).unwrap();
        m.insert_rotors(&["B", "I", "II", "III"]).unwrap();
        m.set_rotors("QAA").unwrap();
        m.convert(0).unwrap();
        assert_eq!(m.settings(), "QAB");

        // II at its notch E still double steps and carries into I.
        m.set_rotors("QEA").unwrap();
        m.convert(0).unwrap();
        assert_eq!(m.settings(), "RFB");
    }

    #[test]
    fn test_settings_track_every_position() {
        let mut m = loaded(["B", "Beta", "I", "II", "III"], "AAAA");
        let mut seen = String::new();
        for _ in 0..26 {
            m.convert(0).unwrap();
            seen.extend(m.settings().chars().last());
        }
        assert_eq!(seen, "BCDEFGHIJKLMNOPQRSTUVWXYZA");
        assert_eq!(m.settings().chars().count(), 4);
        assert_eq!(machine().settings(), "");
    }

    #[test]
    fn test_fixed_rotor_never_steps() {
        let mut m = loaded(["B", "Beta", "I", "II", "III"], "AQEV");
        for _ in 0..100 {
            m.convert(0).unwrap();
            assert_eq!(m.rotor(1).unwrap().setting(), 0);
        }
    }

    #[test]
    fn test_zero_pawls_never_steps() {
        let alphabet = az();
        let rotors = catalog(&alphabet);
        let mut m = Machine::new(alphabet, 3, 0, rotors).unwrap();
        m.insert_rotors(&["B", "Beta", "Gamma"]).unwrap();
        let first = m.convert(0).unwrap();
        assert_eq!(m.settings(), "AA");
        assert_eq!(m.convert(0).unwrap(), first);
    }

    #[test]
    fn test_ring_settings() {
        let mut m = loaded(["B", "Beta", "I", "II", "III"], "AAAA");
        m.set_rings("ABBB").unwrap();
        assert_eq!(m.convert_str("AAAAA").unwrap(), "EWTYX");
    }

    #[test]
    fn test_convert_str_checks_symbols_first() {
        let mut m = loaded(["B", "Beta", "I", "II", "III"], "AAAA");
        assert_eq!(
            m.convert_str("AB CD").unwrap_err().kind(),
            ErrorKind::Configuration
        );
        assert_eq!(m.settings(), "AAAA");
    }

    #[test]
    fn test_encrypt_then_decrypt() {
        let mut enc = loaded(["B", "Gamma", "IV", "II", "I"], "KQDR");
        let mut dec = loaded(["B", "Gamma", "IV", "II", "I"], "KQDR");
        let plain = "THEQUICKBROWNFOXJUMPSOVERTHELAZYDOG";
        let cipher = enc.convert_str(plain).unwrap();
        assert_ne!(cipher, plain);
        assert_eq!(dec.convert_str(&cipher).unwrap(), plain);
    }

    #[test]
    fn test_no_symbol_maps_to_itself() {
        let mut m = loaded(["B", "Beta", "III", "IV", "I"], "AXLE");
        for _ in 0..200 {
            for i in 0..26 {
                let mut trial = m.clone();
                assert_ne!(trial.convert(i).unwrap(), i);
            }
            m.convert(0).unwrap();
        }
    }
}
