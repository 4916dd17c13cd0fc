//! Rotor: a wired wheel applying a permutation offset by its rotation.
//!
//! The three wheel kinds of the machine share one struct and differ only
//! in their [`RotorKind`] tag:
//!
//! ```text
//! Moving { notches }  advances, reports notches, sits in a pawl slot
//! Fixed               never advances, never at notch
//! Reflector           fixed involution without fixed points, slot 0 only
//! ```
//!
//! A signal entering contact `i` of a rotor at displacement `d` meets wire
//! `(i + d) mod n` of the permutation and leaves through contact
//! `(p(i + d) - d) mod n`. The displacement is the rotational setting minus
//! the ring offset.

use std::rc::Rc;

use crate::alphabet::Alphabet;
use crate::error::{EnigmaError, Result};
use crate::permutation::Permutation;

/// Kind tag of a [`Rotor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotorKind {
    /// Steps under its pawl and carries notch positions (sorted indices).
    Moving {
        /// Settings at which the rotor is at its notch.
        notches: Vec<usize>,
    },
    /// Stationary rotor, may be set by hand but never advances.
    Fixed,
    /// Stationary reflecting rotor, always at position zero.
    Reflector,
}

/// A named wheel with wiring, kind, rotational setting and ring offset.
///
/// Rotors are plain values: the machine clones catalog entries into its
/// slots, so the catalog can be reused for any number of machines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotor {
    name: String,
    permutation: Permutation,
    kind: RotorKind,
    setting: usize,
    ring: usize,
}

impl Rotor {
    /// Creates a moving rotor that is at its notch at each symbol of `notches`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if a notch symbol is not in the
    /// permutation's alphabet.
    pub fn moving(
        name: impl Into<String>,
        permutation: Permutation,
        notches: &str,
    ) -> Result<Self> {
        let alphabet = permutation.alphabet();
        let mut positions = notches
            .chars()
            .map(|ch| alphabet.to_index(ch))
            .collect::<Result<Vec<_>>>()?;
        positions.sort_unstable();
        positions.dedup();
        Ok(Self::build(
            name.into(),
            permutation,
            RotorKind::Moving { notches: positions },
        ))
    }

    /// Creates a fixed (non-advancing) rotor.
    pub fn fixed(name: impl Into<String>, permutation: Permutation) -> Self {
        Self::build(name.into(), permutation, RotorKind::Fixed)
    }

    /// Creates a reflector.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if the permutation has a fixed
    /// point or is not its own inverse.
    pub fn reflector(name: impl Into<String>, permutation: Permutation) -> Result<Self> {
        let name = name.into();
        if !permutation.derangement() {
            return Err(EnigmaError::configuration(format!(
                "reflector {} has a fixed point",
                name
            )));
        }
        if !permutation.is_involution() {
            return Err(EnigmaError::configuration(format!(
                "reflector {} wiring is not symmetric",
                name
            )));
        }
        Ok(Self::build(name, permutation, RotorKind::Reflector))
    }

    fn build(name: String, permutation: Permutation, kind: RotorKind) -> Self {
        Rotor {
            name,
            permutation,
            kind,
            setting: 0,
            ring: 0,
        }
    }

    /// Rotor name, unique within a catalog.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind tag.
    pub fn kind(&self) -> &RotorKind {
        &self.kind
    }

    /// Wiring.
    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    /// Shared alphabet of the wiring.
    pub fn alphabet(&self) -> &Rc<Alphabet> {
        self.permutation.alphabet()
    }

    /// Size of the alphabet.
    pub fn size(&self) -> usize {
        self.permutation.size()
    }

    /// True for moving rotors.
    pub fn rotates(&self) -> bool {
        matches!(self.kind, RotorKind::Moving { .. })
    }

    /// True for reflectors.
    pub fn reflecting(&self) -> bool {
        matches!(self.kind, RotorKind::Reflector)
    }

    /// Current rotational setting in `[0, size)`.
    pub fn setting(&self) -> usize {
        self.setting
    }

    /// Current ring offset in `[0, size)`.
    pub fn ring(&self) -> usize {
        self.ring
    }

    /// Sets the rotational setting directly.
    ///
    /// # Errors
    /// - [`EnigmaError::IndexOutOfRange`] if `posn >= size()`.
    /// - [`EnigmaError::InvalidState`] if this is a reflector and `posn != 0`.
    pub fn set(&mut self, posn: usize) -> Result<()> {
        self.setting = self.checked_position(posn, "set")?;
        Ok(())
    }

    /// Sets the rotational setting to the index of `ch`.
    ///
    /// # Errors
    /// As [`set`](Self::set), plus [`EnigmaError::Configuration`] if `ch` is
    /// not in the alphabet.
    pub fn set_char(&mut self, ch: char) -> Result<()> {
        let posn = self.alphabet().to_index(ch)?;
        self.set(posn)
    }

    /// Sets the ring offset.
    ///
    /// # Errors
    /// Same conditions as [`set`](Self::set).
    pub fn set_ring(&mut self, posn: usize) -> Result<()> {
        self.ring = self.checked_position(posn, "ring")?;
        Ok(())
    }

    /// Sets the ring offset to the index of `ch`.
    pub fn set_ring_char(&mut self, ch: char) -> Result<()> {
        let posn = self.alphabet().to_index(ch)?;
        self.set_ring(posn)
    }

    fn checked_position(&self, posn: usize, what: &str) -> Result<usize> {
        if posn >= self.size() {
            return Err(EnigmaError::index_out_of_range(posn, self.size()));
        }
        if self.reflecting() && posn != 0 {
            return Err(EnigmaError::invalid_state(format!(
                "cannot {} reflector {} to a non-zero position",
                what, self.name
            )));
        }
        Ok(posn)
    }

    /// Effective offset between the contact ring and the wired disc.
    fn displacement(&self) -> usize {
        (self.setting + self.size() - self.ring) % self.size()
    }

    /// Converts contact `index` entering from the right.
    ///
    /// # Errors
    /// Returns [`EnigmaError::IndexOutOfRange`] if `index >= size()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::rc::Rc;
    /// use enigma::{Alphabet, Permutation, Rotor};
    ///
    /// let az = Rc::new(Alphabet::upper_case());
    /// let wiring = Permutation::new("(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)", az).unwrap();
    /// let mut rotor = Rotor::moving("I", wiring, "Q").unwrap();
    /// rotor.set(5).unwrap();
    /// assert_eq!(rotor.convert_forward(5).unwrap(), 8);
    /// ```
    pub fn convert_forward(&self, index: usize) -> Result<usize> {
        let size = self.size();
        self.check_index(index)?;
        let d = self.displacement();
        let out = self.permutation.permute((index + d) % size)?;
        Ok((out + size - d) % size)
    }

    /// Converts contact `index` entering from the left, using the inverse wiring.
    ///
    /// # Errors
    /// Returns [`EnigmaError::IndexOutOfRange`] if `index >= size()`.
    pub fn convert_backward(&self, index: usize) -> Result<usize> {
        let size = self.size();
        self.check_index(index)?;
        let d = self.displacement();
        let out = self.permutation.invert((index + d) % size)?;
        Ok((out + size - d) % size)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.size() {
            return Err(EnigmaError::index_out_of_range(index, self.size()));
        }
        Ok(())
    }

    /// True iff this is a moving rotor whose setting is one of its notches.
    pub fn at_notch(&self) -> bool {
        match &self.kind {
            RotorKind::Moving { notches } => notches.binary_search(&self.setting).is_ok(),
            RotorKind::Fixed | RotorKind::Reflector => false,
        }
    }

    /// Advances a moving rotor by one position.
    ///
    /// # Errors
    /// Returns [`EnigmaError::InvalidState`] for fixed rotors and reflectors.
    pub fn advance(&mut self) -> Result<()> {
        match self.kind {
            RotorKind::Moving { .. } => {
                self.setting = (self.setting + 1) % self.size();
                Ok(())
            }
            RotorKind::Fixed | RotorKind::Reflector => Err(EnigmaError::invalid_state(format!(
                "rotor {} does not advance",
                self.name
            ))),
        }
    }
}
