//! Permutation: a bijection over alphabet indices.
//!
//! Built from cycle notation such as `(AELTPHQXRU) (BKNW) (S)`. Symbols
//! not mentioned in any cycle map to themselves. Both the forward and the
//! inverse table are materialized at construction so that `permute` and
//! `invert` are single lookups.

use std::rc::Rc;

use crate::alphabet::Alphabet;
use crate::error::{EnigmaError, Result};

/// Bijection over `[0, alphabet.size())`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    alphabet: Rc<Alphabet>,
    forward: Vec<usize>,
    backward: Vec<usize>,
}

impl Permutation {
    /// Parses `cycles` into a permutation over `alphabet`.
    ///
    /// Cycles are parenthesized runs of symbols, separated by optional
    /// whitespace. `(ABC)` maps `A→B`, `B→C` and `C→A`.
    ///
    /// # Parameters
    /// - `cycles`: Cycle notation; the empty string yields the identity.
    /// - `alphabet`: Shared alphabet the symbols are resolved against.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] on unbalanced or nested
    /// parentheses, empty cycles, symbols outside a cycle, symbols not in
    /// the alphabet, or a symbol appearing more than once.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::rc::Rc;
    /// use enigma::{Alphabet, Permutation};
    ///
    /// let az = Rc::new(Alphabet::upper_case());
    /// let p = Permutation::new("(BACD)", az).unwrap();
    /// assert_eq!(p.permute_char('B').unwrap(), 'A');
    /// assert_eq!(p.invert_char('B').unwrap(), 'D');
    /// assert_eq!(p.permute_char('Z').unwrap(), 'Z');
    /// ```
    pub fn new(cycles: &str, alphabet: Rc<Alphabet>) -> Result<Self> {
        let size = alphabet.size();
        let mut forward: Vec<usize> = (0..size).collect();
        for cycle in parse_cycles(cycles, &alphabet)? {
            for (k, &from) in cycle.iter().enumerate() {
                forward[from] = cycle[(k + 1) % cycle.len()];
            }
        }
        let mut backward = vec![0; size];
        for (from, &to) in forward.iter().enumerate() {
            backward[to] = from;
        }
        Ok(Permutation {
            alphabet,
            forward,
            backward,
        })
    }

    /// The identity permutation over `alphabet`.
    pub fn identity(alphabet: Rc<Alphabet>) -> Self {
        let forward: Vec<usize> = (0..alphabet.size()).collect();
        let backward = forward.clone();
        Permutation {
            alphabet,
            forward,
            backward,
        }
    }

    /// Size of the alphabet, the modulus of all index arithmetic.
    pub fn size(&self) -> usize {
        self.forward.len()
    }

    /// The shared alphabet this permutation is defined over.
    pub fn alphabet(&self) -> &Rc<Alphabet> {
        &self.alphabet
    }

    /// Applies the permutation to `index`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::IndexOutOfRange`] if `index >= size()`.
    pub fn permute(&self, index: usize) -> Result<usize> {
        self.forward
            .get(index)
            .copied()
            .ok_or_else(|| EnigmaError::index_out_of_range(index, self.size()))
    }

    /// Applies the inverse permutation to `index`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::IndexOutOfRange`] if `index >= size()`.
    pub fn invert(&self, index: usize) -> Result<usize> {
        self.backward
            .get(index)
            .copied()
            .ok_or_else(|| EnigmaError::index_out_of_range(index, self.size()))
    }

    /// Applies the permutation to a symbol.
    pub fn permute_char(&self, ch: char) -> Result<char> {
        let i = self.alphabet.to_index(ch)?;
        self.alphabet.to_char(self.forward[i])
    }

    /// Applies the inverse permutation to a symbol.
    pub fn invert_char(&self, ch: char) -> Result<char> {
        let i = self.alphabet.to_index(ch)?;
        self.alphabet.to_char(self.backward[i])
    }

    /// Returns true iff no index maps to itself.
    pub fn derangement(&self) -> bool {
        self.forward.iter().enumerate().all(|(i, &to)| i != to)
    }

    /// Returns true iff the permutation is its own inverse (every cycle has
    /// length one or two).
    pub fn is_involution(&self) -> bool {
        self.forward == self.backward
    }
}

/// Splits cycle notation into index cycles, validating every symbol.
fn parse_cycles(text: &str, alphabet: &Alphabet) -> Result<Vec<Vec<usize>>> {
    let mut cycles = Vec::new();
    let mut current: Option<Vec<usize>> = None;
    let mut seen = vec![false; alphabet.size()];

    for ch in text.chars() {
        if ch == '(' {
            if current.is_some() {
                return Err(malformed(text, "nested '('"));
            }
            current = Some(Vec::new());
        } else if ch == ')' {
            match current.take() {
                Some(cycle) if !cycle.is_empty() => cycles.push(cycle),
                Some(_) => return Err(malformed(text, "empty cycle")),
                None => return Err(malformed(text, "unmatched ')'")),
            }
        } else if ch.is_whitespace() {
            if current.is_some() {
                return Err(malformed(text, "whitespace inside a cycle"));
            }
        } else {
            let Some(cycle) = current.as_mut() else {
                return Err(malformed(text, "symbol outside a cycle"));
            };
            let i = alphabet.to_index(ch)?;
            if seen[i] {
                return Err(EnigmaError::configuration(format!(
                    "symbol {:?} appears more than once in {:?}",
                    ch, text
                )));
            }
            seen[i] = true;
            cycle.push(i);
        }
    }

    if current.is_some() {
        return Err(malformed(text, "unclosed '('"));
    }
    Ok(cycles)
}

fn malformed(text: &str, reason: &str) -> EnigmaError {
    EnigmaError::configuration(format!("malformed cycles {:?}: {}", text, reason))
}
