//! Alphabet: ordered symbol set and its index mapping.
//!
//! Every permutation, rotor and machine built from one configuration
//! shares a single [`Alphabet`] behind an [`Rc`](std::rc::Rc). The alphabet
//! defines the modulus for all index arithmetic.

use std::collections::HashMap;

use crate::error::{EnigmaError, Result};

/// Symbols that carry meaning in cycle notation and settings lines.
const RESERVED: [char; 3] = ['(', ')', '*'];

/// Upper-case Latin letters, the alphabet of the classic machines.
const UPPER_CASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Ordered sequence of distinct symbols.
///
/// `to_index` and `to_char` are mutual inverses over `[0, size)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
    index: HashMap<char, usize>,
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::upper_case()
    }
}

impl Alphabet {
    /// Creates an alphabet from the symbols of `chars`, in order.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if `chars` is empty, repeats a
    /// symbol, or contains whitespace, `(`, `)` or `*`.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::Alphabet;
    ///
    /// let abc = Alphabet::new("ABC").unwrap();
    /// assert_eq!(abc.size(), 3);
    /// assert!(Alphabet::new("ABA").is_err());
    /// ```
    pub fn new(chars: &str) -> Result<Self> {
        let mut symbols = Vec::with_capacity(chars.len());
        let mut index = HashMap::with_capacity(chars.len());
        for ch in chars.chars() {
            if ch.is_whitespace() || RESERVED.contains(&ch) {
                return Err(EnigmaError::configuration(format!(
                    "reserved symbol {:?} in alphabet",
                    ch
                )));
            }
            if index.insert(ch, symbols.len()).is_some() {
                return Err(EnigmaError::configuration(format!(
                    "duplicate symbol {:?} in alphabet",
                    ch
                )));
            }
            symbols.push(ch);
        }
        if symbols.is_empty() {
            return Err(EnigmaError::configuration("alphabet is empty"));
        }
        Ok(Alphabet { symbols, index })
    }

    /// The 26 upper-case letters `A..=Z`.
    pub fn upper_case() -> Self {
        let symbols: Vec<char> = UPPER_CASE.chars().collect();
        let index = symbols.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Alphabet { symbols, index }
    }

    /// Number of symbols.
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if `ch` is one of the symbols.
    pub fn contains(&self, ch: char) -> bool {
        self.index.contains_key(&ch)
    }

    /// Returns the index of `ch`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if `ch` is not in the alphabet.
    pub fn to_index(&self, ch: char) -> Result<usize> {
        self.index
            .get(&ch)
            .copied()
            .ok_or_else(|| EnigmaError::configuration(format!("symbol {:?} not in alphabet", ch)))
    }

    /// Returns the symbol at `index`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::IndexOutOfRange`] if `index >= size()`.
    pub fn to_char(&self, index: usize) -> Result<char> {
        self.symbols
            .get(index)
            .copied()
            .ok_or_else(|| EnigmaError::index_out_of_range(index, self.size()))
    }

    /// Iterates over the symbols in index order.
    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().copied()
    }

    /// Symbol at `index` reduced modulo the alphabet size.
    ///
    /// Never fails: an alphabet always holds at least one symbol.
    pub(crate) fn wrapped_char(&self, index: usize) -> char {
        self.symbols[index % self.symbols.len()]
    }
}
