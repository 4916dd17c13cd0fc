//! Rotor cipher machine simulator.
//!
//! Simulates an electromechanical rotor machine of the Enigma family. A
//! [`Machine`] holds a reflector, fixed and moving rotors and a plugboard;
//! every symbol steps the rotors odometer-style (with the double step) and
//! then travels through a chain of substitution permutations.
//!
//! # Architecture
//!
//! ```text
//! Alphabet     (symbols ↔ indices, shared behind Rc)
//!     ↓
//! Permutation  (bijection from cycle notation)
//!     ↓
//! Rotor        (Moving | Fixed | Reflector, setting + ring offset)
//!     ↓
//! Machine      (slots, pawls, plugboard, stepping, signal path)
//!     ↓
//! config / message  (configuration text, settings lines, stream driver)
//! ```
//!
//! # Examples
//!
//! Enciphering is its own inverse under identical settings:
//!
//! ```
//! use enigma::{MachineConfig, MessageSettings};
//!
//! let config: MachineConfig = "ABCDEFGHIJKLMNOPQRSTUVWXYZ
//!  5 3
//!  I MQ      (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
//!  III MV    (ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)
//!  IV MJ     (AEPLIYWCOXMRFZBSTGJQNH) (DV) (KU)
//!  Beta N    (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
//!  B R       (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP)
//!            (RX) (SZ) (TV)"
//!     .parse()
//!     .unwrap();
//! let settings = MessageSettings::parse("* B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)", 5).unwrap();
//!
//! let mut machine = config.build().unwrap();
//! settings.apply(&mut machine).unwrap();
//! let cipher = machine.convert_str("FROMHISSHOULDERHIAWATHA").unwrap();
//! assert_eq!(cipher, "QVPQSOKOILPUBKJZPISFXDW");
//!
//! settings.apply(&mut machine).unwrap();
//! assert_eq!(machine.convert_str(&cipher).unwrap(), "FROMHISSHOULDERHIAWATHA");
//! ```

#![deny(clippy::all)]

pub mod alphabet;
pub mod config;
pub mod error;
pub mod machine;
pub mod message;
pub mod permutation;
pub mod rotor;

pub use alphabet::Alphabet;
pub use config::{MachineConfig, MessageSettings};
pub use error::{EnigmaError, ErrorKind, Result};
pub use machine::Machine;
pub use message::{format_message, process};
pub use permutation::Permutation;
pub use rotor::{Rotor, RotorKind};
