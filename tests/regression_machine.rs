//! End-to-end regression tests on the default configuration.
//!
//! Expected ciphertexts are frozen vectors: any change in output means
//! the stepping or the signal path changed.

use std::rc::Rc;

use enigma::{
    format_message, process, Alphabet, ErrorKind, Machine, MachineConfig, MessageSettings,
    Permutation, Rotor,
};

const DEFAULT_CONF: &str = include_str!("../demos/default.conf");
const TRIVIAL_IN: &str = include_str!("../demos/trivial.in");
const TRIVIAL_OUT: &str = include_str!("../demos/trivial.out");

fn config() -> MachineConfig {
    DEFAULT_CONF.parse().unwrap()
}

fn machine(line: &str) -> Machine {
    let config = config();
    let mut m = config.build().unwrap();
    MessageSettings::parse(line, m.num_rotors())
        .unwrap()
        .apply(&mut m)
        .unwrap();
    m
}

// ═══════════════════════════════════════════════════════════════════════
// Rotor I literal vectors
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn rotor_i_at_setting_5() {
    let az = Rc::new(Alphabet::new("ABCDEFGHIJKLMNOPQRSTUVWXYZ").unwrap());
    let wiring = Permutation::new("(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)", az).unwrap();
    let mut r = Rotor::moving("I", wiring, "Q").unwrap();
    r.set(5).unwrap();
    assert_eq!(r.convert_forward(5).unwrap(), 8);
    assert_eq!(r.convert_backward(9).unwrap(), 7);
    assert!(!r.at_notch());
}

// ═══════════════════════════════════════════════════════════════════════
// Default configuration
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn default_config_catalog() {
    let config = config();
    assert_eq!(config.num_rotors(), 5);
    assert_eq!(config.num_pawls(), 3);
    assert_eq!(config.rotors().len(), 12);
    let movers = config.rotors().iter().filter(|r| r.rotates()).count();
    let reflectors = config.rotors().iter().filter(|r| r.reflecting()).count();
    assert_eq!(movers, 8);
    assert_eq!(reflectors, 2);
}

#[test]
fn hiawatha_vector() {
    let mut m = machine("* B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)");
    let cipher = m.convert_str("FROMHISSHOULDERHIAWATHA").unwrap();
    assert_eq!(format_message(&cipher), "QVPQS OKOIL PUBKJ ZPISF XDW");
    let cipher = m.convert_str("TOOKTHECAMERAOFROSEWOOD").unwrap();
    assert_eq!(format_message(&cipher), "BHCNS CXNUO AATZX SRCFY DGU");
}

#[test]
fn trivial_stream_matches_frozen_output() {
    let mut out = Vec::new();
    process(&config(), TRIVIAL_IN.as_bytes(), &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), TRIVIAL_OUT);
}

#[test]
fn trivial_stream_decrypts() {
    let input = format!(
        "* B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)\n{}",
        TRIVIAL_OUT
    );
    let mut out = Vec::new();
    process(&config(), input.as_bytes(), &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "FROMH ISSHO ULDER HIAWA THA\nTOOKT HECAM ERAOF ROSEW OOD\n"
    );
}

#[test]
fn classic_three_rotor_vectors() {
    let mut m = machine("* B Beta I II III AAAA");
    assert_eq!(m.convert_str("AAAAA").unwrap(), "BDZGO");

    let mut m = machine("* B Beta I II III AAAA ABBB");
    assert_eq!(m.convert_str("AAAAA").unwrap(), "EWTYX");
}

#[test]
fn encrypt_then_decrypt_after_reset() {
    let line = "* C Gamma V II IV QEZV (AZ) (ST)";
    let mut m = machine(line);
    let cipher = m.convert_str("ATTACKATDAWN").unwrap();
    assert_eq!(cipher, "YDIJNDQWBXVE");

    let settings = MessageSettings::parse(line, 5).unwrap();
    settings.apply(&mut m).unwrap();
    assert_eq!(m.convert_str(&cipher).unwrap(), "ATTACKATDAWN");
}

// ═══════════════════════════════════════════════════════════════════════
// Stepping
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn double_step_moves_middle_and_left() {
    // II (middle) sits on its notch E before the step.
    let mut m = machine("* B Beta I II III AAEW");
    m.convert_char('A').unwrap();
    assert_eq!(m.settings(), "ABFX");
}

#[test]
fn double_step_sequence() {
    let mut m = machine("* B Beta I II III AADU");
    let mut seen = Vec::new();
    for _ in 0..4 {
        m.convert_char('A').unwrap();
        seen.push(m.settings());
    }
    assert_eq!(seen, ["AADV", "AAEW", "ABFX", "ABFY"]);
}

#[test]
fn zone_boundary_never_steps_fixed_rotor() {
    // Every moving rotor starts on its notch; the fixed rotor to the left
    // of the pawls stays put.
    let mut m = machine("* B Beta I II III AQEV");
    m.convert_char('A').unwrap();
    assert_eq!(m.settings(), "ARFW");
    for _ in 0..26 * 26 * 26 {
        m.convert_char('A').unwrap();
        assert_eq!(m.rotor(1).unwrap().setting(), 0);
    }
}

#[test]
fn two_notch_rotor_carries_twice() {
    let mut m = machine("* B Beta I II VI AAAL");
    let mut carries = 0;
    for _ in 0..26 {
        let before = m.rotor(3).unwrap().setting();
        m.convert_char('A').unwrap();
        if m.rotor(3).unwrap().setting() != before {
            carries += 1;
        }
    }
    assert_eq!(carries, 2);
}

// ═══════════════════════════════════════════════════════════════════════
// Error surface
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn malformed_plugboard_rejected() {
    let mut m = config().build().unwrap();
    for line in [
        "* B Beta III IV I AXLE (HQ",
        "* B Beta III IV I AXLE (HQ) (QE)",
        "* B Beta III IV I AXLE (HQE)",
    ] {
        let err = MessageSettings::parse(line, 5)
            .and_then(|s| s.apply(&mut m))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration, "line {:?}", line);
    }
}

#[test]
fn slot_violations_rejected() {
    let mut m = config().build().unwrap();
    for names in [
        ["Beta", "B", "III", "IV", "I"],
        ["B", "C", "III", "IV", "I"],
        ["B", "Beta", "Gamma", "IV", "I"],
        ["B", "I", "III", "IV", "II"],
        ["B", "Beta", "I", "I", "II"],
    ] {
        let err = m.insert_rotors(&names).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration, "names {:?}", names);
    }
}
