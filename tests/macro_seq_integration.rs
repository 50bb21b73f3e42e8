//! Integration tests for the macro pipeline.
//!
//! Text syntax in, config file round trip, and the report stream a parsed
//! script produces once the sequencer is past controller sync.

use pokken_driver::config::{DriverConfig, PayloadConfig};
use pokken_driver::macro_seq::ParseMacroSeqError;
use pokken_driver::sequencer::{Phase, Sequencer};
use pokken_driver::MacroScript;
use pokken_report::{Button, Hat};

// ── Syntax ──

#[test]
fn canonical_form_is_stable() {
    let input = "Pause(1),B(5),Pause(1),Down(5),Pause(1),Down(5),Pause(1),A(5),Pause(1),A(5)";
    let script: MacroScript = input.parse().unwrap();
    assert_eq!(script.len(), 10);
    assert_eq!(script.total_ticks(), 30);
    assert_eq!(script.to_string(), input);
}

#[test]
fn loose_input_normalizes() {
    let script: MacroScript = " b(2), nothing , downright(3),l+r(4) ".parse().unwrap();
    assert_eq!(script.to_string(), "B(2),Pause(5),DownRight(3),L+R(4)");
}

#[test]
fn errors_name_the_bad_token() {
    assert_eq!(
        "".parse::<MacroScript>().unwrap_err(),
        ParseMacroSeqError::EmptySequence
    );
    assert_eq!(
        "A(3),Jump(1)".parse::<MacroScript>().unwrap_err(),
        ParseMacroSeqError::UnknownName("Jump".into())
    );
    assert!(matches!(
        "A(x)".parse::<MacroScript>().unwrap_err(),
        ParseMacroSeqError::InvalidDuration(_)
    ));
    assert!(matches!(
        "A(3".parse::<MacroScript>().unwrap_err(),
        ParseMacroSeqError::InvalidDuration(_)
    ));
}

// ── Config → sequencer → reports ──

#[test]
fn config_script_drives_reports() {
    let config: DriverConfig = toml::from_str(
        r#"
        echo_count = 1

        [payload]
        type = "macro"
        script = "Right(2),L+R(2)"
        loop_forever = false
        "#,
    )
    .unwrap();
    assert!(matches!(config.payload, PayloadConfig::Macro(_)));

    let mut seq = Sequencer::new(config.build_sequencer().unwrap());
    while seq.phase() != Phase::Macro {
        seq.next_report();
    }
    // Breathe's neutral report is still owed one echo
    assert!(seq.next_report().is_neutral());

    let reports: Vec<_> = (0..10).map(|_| seq.next_report()).collect();
    for pair in reports.chunks(2) {
        assert_eq!(pair[0], pair[1]);
    }
    assert_eq!(reports[0].hat(), Hat::Right);
    assert_eq!(reports[2].hat(), Hat::Right);
    assert!(reports[4].is_pressed(Button::L) && reports[4].is_pressed(Button::R));
    assert_eq!(reports[4].hat(), Hat::Center);
    assert!(reports[6].is_pressed(Button::L) && reports[6].is_pressed(Button::R));
    // The tick after the last command is the wrap tick, sent neutral
    assert!(reports[8].is_neutral());
    assert!(seq.is_done());
    assert!(seq.next_report().is_neutral());
}

#[test]
fn combo_presses_all_buttons() {
    let config: DriverConfig = toml::from_str(
        r#"
        echo_count = 0

        [payload]
        type = "macro"
        script = "ZL+ZR+Plus(2),Pause(1)"
        "#,
    )
    .unwrap();
    let mut seq = Sequencer::new(config.build_sequencer().unwrap());
    while seq.phase() != Phase::Macro {
        seq.next_report();
    }
    let r = seq.next_report();
    for b in [Button::ZL, Button::ZR, Button::Plus] {
        assert!(r.is_pressed(b), "{b} not pressed");
    }
    assert!(!r.is_pressed(Button::A));
}
