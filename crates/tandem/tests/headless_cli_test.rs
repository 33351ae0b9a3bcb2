//! # Headless Binary Tests
//!
//! Runs `tandem_headless` as a child process and checks its argument handling.
//!
//! Run with: cargo test -p tandem --test headless_cli_test

use std::process::Command;

fn headless(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_tandem_headless"))
        .args(args)
        .env_remove("TANDEM_CONFIG_PATH")
        .output()
        .unwrap()
}

#[test]
fn zero_ticks_rejected() {
    let output = headless(&["0"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("must be at least 1"));
}

#[test]
fn garbage_tick_count_rejected() {
    let output = headless(&["many"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn runs_requested_ticks() {
    let output = headless(&["3"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Frames consumed:   3"), "{stdout}");
    assert!(stdout.contains("Objects destroyed: 3"), "{stdout}");
}
