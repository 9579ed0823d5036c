//! Session-level tests against a scripted fake debugger.
#![cfg(unix)]

mod common;

use std::time::{Duration, Instant};

use gambit::core::session::{GdbSession, SessionConfig, SessionError};

const ECHO_SERVER: &str = r#"#!/bin/sh
printf '(gdb) '
while IFS= read -r line; do
    case "$line" in
        "hang") ;;
        "echo "*) printf '%s\n(gdb) ' "${line#echo }" ;;
        *) printf '(gdb) ' ;;
    esac
done
"#;

fn open(dir: &std::path::Path, timeout: Duration) -> GdbSession {
    let program = common::fake_gdb(dir, ECHO_SERVER);
    let config = SessionConfig {
        program: program.to_string_lossy().into_owned(),
        request_timeout: timeout,
        ..Default::default()
    };
    GdbSession::open(&dir.join("2048"), config).unwrap()
}

#[test]
fn pairs_each_command_with_its_response() {
    let dir = common::scratch_dir("pairing");
    let mut session = open(&dir, Duration::from_secs(5));

    assert_eq!(session.request("echo hello").unwrap(), "hello\n");
    assert_eq!(session.request("echo world").unwrap(), "world\n");
}

#[test]
fn sentinel_inside_a_line_is_ordinary_output() {
    let dir = common::scratch_dir("anchoring");
    let mut session = open(&dir, Duration::from_secs(5));

    let output = session.request("echo note: (gdb) is not a prompt").unwrap();
    assert_eq!(output, "note: (gdb) is not a prompt\n");
}

#[test]
fn request_after_close_fails_fast() {
    let dir = common::scratch_dir("closed");
    let mut session = open(&dir, Duration::from_secs(5));
    session.close();

    let started = Instant::now();
    let err = session.request("echo anything").unwrap_err();
    assert!(matches!(err, SessionError::Closed));
    // fail fast, not after a timeout
    assert!(started.elapsed() < Duration::from_secs(1));

    // close is idempotent
    session.close();
    assert!(session.is_closed());
}

#[test]
fn interrupt_after_close_fails_fast() {
    let dir = common::scratch_dir("closed-interrupt");
    let mut session = open(&dir, Duration::from_secs(5));
    session.close();

    assert!(matches!(session.interrupt(), Err(SessionError::Closed)));
}

#[test]
fn silent_server_times_out() {
    let dir = common::scratch_dir("timeout");
    let mut session = open(&dir, Duration::from_millis(200));

    let err = session.request("hang").unwrap_err();
    match err {
        SessionError::PromptTimeout { command, .. } => assert_eq!(command, "hang"),
        other => panic!("expected PromptTimeout, got {other:?}"),
    }
}
