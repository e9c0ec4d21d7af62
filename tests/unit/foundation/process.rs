use super::*;
use std::process::{Command, Stdio};

fn sh(script: &str) -> Child {
    Command::new("sh")
        .args(["-c", script])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap()
}

#[test]
fn collects_stdout_and_stderr() {
    let out = wait_with_timeout(sh("echo hello; echo oops >&2"), "sh", Duration::from_secs(5))
        .unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "hello");
    assert_eq!(out.stderr_lossy(), "oops");
}

#[test]
fn kills_child_after_timeout() {
    let started = Instant::now();
    let err = wait_with_timeout(sh("sleep 5"), "sleeper", Duration::from_millis(100)).unwrap_err();
    assert!(matches!(err, TradeAnimError::Service(_)));
    assert!(err.to_string().contains("sleeper timed out"));
    assert!(started.elapsed() < Duration::from_secs(4));
}
