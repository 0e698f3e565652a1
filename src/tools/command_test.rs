use super::*;
use std::time::Instant;

#[test]
fn parse_output_groups_by_name() {
    let set = parse_tool_output(
        r#"{"diagnostics": [
            {"name": "long-method", "findings": [{"id": "a", "severity": 2, "location": "x.rs:1"}]},
            {"name": "long-method", "findings": [{"id": "b"}]},
            {"name": "dup-block"}
        ]}"#,
    )
    .unwrap();
    assert_eq!(set["long-method"].count(), 2);
    assert!(set["dup-block"].is_matched());
    assert_eq!(set["dup-block"].count(), 0);
}

#[test]
fn parse_output_rejects_garbage() {
    assert!(parse_tool_output("not json").is_err());
    assert!(parse_tool_output(r#"{"other": []}"#).is_err());
}

#[cfg(unix)]
fn sh(script: &str) -> Vec<String> {
    vec!["-c".to_string(), script.to_string()]
}

#[cfg(unix)]
#[test]
fn command_tool_reads_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let tool = CommandTool::new(
        "echo",
        "sh",
        sh(r#"echo '{"diagnostics":[{"name":"xss","findings":[{"id":"f"}]}]}'"#),
        Duration::from_secs(10),
    );
    let set = tool.analyze(dir.path()).unwrap();
    assert_eq!(set["xss"].count(), 1);
}

#[cfg(unix)]
#[test]
fn command_tool_substitutes_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("out.json"),
        r#"{"diagnostics":[{"name":"r"}]}"#,
    )
    .unwrap();
    let tool = CommandTool::new(
        "cat",
        "sh",
        sh("cat \"$0/out.json\"")
            .into_iter()
            .chain(["{root}".to_string()])
            .collect(),
        Duration::from_secs(10),
    );
    let set = tool.analyze(dir.path()).unwrap();
    assert!(set.contains_key("r"));
}

#[cfg(unix)]
#[test]
fn failing_command_is_a_tool_error() {
    let dir = tempfile::tempdir().unwrap();
    let tool = CommandTool::new("bad", "sh", sh("echo boom >&2; exit 3"), Duration::from_secs(10));
    let err = tool.analyze(dir.path()).unwrap_err();
    match err {
        Error::Tool { tool, message, .. } => {
            assert_eq!(tool, "bad");
            assert!(message.contains("boom"), "got: {message}");
        }
        other => panic!("expected tool error, got {other}"),
    }
}

#[cfg(unix)]
#[test]
fn slow_command_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let tool = CommandTool::new("slow", "sh", sh("sleep 5"), Duration::from_millis(200));
    let started = Instant::now();
    let err = tool.analyze(dir.path()).unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }), "got: {err}");
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn missing_program_is_a_tool_error() {
    let dir = tempfile::tempdir().unwrap();
    let tool = CommandTool::new(
        "ghost",
        "qi-no-such-program-here",
        vec![],
        Duration::from_secs(1),
    );
    assert!(matches!(tool.analyze(dir.path()), Err(Error::Tool { .. })));
}

#[cfg(unix)]
#[test]
fn command_size_parses_number() {
    let dir = tempfile::tempdir().unwrap();
    let size = CommandSize::new("sh", sh("echo 1234"), Duration::from_secs(10));
    assert_eq!(size.size(dir.path()).unwrap(), 1234.0);
    let bad = CommandSize::new("sh", sh("echo lots"), Duration::from_secs(10));
    assert!(bad.size(dir.path()).is_err());
}
