//! Tests for the docxflow binary.

#![cfg(feature = "cli")]

use std::process::Command;

fn docxflow() -> Command {
    Command::new(env!("CARGO_BIN_EXE_docxflow"))
}

#[test]
fn test_writes_parts() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("ch1.html");
    std::fs::write(&input, "<h1>Title</h1><p>Body text</p>").unwrap();
    let css = dir.path().join("extra.css");
    std::fs::write(&css, "p { font-style: italic }").unwrap();
    let out = dir.path().join("out");

    let status = docxflow()
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .arg("--stylesheet")
        .arg(&css)
        .arg("--quiet")
        .status()
        .unwrap();
    assert!(status.success());

    let document = std::fs::read_to_string(out.join("word/document.xml")).unwrap();
    assert!(document.contains("<w:t>Body text</w:t>"));
    let styles = std::fs::read_to_string(out.join("word/styles.xml")).unwrap();
    assert!(styles.contains("<w:i/>"));
    assert!(out.join("word/_rels/document.xml.rels").is_file());
}

#[test]
fn test_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a.html");
    let second = dir.path().join("b.html");
    std::fs::write(&first, "<p>one<br/>two</p>").unwrap();
    std::fs::write(&second, "<p>three</p>").unwrap();

    let output = docxflow().arg(&first).arg(&second).arg("--json").output().unwrap();
    assert!(output.status.success());

    let model: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let paragraphs = model["paragraphs"].as_array().unwrap();
    assert_eq!(paragraphs.len(), 2);
    assert_eq!(paragraphs[1]["page_break_before"], true);
    let tokens = paragraphs[0]["runs"][0]["tokens"].as_array().unwrap();
    assert_eq!(tokens[0]["text"]["text"], "one");
    assert_eq!(tokens[1]["break"], "none");
}

#[test]
fn test_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = docxflow()
        .arg(dir.path().join("missing.html"))
        .arg("--json")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("error:"));
}
