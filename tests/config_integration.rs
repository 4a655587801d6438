//! Integration tests for file-based configuration.
//!
//! Loads TOML files from disk and runs the pipeline with the resulting
//! policy.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use piiscrub::config::PiiscrubConfig;
use piiscrub::{Error, RedactionService, RedactionStrategy, Sensitivity};
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_and_redact() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[detection]
categories = ["email", "phone"]
sensitivity = "high"

[redaction]
strategy = "partial"
"#,
    );

    let config = PiiscrubConfig::load_from_file(&path).unwrap();
    assert_eq!(config.detection.sensitivity, Sensitivity::High);
    assert_eq!(config.redaction.strategy, RedactionStrategy::Partial);

    let context = config.to_redaction_context().unwrap();
    let result = RedactionService::new()
        .process("Call 555-123-4567", &config.detection, &context)
        .unwrap();

    // High sensitivity keeps two characters at each end.
    assert_eq!(result.redacted_text, "Call 55********67");
}

#[test]
fn test_custom_patterns_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[detection]
categories = []

[[detection.custom_patterns]]
name = "ticket"
pattern = 'TCK-\d{5}'
replacement = "[TICKET]"

[[detection.custom_patterns]]
name = "broken"
pattern = "(unclosed"
"#,
    );

    let config = PiiscrubConfig::load_from_file(&path).unwrap();
    let context = config.to_redaction_context().unwrap();
    let outcome = RedactionService::new()
        .run("See TCK-12345 for a@b.com", &config.detection, &context)
        .unwrap();

    assert_eq!(outcome.result.redacted_text, "See [TICKET] for a@b.com");
    assert_eq!(outcome.rejected.len(), 1);
    assert!(outcome.rejected[0].reason.starts_with("invalid regex"));
}

#[test]
fn test_missing_file_is_operation_failure() {
    let dir = TempDir::new().unwrap();
    let err = PiiscrubConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::OperationFailed { ref operation, .. } if operation == "read_config_file"));
}

#[test]
fn test_malformed_toml_is_operation_failure() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[detection\ncategories = 3");
    let err = PiiscrubConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, Error::OperationFailed { ref operation, .. } if operation == "parse_config_file"));
}

#[test]
fn test_invalid_values_are_config_errors() {
    let dir = TempDir::new().unwrap();
    for contents in [
        "[detection]\nsensitivity = \"paranoid\"\n",
        "[redaction]\nstrategy = \"shred\"\n",
        "[redaction]\nmask_char = \"##\"\n",
        "[detection]\ncustom_confidence = 2.0\n",
    ] {
        let path = write_config(&dir, contents);
        let err = PiiscrubConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)), "{contents}: {err}");
    }
}
