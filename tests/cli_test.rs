//! Integration tests for command line handling.

use std::process::Command;

use clap::Parser;
use tempfile::TempDir;
use triage::cli::args::{OutputFormat, TriageArgs, USAGE};
use triage::dataset::LabelSelection;

#[test]
fn test_exactly_two_positionals_are_required() {
    for argv in [
        vec!["triage"],
        vec!["triage", "DisasterResponse.db"],
        vec!["triage", "DisasterResponse.db", "classifier.bin", "extra"],
    ] {
        assert!(TriageArgs::try_parse_from(&argv).is_err(), "{argv:?}");
    }

    assert!(TriageArgs::try_parse_from(["triage", "DisasterResponse.db", "classifier.bin"]).is_ok());
}

#[test]
fn test_usage_text() {
    assert!(USAGE.contains("first argument"));
    assert!(USAGE.contains("second argument"));
    assert!(USAGE.ends_with("Example: triage ../data/DisasterResponse.db classifier.bin"));
}

#[test]
fn test_json_output_and_labels() {
    let args = TriageArgs::try_parse_from([
        "triage",
        "a.db",
        "b.bin",
        "--format",
        "json",
        "--pretty",
        "--labels",
        "related,request",
        "-vv",
    ])
    .unwrap();

    assert_eq!(args.output_format, OutputFormat::Json);
    assert!(args.pretty);
    assert_eq!(args.verbosity(), 3);
    assert_eq!(
        args.training_config().unwrap().loader.labels,
        LabelSelection::Named(vec!["related".to_string(), "request".to_string()])
    );
}

#[test]
fn test_help_and_version_are_not_usage_errors() {
    let help = TriageArgs::try_parse_from(["triage", "--help"]).unwrap_err();
    assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);

    let version = TriageArgs::try_parse_from(["triage", "--version"]).unwrap_err();
    assert_eq!(version.kind(), clap::error::ErrorKind::DisplayVersion);
}

fn triage() -> Command {
    Command::new(env!("CARGO_BIN_EXE_triage"))
}

#[test]
fn test_wrong_argument_count_prints_usage_and_exits_2() {
    let dir = TempDir::new().unwrap();
    let database = dir.path().join("only.db");
    let model = dir.path().join("classifier.bin");

    for args in [vec![], vec![database.as_os_str()]] {
        let output = triage().args(&args).output().unwrap();

        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains(USAGE), "{stderr}");
        assert!(output.stdout.is_empty());
    }
    assert!(!database.exists());
    assert!(!model.exists());
}

#[test]
fn test_missing_store_exits_1_with_one_error_prefix() {
    let dir = TempDir::new().unwrap();
    let database = dir.path().join("nonexistent.db");
    let model = dir.path().join("classifier.bin");

    let output = triage().arg(&database).arg(&model).arg("-q").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Error: "), "{stderr}");
    assert_eq!(stderr.matches("Error:").count(), 1, "{stderr}");
    assert!(stderr.contains("Not found: message store"), "{stderr}");
    assert!(!model.exists());
}
