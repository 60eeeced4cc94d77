use std::io::Write;
use std::path::Path;
use std::process::Command;

use sciname::{ConfigError, NameParser, NameType, Rank};
use serde_json::Value;
use tempfile::{NamedTempFile, TempDir};

const OVERRIDES_JSON: &str = r#"[
    {"id": "Lepidoptera|", "uninomial": "Lepidoptera", "rank": "ORDER"},
    {"id": "Abies alba|Mill.", "genus": "Abies", "specific_epithet": "alba",
     "rank": "SPECIES", "combination_authorship": {"authors": ["Miller"]}}
]"#;

fn overrides_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn run_cli(args: &[&str]) -> Vec<Value> {
    let output = Command::new(env!("CARGO_BIN_EXE_sciname"))
        .args(args)
        .output()
        .expect("Failed to run the sciname binary");
    assert!(
        output.status.success(),
        "sciname failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("Each output line should be JSON"))
        .collect()
}

#[test]
fn test_overrides_from_json_file() {
    let file = overrides_file(".json", OVERRIDES_JSON);
    let parser = NameParser::new();
    assert_eq!(parser.load_overrides(file.path()).unwrap(), 2);

    let pn = parser.parse("Lepidoptera", None, None).unwrap();
    assert_eq!(pn.rank, Rank::Order);

    // keys ignore case and whitespace
    let pn = parser.parse("ABIES   alba  Mill.", None, None).unwrap();
    assert_eq!(pn.combination_authorship.authors, vec!["Miller"]);

    let pa = parser.parse_authorship("Mill.").unwrap();
    assert_eq!(pa.combination_authorship.authors, vec!["Miller"]);
}

#[test]
fn test_overrides_from_yaml_file() {
    let yaml = "- id: \"Iris germanica|\"\n  genus: Iris\n  specific_epithet: germanica\n  type: INFORMAL\n";
    let file = overrides_file(".yaml", yaml);
    let parser = NameParser::new();
    assert_eq!(parser.load_overrides(file.path()).unwrap(), 1);

    let pn = parser.parse("Iris germanica", None, None).unwrap();
    assert_eq!(pn.name_type, NameType::Informal);
    assert_eq!(pn.genus.as_deref(), Some("Iris"));
}

#[test]
fn test_broken_override_files_are_errors() {
    let parser = NameParser::new();

    let file = overrides_file(".json", "{ not json");
    assert!(matches!(
        parser.load_overrides(file.path()),
        Err(ConfigError::Json(_))
    ));

    let missing = TempDir::new().unwrap().path().join("missing.yml");
    assert!(matches!(
        parser.load_overrides(&missing),
        Err(ConfigError::Io(_))
    ));
    assert!(parser.configs().is_empty());
}

#[test]
fn test_cli_prints_json_lines() {
    let results = run_cli(&["Abies alba Mill.", "Tobacco mosaic virus"]);
    assert_eq!(results.len(), 2);

    assert_eq!(results[0]["input"], "Abies alba Mill.");
    assert_eq!(results[0]["parsed"], true);
    assert_eq!(results[0]["canonical_name"], "Abies alba");
    assert_eq!(results[0]["genus"], "Abies");
    assert_eq!(results[0]["rank"], "SPECIES");

    assert_eq!(results[1]["parsed"], false);
    assert_eq!(results[1]["type"], "VIRUS");
}

#[test]
fn test_cli_uses_override_file() {
    let file = overrides_file(".json", OVERRIDES_JSON);
    let path = file.path().to_string_lossy().to_string();
    let results = run_cli(&["--overrides", &path, "Lepidoptera"]);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["uninomial"], "Lepidoptera");
    assert_eq!(results[0]["rank"], "ORDER");
}

#[test]
fn test_cli_reads_input_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("names.txt");
    std::fs::write(&input, "Abies alba\n\nPinus nigra Arnold\n").unwrap();

    let results = run_cli(&["--input", &input.to_string_lossy()]);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["input"], "Abies alba");
    assert_eq!(results[1]["specific_epithet"], "nigra");
}

#[test]
fn test_cli_rejects_missing_override_file() {
    let output = Command::new(env!("CARGO_BIN_EXE_sciname"))
        .args(["--overrides", "does/not/exist.json", "Abies"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!Path::new("does/not/exist.json").exists());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load overrides"));
}
