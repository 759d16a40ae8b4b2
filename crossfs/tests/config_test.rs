//! Settings file loading.

use crossfs::command::SingleQuotes;
use crossfs::config::Settings;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn settings_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_explicit_file() {
    let file = settings_file(
        r#"
log_level = "warn"
command_timeout_secs = 30
default_search_depth = 7
single_quote_policy = "literal"
base_dir = "/tmp/work"
"#,
    );
    let settings = Settings::load(Some(file.path())).unwrap();
    assert_eq!(settings.log_level, "warn");
    assert_eq!(settings.command_timeout(), Duration::from_secs(30));
    assert_eq!(settings.default_search_depth, 7);
    assert_eq!(settings.single_quote_policy, SingleQuotes::Literal);
    assert_eq!(settings.resolved_base_dir().as_deref(), Some("/tmp/work"));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = Settings::load(Some(&missing)).unwrap_err();
    assert!(format!("{err:#}").contains("nope.toml"));
}

#[test]
fn test_invalid_file_names_the_file() {
    let file = settings_file("command_timeout_secs = \"soon\"\n");
    let err = Settings::load_from_file(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains(&file.path().display().to_string()));
}

#[test]
fn test_settings_cannot_touch_the_allowlist() {
    let file = settings_file("allowed_prefixes = [\"/\"]\n");
    assert!(Settings::load_from_file(file.path()).is_err());
}

#[test]
fn test_settings_round_trip_through_toml() {
    let settings = Settings::default();
    let text = toml::to_string(&settings).unwrap();
    assert_eq!(Settings::from_toml_str(&text).unwrap(), settings);
}
