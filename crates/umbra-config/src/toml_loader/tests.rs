use super::*;
use crate::methods::MethodId;
use std::path::Path;
use umbra_common::ConfigError;

#[test]
fn missing_file_is_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    match load_from_path(&missing) {
        Err(ConfigError::FileNotFound(path)) => assert_eq!(path, missing),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.toml");
    std::fs::write(
        &path,
        r##"
enabled = false
default_foreground_color = "#eeeeee"

[configured_pages]
"example.com" = 3
"##,
    )
    .unwrap();

    let prefs = load_from_path(&path).unwrap();
    assert!(!prefs.enabled);
    assert_eq!(prefs.default_foreground_color, "#eeeeee");
    assert_eq!(prefs.configured_pages.get("example.com"), Some(&MethodId::INVERT));
    assert_eq!(prefs.default_background_color, "#000000");
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    assert!(matches!(load_from_path(&path), Err(ConfigError::ParseError(_))));
}

#[test]
fn invalid_values_are_returned_with_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.toml");
    std::fs::write(&path, "default_method = 42\n").unwrap();

    let prefs = load_from_path(&path).unwrap();
    assert_eq!(prefs.default_method, MethodId(42));
}

#[test]
fn load_or_create_writes_default_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("umbra").join("preferences.toml");

    let prefs = load_or_create(&path).unwrap();
    assert!(path.exists());
    assert!(prefs.enabled);

    let reloaded = load_from_path(&path).unwrap();
    assert_eq!(reloaded.default_method, MethodId::STYLESHEET_PROCESSOR);
}

#[test]
fn default_template_parses_to_defaults() {
    use super::template::default_preferences_toml;
    use crate::schema::Preferences;

    let prefs: Preferences = toml::from_str(&default_preferences_toml()).unwrap();
    assert_eq!(prefs, Preferences::default());
}

#[test]
fn default_path_ends_in_app_dir() {
    if let Ok(path) = default_preferences_path() {
        assert!(path.ends_with(Path::new("umbra").join("preferences.toml")));
    }
}

#[test]
fn existing_file_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.toml");
    std::fs::write(&path, "default_method = 2\n").unwrap();

    let prefs = load_or_create(&path).unwrap();
    assert_eq!(prefs.default_method, MethodId::SIMPLE_CSS);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "default_method = 2\n");
}

#[test]
fn load_or_create_falls_back_to_defaults_for_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.toml");
    let original = "default_background_color = \"black\"\ndefault_method = 3\n";
    std::fs::write(&path, original).unwrap();

    let prefs = load_or_create(&path).unwrap();
    assert_eq!(prefs, crate::schema::Preferences::default());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}
