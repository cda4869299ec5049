//! Settings persisted through a JSON file survive a reopen.

use skycast_core::{FileStore, KeyValueStore, Settings, StoreError, Theme, UnitSystem};
use tempfile::TempDir;

#[test]
fn settings_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    {
        let mut settings = Settings::load(FileStore::open(&path).unwrap());
        settings.set_units(UnitSystem::Imperial).unwrap();
        settings.set_theme(Theme::Light).unwrap();
        assert!(settings.add_favorite("Tokyo, JP").unwrap());
        assert!(settings.add_favorite("Paris, FR").unwrap());
        assert!(settings.remove_favorite("Tokyo, JP").unwrap());
    }

    let settings = Settings::load(FileStore::open(&path).unwrap());
    assert_eq!(settings.prefs().units, UnitSystem::Imperial);
    assert_eq!(settings.prefs().theme, Theme::Light);
    assert_eq!(settings.favorites(), ["Paris, FR"]);
}

#[test]
fn file_uses_plain_string_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");

    let mut store = FileStore::open(&path).unwrap();
    store.set("weather-units", "metric".into()).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["weather-units"], "metric");
}

#[test]
fn unreadable_values_fall_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{"weather-units": "kelvin", "weather-theme": "light", "weather-favorites": "{oops"}"#,
    )
    .unwrap();

    let settings = Settings::load(FileStore::open(&path).unwrap());
    assert_eq!(settings.prefs().units, UnitSystem::Metric);
    assert_eq!(settings.prefs().theme, Theme::Light);
    assert!(settings.favorites().is_empty());
}

#[test]
fn corrupt_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "not json").unwrap();

    let err = FileStore::open(&path).unwrap_err();
    assert!(matches!(err, StoreError::Malformed(_)));
}
