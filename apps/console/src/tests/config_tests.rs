use super::{select_api_base, settings_from_sources, Settings};

use std::collections::HashMap;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn defaults_apply_without_sources() {
    assert_eq!(settings_from_sources(None, env_of(&[])), Settings::default());
}

#[test]
fn file_overrides_defaults() {
    let settings = settings_from_sources(
        Some("api_base = \"https://func.example.net\"\nlog_filter = \"debug\"\n"),
        env_of(&[]),
    );
    assert_eq!(settings.api_base, "https://func.example.net");
    assert_eq!(settings.log_filter, "debug");
}

#[test]
fn environment_overrides_file() {
    let settings = settings_from_sources(
        Some("api_base = \"https://from-file\""),
        env_of(&[
            ("PROVISIONING_API_BASE", "https://from-env"),
            ("APP__LOG_FILTER", "client_core=debug"),
        ]),
    );
    assert_eq!(settings.api_base, "https://from-env");
    assert_eq!(settings.log_filter, "client_core=debug");
}

#[test]
fn app_prefixed_variable_wins() {
    let settings = settings_from_sources(
        None,
        env_of(&[
            ("PROVISIONING_API_BASE", "https://plain"),
            ("APP__API_BASE", "https://prefixed"),
        ]),
    );
    assert_eq!(settings.api_base, "https://prefixed");
}

#[test]
fn malformed_file_is_ignored() {
    let settings = settings_from_sources(Some("api_base = ["), env_of(&[]));
    assert_eq!(settings, Settings::default());
}

#[test]
fn cli_flag_wins_over_settings() {
    let settings = settings_from_sources(None, env_of(&[("APP__API_BASE", "https://from-env")]));
    assert_eq!(
        select_api_base(Some("https://from-flag/"), &settings),
        "https://from-flag/"
    );
    assert_eq!(select_api_base(None, &settings), "https://from-env");
}
