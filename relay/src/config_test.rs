use super::*;
use std::collections::HashMap;

fn config_from(pairs: &[(&str, &str)]) -> RelayConfig {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    RelayConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_when_nothing_is_set() {
    let config = RelayConfig::default();
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 3000);
    assert_eq!(config.static_dir, PathBuf::from("public"));
    assert_eq!(config.client_queue_capacity, 256);
    assert_eq!(config.bind_addr(), "0.0.0.0:3000");
}

#[test]
fn reads_every_variable() {
    let config = config_from(&[
        ("HOST", "127.0.0.1"),
        ("PORT", "8443"),
        ("STATIC_DIR", "/srv/paint"),
        ("CLIENT_QUEUE_CAPACITY", "32"),
    ]);
    assert_eq!(config.bind_addr(), "127.0.0.1:8443");
    assert_eq!(config.static_dir, PathBuf::from("/srv/paint"));
    assert_eq!(config.client_queue_capacity, 32);
}

#[test]
fn unparseable_values_fall_back_to_defaults() {
    let config = config_from(&[("PORT", "not-a-port"), ("CLIENT_QUEUE_CAPACITY", "-4")]);
    assert_eq!(config.port, 3000);
    assert_eq!(config.client_queue_capacity, 256);
}

#[test]
fn blank_host_falls_back_to_default() {
    let config = config_from(&[("HOST", "  ")]);
    assert_eq!(config.host, "0.0.0.0");
}

#[test]
fn zero_queue_capacity_is_raised_to_one() {
    let config = config_from(&[("CLIENT_QUEUE_CAPACITY", "0")]);
    assert_eq!(config.client_queue_capacity, 1);
}

#[test]
fn missing_static_dir_is_not_served() {
    let config = config_from(&[("STATIC_DIR", "/definitely/not/a/real/dir")]);
    assert!(config.static_dir_if_present().is_none());
}

#[test]
fn existing_static_dir_is_served() {
    let dir = std::env::temp_dir();
    let config = config_from(&[("STATIC_DIR", dir.to_str().expect("utf-8 temp dir"))]);
    assert_eq!(config.static_dir_if_present(), Some(dir));
}
