use std::fs;

use folio_config::{load_layered_yaml, FolioConfig};

#[test]
fn files_merge_in_argument_order() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.yaml");
    let local = dir.path().join("local.yaml");
    fs::write(&base, "host:\n  call_timeout_secs: 10\n  exports_dir: base\n").unwrap();
    fs::write(&local, "host:\n  exports_dir: local\n").unwrap();

    let loaded = load_layered_yaml(&[&base, &local]).unwrap();
    let cfg = loaded.settings().unwrap();
    assert_eq!(cfg.host.call_timeout_secs, 10);
    assert_eq!(cfg.host.exports_dir, "local");
}

#[test]
fn missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");
    let err = load_layered_yaml(&[&missing]).unwrap_err();
    assert!(err.to_string().contains("nope.yaml"));
}

#[test]
fn invalid_values_surface_config_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("bad.yaml");
    fs::write(&p, "worker:\n  max_abs_qty: -1\n").unwrap();

    let err = load_layered_yaml(&[&p]).unwrap().settings().unwrap_err();
    assert!(err.to_string().contains("CONFIG_INVALID"));
}

#[test]
fn no_files_means_defaults() {
    let no_paths: [&str; 0] = [];
    let cfg = load_layered_yaml(&no_paths).unwrap().settings().unwrap();
    assert_eq!(cfg, FolioConfig::default());
}
