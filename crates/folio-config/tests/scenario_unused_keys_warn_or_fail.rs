use folio_config::{load_layered_yaml_from_strings, report_unused_keys, UnusedKeyPolicy};

#[test]
fn warn_mode_reports_unused_keys_without_error() {
    let yaml = r#"
worker:
  default_fee_rate: 0.0
llm:
  model: "some-model"
  temperature: 0.2
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).expect("config load must succeed");
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)
        .expect("warn mode must not error");

    assert_eq!(
        report.unused_leaf_pointers,
        vec!["/llm/model".to_string(), "/llm/temperature".to_string()]
    );
}

#[test]
fn fail_mode_errors_on_unused_keys() {
    let yaml = "host:\n  exports_dir: out\n  colour: blue\n";
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();

    let err = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap_err();
    let msg = format!("{err:?}");
    assert!(msg.contains("CONFIG_UNUSED_KEYS"));
    assert!(msg.contains("/host/colour"));
}

#[test]
fn list_values_are_consumed_by_their_key() {
    let yaml = r#"
host:
  worker_args: ["--config", "worker.yaml"]
  default_scenarios: ["-10%", "+2"]
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
    assert!(report.is_clean());
}
