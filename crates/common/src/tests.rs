use super::*;
use pretty_assertions::assert_eq;
use std::collections::HashMap;

#[test]
fn config_defaults_are_sane() {
    let cfg = Config::default();
    assert_eq!(cfg.fixture_dir, PathBuf::from("tests/test_data"));
    assert_eq!(cfg.log_level, "info");
    assert!(!cfg.status_row);
    assert!(!cfg.inherit_base_parameters);
}

#[test]
fn builder_matches_default() {
    assert_eq!(Config::builder().build(), Config::default());
}

#[test]
fn env_overlays_defaults() {
    let vars: HashMap<&str, &str> = HashMap::from([
        (ENV_FIXTURE_DIR, "/srv/fixtures"),
        (ENV_STATUS_ROW, "TRUE"),
        (ENV_INHERIT, "0"),
    ]);
    let cfg = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
    assert_eq!(cfg.fixture_dir, PathBuf::from("/srv/fixtures"));
    assert!(cfg.status_row);
    assert!(!cfg.inherit_base_parameters);
    assert_eq!(cfg.log_level, "info");
}

#[test]
fn bad_env_flag_is_config_error() {
    let err = Config::from_lookup(|k| (k == ENV_STATUS_ROW).then(|| "maybe".to_string()))
        .unwrap_err();
    assert!(matches!(err, HarnessError::Config(_)));
    assert!(err.to_string().contains(ENV_STATUS_ROW));
}

#[test]
fn harness_error_formats_cleanly() {
    let err = HarnessError::Fixture("missing file".into());
    assert!(format!("{err}").contains("fixture"));
    assert_eq!(err.message(), "missing file");
}

#[test]
fn io_error_converts() {
    let e = io::Error::other("oops");
    let err: HarnessError = e.into();
    assert!(matches!(err, HarnessError::Io(_)));
}

#[test]
fn invocation_result_accessors() {
    let result = InvocationResult::with_rows(RecordBatch::new(
        vec!["intStatus".into(), "strMessage".into()],
        vec![Row::new(vec![Value::Int(1), Value::Text("Saved".into())])],
    ))
    .with_output("@id", 42);

    assert!(result.has_result_set());
    assert_eq!(result.row_count(), 1);
    assert_eq!(result.output("@id"), Some(&Value::Int(42)));
    assert_eq!(
        result.first_row_value("strMessage"),
        Some(&Value::Text("Saved".into()))
    );
    assert_eq!(result.first_row_value("missing"), None);
    assert_eq!(
        result.row_maps()[0].get("intStatus"),
        Some(&Value::Int(1))
    );
}

#[test]
fn no_result_differs_from_empty_result_set() {
    let none = InvocationResult::no_result();
    let empty = InvocationResult::with_rows(RecordBatch::default());
    assert!(!none.has_result_set());
    assert!(empty.has_result_set());
    assert_eq!(none.rows(), empty.rows());
    assert_ne!(none, empty);
}

#[test]
fn invocation_result_reads_replay_json() {
    let json = r#"{
        "result_set": {"columns": ["id"], "rows": [[7], [8]]},
        "outputs": {"@id": 7}
    }"#;
    let result: InvocationResult = serde_json::from_str(json).unwrap();
    assert_eq!(result.row_count(), 2);
    assert_eq!(result.rows()[1], Row::new(vec![Value::Int(8)]));
    assert_eq!(result.output("@id"), Some(&Value::Int(7)));
}
