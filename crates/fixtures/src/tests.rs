use super::*;
use common::HarnessError;
use pretty_assertions::assert_eq;
use std::fs;
use types::Value;

const TEAMS: &str = r#"{
  "usp_CreateTeam": [
    {
      "case_id": "create_ok",
      "case_type": "POSITIVE",
      "description": "plain insert",
      "parameters": { "@name": "A", "@size": 3, "@note": null }
    },
    {
      "case_id": "create_then_rename",
      "case_type": "edge",
      "chain_config": [
        {
          "sp_name": "usp_CreateTeam",
          "parameters": { "@name": "A" },
          "output_mapping": { "@id": "new_id" }
        },
        {
          "step": 7,
          "sp_name": "usp_RenameTeam",
          "parameters": { "@id": "$(new_id)", "@name": "B" },
          "input_mapping": { "@owner": "owner_id" }
        }
      ]
    }
  ],
  "usp_DeleteTeam": []
}"#;

#[test]
fn parses_single_and_chain_cases() {
    let set = FixtureSet::from_json_str("teams", TEAMS).unwrap();
    assert_eq!(set.case_count(), 2);
    assert_eq!(
        set.procedures().collect::<Vec<_>>(),
        vec!["usp_CreateTeam", "usp_DeleteTeam"]
    );

    let cases = set.cases_for("usp_CreateTeam").unwrap();
    assert_eq!(cases[0].case_type, CaseType::Positive);
    assert_eq!(cases[0].description, "plain insert");
    let params = cases[0].parameters().unwrap();
    assert_eq!(
        params.keys().collect::<Vec<_>>(),
        vec!["@name", "@size", "@note"]
    );
    assert_eq!(params["@size"], Value::Int(3));
    assert_eq!(params["@note"], Value::Null);

    let steps = cases[1].chain_config().unwrap();
    assert_eq!(cases[1].case_type, CaseType::Edge);
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].step, 1, "missing label falls back to position");
    assert_eq!(steps[1].step, 7);
    assert_eq!(steps[0].output_mapping["@id"], "new_id");
    assert_eq!(steps[1].input_mapping["@owner"], "owner_id");
    assert_eq!(
        steps[1].parameters["@id"],
        Value::Text("$(new_id)".into())
    );
}

#[test]
fn unknown_procedure_has_no_cases() {
    let set = FixtureSet::from_json_str("teams", TEAMS).unwrap();
    assert!(set.cases_for("usp_Nope").is_none());
    assert_eq!(set.cases_for("usp_DeleteTeam").unwrap().len(), 0);
}

#[test]
fn case_type_parsing_is_case_insensitive() {
    assert_eq!("positive".parse::<CaseType>().unwrap(), CaseType::Positive);
    assert_eq!(" Negative ".parse::<CaseType>().unwrap(), CaseType::Negative);
    assert!(matches!(
        "smoke".parse::<CaseType>(),
        Err(HarnessError::Config(_))
    ));
}

#[test]
fn case_without_payload_is_config_error() {
    let json = r#"{"usp_X": [{"case_id": "c1", "case_type": "EDGE"}]}"#;
    let err = FixtureSet::from_json_str("x", json).unwrap_err();
    assert!(matches!(err, HarnessError::Config(_)));
    assert!(err.to_string().contains("neither parameters nor chain_config"));
}

#[test]
fn case_with_both_payloads_is_config_error() {
    let json = r#"{"usp_X": [{"case_id": "c1", "case_type": "EDGE",
        "parameters": {}, "chain_config": [{"sp_name": "usp_X"}]}]}"#;
    let err = FixtureSet::from_json_str("x", json).unwrap_err();
    assert!(err.to_string().contains("both"));
}

#[test]
fn unknown_category_is_config_error() {
    let json = r#"{"usp_X": [{"case_id": "c1", "case_type": "SMOKE", "parameters": {}}]}"#;
    let err = FixtureSet::from_json_str("x", json).unwrap_err();
    assert!(matches!(err, HarnessError::Config(_)));
    assert!(err.to_string().contains("c1"));
}

#[test]
fn missing_case_id_is_fixture_error() {
    let json = r#"{"usp_X": [{"case_type": "POSITIVE", "parameters": {}}]}"#;
    let err = FixtureSet::from_json_str("x", json).unwrap_err();
    assert!(matches!(err, HarnessError::Fixture(_)));
}

#[test]
fn step_without_procedure_is_fixture_error() {
    let json = r#"{"usp_X": [{"case_id": "c", "case_type": "EDGE",
        "chain_config": [{"parameters": {}}]}]}"#;
    let err = FixtureSet::from_json_str("x", json).unwrap_err();
    assert!(matches!(err, HarnessError::Fixture(_)));
    assert!(err.to_string().contains("sp_name"));
}

#[test]
fn malformed_json_is_fixture_error() {
    let err = FixtureSet::from_json_str("broken", "{ not json").unwrap_err();
    assert!(matches!(err, HarnessError::Fixture(_)));
    assert!(err.to_string().contains("broken"));
}

#[test]
fn store_resolves_and_appends_extension() {
    let store = FixtureStore::new("/data");
    assert_eq!(
        store.resolve_path("teams").unwrap(),
        std::path::PathBuf::from("/data/teams.json")
    );
    assert_eq!(
        store.resolve_path("teams.json").unwrap(),
        std::path::PathBuf::from("/data/teams.json")
    );
    assert!(matches!(
        store.resolve_path("  "),
        Err(HarnessError::Fixture(_))
    ));
}

#[test]
fn store_caches_until_invalidated() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("teams.json"), TEAMS).unwrap();
    let mut store = FixtureStore::new(dir.path());

    let first = store.load("teams").unwrap();
    assert!(store.is_cached("teams.json"));

    // A changed file is not re-read while cached.
    fs::write(dir.path().join("teams.json"), r#"{"usp_Other": []}"#).unwrap();
    let second = store.load("teams.json").unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    assert!(store.invalidate("teams"));
    assert!(!store.invalidate("teams"));
    let third = store.load("teams").unwrap();
    assert_eq!(third.procedures().collect::<Vec<_>>(), vec!["usp_Other"]);

    store.clear();
    assert!(!store.is_cached("teams"));
}

#[test]
fn store_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FixtureStore::new(dir.path());
    let err = store.load("absent").unwrap_err();
    assert!(matches!(err, HarnessError::Fixture(_)));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn null_or_missing_description_reads_as_empty() {
    let json = r#"{
      "usp_CreateTeam": [
        { "case_id": "a", "case_type": "positive", "description": null, "parameters": {} },
        { "case_id": "b", "case_type": "negative", "parameters": {} }
      ],
      "usp_DeleteTeam": [
        { "case_id": "c", "case_type": "edge", "description": "kept", "parameters": {} }
      ]
    }"#;

    let set = FixtureSet::from_json_str("teams", json).unwrap();

    let cases = set.cases_for("usp_CreateTeam").unwrap();
    assert_eq!(cases[0].description, "");
    assert_eq!(cases[1].description, "");
    assert_eq!(set.cases_for("usp_DeleteTeam").unwrap()[0].description, "kept");
}
