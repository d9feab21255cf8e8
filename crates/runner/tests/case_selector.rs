use common::{Config, HarnessError, pretty::TableStyleKind};
use pretty_assertions::assert_eq;
use runner::{CaseOutcome, CaseSelector, render};
use testsupport::prelude::*;
use types::Value;

const TEAMS: &str = r#"{
    "usp_CreateUpdateSchedulingTeam": [
        {
            "case_id": "TC_POS_01",
            "case_type": "positive",
            "description": "create a team",
            "parameters": {"@name": "A", "@region": "EU"}
        },
        {
            "case_id": "TC_NEG_01",
            "case_type": "NEGATIVE",
            "description": "duplicate name",
            "parameters": {"@name": "A"}
        },
        {
            "case_id": "TC_CHAIN_01",
            "case_type": "Positive",
            "description": "create then rename",
            "chain_config": [
                {"step": 1, "sp_name": "Create", "parameters": {"name": "A"},
                 "output_mapping": {"@id": "new_id"}},
                {"step": 2, "sp_name": "Update", "parameters": {"id": "$(new_id)", "name": "B"}}
            ]
        }
    ]
}"#;

const PROC: &str = "usp_CreateUpdateSchedulingTeam";

fn fixture_dir() -> TempFixtureDir {
    let dir = TempFixtureDir::new().unwrap();
    dir.write("teams", TEAMS).unwrap();
    dir
}

#[test]
fn runs_every_case_in_fixture_order() {
    common::logging::init_for_tests();
    let dir = fixture_dir();
    let db = ScriptedInvoker::new()
        .respond(PROC, status_row(1, "Created", 7))
        .fail(PROC, "duplicate name")
        .respond("Create", outputs([("@id", 42)]));
    let mut selector = CaseSelector::new(dir.store(), db);

    let report = selector.run(PROC, None, "teams").unwrap();

    let ids: Vec<&str> = report.cases.iter().map(|c| c.case_id.as_str()).collect();
    assert_eq!(ids, vec!["TC_POS_01", "TC_NEG_01", "TC_CHAIN_01"]);
    assert_eq!(report.passed_count(), 2);
    assert!(!report.passed());
    assert!(matches!(
        &report.cases[1].outcome,
        CaseOutcome::Single(Err(message)) if message == "duplicate name"
    ));
    let CaseOutcome::Chain(outcome) = &report.cases[2].outcome else {
        panic!("expected chain outcome");
    };
    assert_variable(outcome, "new_id", &Value::Int(42));

    let db = selector.into_invoker();
    assert_eq!(db.called_procedures(), vec![PROC, PROC, "Create", "Update"]);
    assert_param(db.calls_to("Update")[0], "id", &Value::Int(42));
}

#[test]
fn category_filter_is_case_insensitive() {
    let dir = fixture_dir();
    let mut selector = CaseSelector::new(dir.store(), ScriptedInvoker::new());

    let report = selector.run(PROC, Some("positive"), "teams.json").unwrap();

    let ids: Vec<&str> = report.cases.iter().map(|c| c.case_id.as_str()).collect();
    assert_eq!(ids, vec!["TC_POS_01", "TC_CHAIN_01"]);
    assert_eq!(report.cases[1].index, 2);
    assert!(report.passed());
}

#[test]
fn unknown_category_is_a_config_error() {
    let dir = fixture_dir();
    let mut selector = CaseSelector::new(dir.store(), ScriptedInvoker::new());

    let err = selector.run(PROC, Some("smoke"), "teams").unwrap_err();

    assert!(matches!(err, HarnessError::Config(_)));
    assert_eq!(selector.invoker().call_count(), 0);
}

#[test]
fn empty_category_yields_note() {
    let dir = fixture_dir();
    let mut selector = CaseSelector::new(dir.store(), ScriptedInvoker::new());

    let report = selector.run(PROC, Some("edge"), "teams").unwrap();

    assert!(report.cases.is_empty());
    assert_eq!(
        report.note.as_deref(),
        Some("No 'EDGE' test cases found for SP 'usp_CreateUpdateSchedulingTeam'")
    );
    assert!(report.passed());
}

#[test]
fn unknown_procedure_yields_note() {
    let dir = fixture_dir();
    let mut selector = CaseSelector::new(dir.store(), ScriptedInvoker::new());

    let report = selector.run("usp_Missing", None, "teams").unwrap();

    assert_eq!(
        render(&report, TableStyleKind::Plain),
        "No test cases found for SP 'usp_Missing' in teams.json"
    );
}

#[test]
fn missing_fixture_file_is_an_error() {
    let dir = fixture_dir();
    let mut selector = CaseSelector::new(dir.store(), ScriptedInvoker::new());

    let result = selector.run(PROC, None, "absent");

    assert_error_contains(result, "test input file not found");
}

#[test]
fn status_row_config_rejects_single_and_chain_cases() {
    let dir = fixture_dir();
    let config = Config::builder()
        .fixture_dir(dir.path().to_path_buf())
        .status_row(true)
        .build();
    let db = ScriptedInvoker::new()
        .respond(PROC, status_row(0, "Region closed", 0))
        .respond("Create", status_row(1, "Created", 42).with_output("@id", 42))
        .respond("Update", status_row(0, "Name taken", 0));
    let mut selector = CaseSelector::from_config(&config, db);

    let report = selector.run(PROC, None, "teams").unwrap();

    assert_eq!(report.passed_count(), 0);
    assert!(matches!(
        &report.cases[0].outcome,
        CaseOutcome::Single(Err(message)) if message == "Region closed"
    ));
    let CaseOutcome::Chain(outcome) = &report.cases[2].outcome else {
        panic!("expected chain outcome");
    };
    assert_chain_failed_at(outcome, 2);

    let text = render(&report, TableStyleKind::Ascii);
    assert!(text.contains("[FAILED] CHAIN EXECUTION FAILED"));
    assert!(text.contains("Failed at: STEP 2"));
    assert!(text.contains("Error: Name taken"));
    assert!(text.contains("[OK] Status: 1"));
    assert!(text.contains("[FAIL] Status: 0"));
    assert!(text.ends_with("0 passed, 3 failed"));
}

#[test]
fn successful_chain_renders_chain_data() {
    let dir = fixture_dir();
    let db = ScriptedInvoker::new().respond("Create", outputs([("@id", 42)]));
    let mut selector = CaseSelector::new(dir.store(), db);

    let report = selector.run(PROC, Some("POSITIVE"), "teams").unwrap();
    let text = render(&report, TableStyleKind::Ascii);

    assert!(text.contains("[SUCCESS] Chain execution completed (2 steps)"));
    assert!(text.contains("new_id"));
    assert!(text.contains("[OK] No results returned"));
}

#[test]
fn fixture_sets_are_loaded_once() {
    let dir = fixture_dir();
    let mut selector = CaseSelector::new(dir.store(), ScriptedInvoker::new());
    selector.run(PROC, None, "teams").unwrap();

    dir.write("teams", r#"{"usp_CreateUpdateSchedulingTeam": []}"#).unwrap();
    assert_eq!(selector.run(PROC, None, "teams").unwrap().cases.len(), 3);

    selector.store_mut().invalidate("teams");
    assert!(selector.run(PROC, None, "teams").unwrap().cases.is_empty());
}
