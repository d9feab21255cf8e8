use crate::report::{CaseOutcome, CaseReport, RunReport};
use chain::{ChainExecutor, ChainOptions, StatusPolicy};
use common::{Config, HarnessResult};
use fixtures::{CasePayload, CaseType, FixtureStore, TestCase};
use invoker::ProcedureInvoker;
use tracing::{info, info_span, warn};

/// Chain options implied by the harness configuration.
pub fn chain_options(config: &Config) -> ChainOptions {
    let status_policy = if config.status_row {
        StatusPolicy::status_row()
    } else {
        StatusPolicy::InvocationOnly
    };
    ChainOptions::builder()
        .status_policy(status_policy)
        .inherit_base_parameters(config.inherit_base_parameters)
        .build()
}

/// Runs the fixture cases of one procedure against an invoker.
///
/// # Example
///
/// ```
/// use runner::CaseSelector;
/// use testsupport::prelude::*;
///
/// let dir = TempFixtureDir::new().unwrap();
/// dir.write("teams", r#"{"usp_Get": [
///     {"case_id": "TC1", "case_type": "positive", "parameters": {"@id": 1}}
/// ]}"#).unwrap();
///
/// let mut selector = CaseSelector::new(dir.store(), ScriptedInvoker::new());
/// let report = selector.run("usp_Get", None, "teams").unwrap();
/// assert_eq!(report.cases.len(), 1);
/// assert!(report.passed());
/// ```
pub struct CaseSelector<I> {
    store: FixtureStore,
    invoker: I,
    options: ChainOptions,
}

impl<I: ProcedureInvoker> CaseSelector<I> {
    pub fn new(store: FixtureStore, invoker: I) -> Self {
        Self::with_options(store, invoker, ChainOptions::default())
    }

    pub fn with_options(store: FixtureStore, invoker: I, options: ChainOptions) -> Self {
        Self {
            store,
            invoker,
            options,
        }
    }

    /// Store rooted at `config.fixture_dir`, options from [`chain_options`].
    pub fn from_config(config: &Config, invoker: I) -> Self {
        Self::with_options(
            FixtureStore::new(config.fixture_dir.clone()),
            invoker,
            chain_options(config),
        )
    }

    pub fn store_mut(&mut self) -> &mut FixtureStore {
        &mut self.store
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    pub fn into_invoker(self) -> I {
        self.invoker
    }

    /// Run every case of `procedure` in `fixture_set`, optionally restricted
    /// to one category.
    ///
    /// Fails only when the category is unknown or the fixture set cannot be
    /// loaded. A procedure or category without cases yields an empty report
    /// carrying a note.
    pub fn run(
        &mut self,
        procedure: &str,
        category: Option<&str>,
        fixture_set: &str,
    ) -> HarnessResult<RunReport> {
        let category = category.map(str::parse::<CaseType>).transpose()?;
        let set = self.store.load(fixture_set)?;

        let Some(cases) = set.cases_for(procedure) else {
            let note = format!(
                "No test cases found for SP '{procedure}' in {}",
                file_name(fixture_set)
            );
            warn!("{note}");
            return Ok(RunReport::empty(procedure, fixture_set, note));
        };

        let selected: Vec<&TestCase> = cases
            .iter()
            .filter(|case| category.is_none_or(|ty| case.case_type == ty))
            .collect();
        if let (Some(ty), true) = (category, selected.is_empty()) {
            let note = format!("No '{ty}' test cases found for SP '{procedure}'");
            warn!("{note}");
            return Ok(RunReport::empty(procedure, fixture_set, note));
        }

        info!(procedure, count = selected.len(), "running test cases");
        let mut reports = Vec::with_capacity(selected.len());
        for (idx, case) in selected.into_iter().enumerate() {
            let span = info_span!("case", case_id = %case.case_id, case_type = %case.case_type);
            let _guard = span.enter();

            let outcome = self.run_case(procedure, case);
            if outcome.passed() {
                info!("case passed");
            } else {
                warn!("case failed");
            }
            reports.push(CaseReport {
                index: idx + 1,
                case_id: case.case_id.clone(),
                case_type: case.case_type,
                description: case.description.clone(),
                outcome,
            });
        }

        Ok(RunReport {
            procedure: procedure.to_string(),
            fixture_set: fixture_set.to_string(),
            cases: reports,
            note: None,
        })
    }

    fn run_case(&mut self, procedure: &str, case: &TestCase) -> CaseOutcome {
        match &case.payload {
            CasePayload::Single(params) => {
                info!(procedure, "executing single call");
                let result = self
                    .invoker
                    .invoke(procedure, params)
                    .map_err(|err| err.to_string())
                    .and_then(|result| {
                        self.options
                            .status_policy
                            .check(&result)
                            .map(|()| result)
                            .map_err(|err| err.to_string())
                    });
                CaseOutcome::Single(result)
            }
            CasePayload::Chain(steps) => {
                info!(steps = steps.len(), "executing chained test");
                let mut executor = ChainExecutor::with_options(&mut self.invoker, self.options.clone());
                CaseOutcome::Chain(executor.execute_chain(steps))
            }
        }
    }
}

fn file_name(fixture_set: &str) -> String {
    if fixture_set.ends_with(".json") {
        fixture_set.to_string()
    } else {
        format!("{fixture_set}.json")
    }
}
