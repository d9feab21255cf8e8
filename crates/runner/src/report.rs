use chain::ChainOutcome;
use common::{
    InvocationResult, Row,
    pretty::{self, TableStyleKind},
};
use fixtures::CaseType;
use serde::Serialize;
use tabled::Tabled;

const RULE_WIDTH: usize = 80;

/// What running one case produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOutcome {
    /// Single call: the result, or the invoker's (or status row's) message.
    Single(Result<InvocationResult, String>),
    Chain(ChainOutcome),
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        match self {
            CaseOutcome::Single(result) => result.is_ok(),
            CaseOutcome::Chain(outcome) => outcome.success,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CaseReport {
    /// 1-based index among the selected cases.
    pub index: usize,
    pub case_id: String,
    pub case_type: CaseType,
    pub description: String,
    pub outcome: CaseOutcome,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        self.outcome.passed()
    }
}

/// Outcome of [`crate::CaseSelector::run`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunReport {
    pub procedure: String,
    pub fixture_set: String,
    pub cases: Vec<CaseReport>,
    /// Set when nothing was selected, explaining why.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RunReport {
    pub fn empty(procedure: &str, fixture_set: &str, note: String) -> Self {
        Self {
            procedure: procedure.to_string(),
            fixture_set: fixture_set.to_string(),
            cases: Vec::new(),
            note: Some(note),
        }
    }

    /// True when no selected case failed. An empty report passes.
    pub fn passed(&self) -> bool {
        self.cases.iter().all(CaseReport::passed)
    }

    pub fn passed_count(&self) -> usize {
        self.cases.iter().filter(|case| case.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.cases.len() - self.passed_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|case| !case.passed())
    }
}

#[derive(Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "#")]
    index: usize,
    case: String,
    #[tabled(rename = "type")]
    case_type: String,
    result: String,
}

/// Console rendering of a run.
pub fn render(report: &RunReport, style: TableStyleKind) -> String {
    if let Some(note) = &report.note {
        return note.clone();
    }

    let rule = "=".repeat(RULE_WIDTH);
    let total = report.cases.len();
    let mut lines = vec![format!(
        "Found {total} test case(s) for {}",
        report.procedure
    )];

    for case in &report.cases {
        lines.push(String::new());
        lines.push(rule.clone());
        lines.push(format!("[{}/{total}] Case: {}", case.index, case.case_id));
        lines.push(format!("Type: {}", case.case_type));
        lines.push(format!("Description: {}", case.description));
        lines.push(rule.clone());

        match &case.outcome {
            CaseOutcome::Single(result) => {
                lines.push(format!("Executing {} (single)...", report.procedure));
                render_single(&mut lines, result, style);
            }
            CaseOutcome::Chain(outcome) => render_chain(&mut lines, outcome, style, &rule),
        }
    }

    let summary: Vec<SummaryRow> = report
        .cases
        .iter()
        .map(|case| SummaryRow {
            index: case.index,
            case: case.case_id.clone(),
            case_type: case.case_type.to_string(),
            result: if case.passed() { "PASS" } else { "FAIL" }.to_string(),
        })
        .collect();
    lines.push(String::new());
    lines.push(pretty::render_structured_rows(&summary, style));
    lines.push(format!(
        "{} passed, {} failed",
        report.passed_count(),
        report.failed_count()
    ));

    lines.join("\n")
}

fn render_single(
    lines: &mut Vec<String>,
    result: &Result<InvocationResult, String>,
    style: TableStyleKind,
) {
    match result {
        Ok(result) if result.row_count() > 0 || !result.outputs.is_empty() => {
            lines.push(format!("[OK] Results ({} rows):", result.row_count()));
            lines.push(pretty::render_invocation(result, style));
        }
        Ok(_) => lines.push("[OK] No results returned (OK if SP has no SELECT output)".into()),
        Err(message) => lines.push(format!("[FAIL] Error: {message}")),
    }
}

fn render_chain(
    lines: &mut Vec<String>,
    outcome: &ChainOutcome,
    style: TableStyleKind,
    rule: &str,
) {
    if outcome.success {
        lines.push(format!(
            "[SUCCESS] Chain execution completed ({} steps)",
            outcome.executed_steps()
        ));
        lines.push("Chain data (extracted/passed between steps):".into());
        lines.push(chain_data_table(outcome, style));
        return;
    }

    lines.push("[FAILED] CHAIN EXECUTION FAILED".into());
    if let Some(step) = outcome.failed_step {
        lines.push(format!("Failed at: STEP {step}"));
    }
    if let Some(message) = outcome.error_message() {
        lines.push(format!("Error: {message}"));
    }

    if !outcome.partial_results.is_empty() {
        lines.push("Partial results (steps that returned before the failure):".into());
        for (position, result) in &outcome.partial_results {
            lines.push(format!("  step_{position}:"));
            let status_lines: Vec<String> =
                result.rows().iter().filter_map(status_line).collect();
            if status_lines.is_empty() {
                lines.push(pretty::render_invocation(result, style));
            } else {
                lines.extend(status_lines);
            }
        }
    }

    lines.push("Chain data collected before failure:".into());
    lines.push(chain_data_table(outcome, style));
    lines.push(rule.to_string());
}

fn chain_data_table(outcome: &ChainOutcome, style: TableStyleKind) -> String {
    if outcome.chain_data.is_empty() {
        "  (no data extracted)".into()
    } else {
        pretty::render_key_values(&outcome.chain_data, style)
    }
}

/// `[OK]`/`[FAIL]` line for rows shaped like `(status, message, ..)`.
fn status_line(row: &Row) -> Option<String> {
    let (status, message) = (row.get(0)?, row.get(1)?);
    if status.as_int().is_none() && status.as_bool().is_none() {
        return None;
    }
    let icon = if status.is_truthy() { "[OK]" } else { "[FAIL]" };
    Some(format!("    {icon} Status: {status}\n    {message}"))
}
