#[cfg(test)]
mod tests;

pub mod logging;
pub mod pretty;

use indexmap::IndexMap;
use pretty::TableStyleKind;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, env, io, path::PathBuf};
use thiserror::Error;
use types::Value;

/// Named procedure parameters in binding order.
/// Examples:
/// - `let p = Params::from([("name".into(), Value::Text("A".into()))]);`
/// - `let p = Params::from([("@id".into(), Value::Int(42)), ("@active".into(), Value::Bool(true))]);`
pub type Params = IndexMap<String, Value>;

/// Output parameters returned by a procedure, keyed by parameter name.
pub type OutputParams = BTreeMap<String, Value>;

/// Named projection of a row keyed by column name.
/// Examples:
/// - `let map = RowMap::from([("id".into(), Value::Int(1))]);`
/// - `let map = RowMap::from([("status".into(), Value::Int(0)), ("message".into(), Value::Text("dup".into()))]);`
pub type RowMap = BTreeMap<String, Value>;

/// Positional row representation backed by `types::Value`.
/// Examples:
/// - `let row = Row::new(vec![Value::Int(1)]);`
/// - `let row = Row::new(vec![Value::Int(1), Value::Text("Saved".into()), Value::Int(42)]);`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row::new(values)
    }
}

/// Rectangular result set carrying column labels and rows.
/// Examples:
/// - `let rb = RecordBatch { columns: vec!["id".into()], rows: vec![Row::new(vec![Value::Int(1)])] };`
/// - `let rb = RecordBatch { columns: vec!["intStatus".into(), "strMessage".into()], rows: vec![] };`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordBatch {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl RecordBatch {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col == name)
    }

    /// Zip every row with the column labels. Rows longer than the header keep
    /// only the labelled prefix.
    pub fn row_maps(&self) -> Vec<RowMap> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.values.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

/// What a single stored-procedure call produced.
///
/// `result_set` is `None` when the procedure produced no result set at all
/// and `Some` (possibly with zero rows) when it did. Output parameters travel
/// separately so callers never have to guess which shape they received.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_set: Option<RecordBatch>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: OutputParams,
}

impl InvocationResult {
    /// A call that returned neither rows nor output parameters.
    pub fn no_result() -> Self {
        Self::default()
    }

    pub fn with_rows(batch: RecordBatch) -> Self {
        Self {
            result_set: Some(batch),
            outputs: OutputParams::new(),
        }
    }

    pub fn with_output(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.outputs.insert(name.into(), value.into());
        self
    }

    pub fn has_result_set(&self) -> bool {
        self.result_set.is_some()
    }

    /// Rows of the result set; empty when there was none.
    pub fn rows(&self) -> &[Row] {
        self.result_set
            .as_ref()
            .map(|batch| batch.rows.as_slice())
            .unwrap_or_default()
    }

    pub fn columns(&self) -> &[String] {
        self.result_set
            .as_ref()
            .map(|batch| batch.columns.as_slice())
            .unwrap_or_default()
    }

    pub fn row_count(&self) -> usize {
        self.rows().len()
    }

    pub fn row_maps(&self) -> Vec<RowMap> {
        self.result_set
            .as_ref()
            .map(RecordBatch::row_maps)
            .unwrap_or_default()
    }

    pub fn named_outputs(&self) -> &OutputParams {
        &self.outputs
    }

    pub fn output(&self, name: &str) -> Option<&Value> {
        self.outputs.get(name)
    }

    /// Value of `column` in the first row, if both exist.
    pub fn first_row_value(&self, column: &str) -> Option<&Value> {
        let batch = self.result_set.as_ref()?;
        let idx = batch.column_index(column)?;
        batch.rows.first()?.get(idx)
    }
}

/// Canonical error type for setup failures across the harness.
///
/// Runtime failures inside a chain never surface as `HarnessError`; they are
/// reported through the chain outcome instead.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("fixture: {0}")]
    Fixture(String),
    #[error("config: {0}")]
    Config(String),
    #[error("invoke: {0}")]
    Invocation(String),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl HarnessError {
    /// The bare message without the category prefix.
    pub fn message(&self) -> String {
        match self {
            HarnessError::Fixture(msg)
            | HarnessError::Config(msg)
            | HarnessError::Invocation(msg) => msg.clone(),
            HarnessError::Json(err) => err.to_string(),
            HarnessError::Io(err) => err.to_string(),
        }
    }
}

/// Result alias that carries a `HarnessError`.
pub type HarnessResult<T> = Result<T, HarnessError>;

pub const ENV_FIXTURE_DIR: &str = "SP_HARNESS_FIXTURE_DIR";
pub const ENV_LOG: &str = "SP_HARNESS_LOG";
pub const ENV_STATUS_ROW: &str = "SP_HARNESS_STATUS_ROW";
pub const ENV_INHERIT: &str = "SP_HARNESS_INHERIT";

/// Runtime configuration for the harness.
///
/// # Example
/// ```
/// use common::Config;
/// use std::path::PathBuf;
///
/// let config = Config::builder()
///     .fixture_dir(PathBuf::from("./fixtures"))
///     .status_row(true)
///     .build();
/// assert_eq!(config.log_level, "info");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, bon::Builder)]
pub struct Config {
    /// Directory holding `<fixture set>.json` files.
    #[builder(default = PathBuf::from("tests/test_data"))]
    pub fixture_dir: PathBuf,
    /// Default `tracing` filter directive; `RUST_LOG` overrides it.
    #[builder(default = "info".to_string(), into)]
    pub log_level: String,
    /// Table style used when rendering reports.
    #[builder(default)]
    pub table_style: TableStyleKind,
    /// Treat the first result row as `(status, message, ..)` and fail steps
    /// whose status is zero.
    #[builder(default = false)]
    pub status_row: bool,
    /// Chain steps after the first start from the first step's parameters.
    #[builder(default = false)]
    pub inherit_base_parameters: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fixture_dir: PathBuf::from("tests/test_data"),
            log_level: "info".to_string(),
            table_style: TableStyleKind::default(),
            status_row: false,
            inherit_base_parameters: false,
        }
    }
}

impl Config {
    /// Defaults overlaid with the `SP_HARNESS_*` environment variables.
    pub fn from_env() -> HarnessResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> HarnessResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(dir) = lookup(ENV_FIXTURE_DIR).filter(|v| !v.trim().is_empty()) {
            config.fixture_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            config.log_level = level;
        }
        if let Some(raw) = lookup(ENV_STATUS_ROW) {
            config.status_row = parse_flag(ENV_STATUS_ROW, &raw)?;
        }
        if let Some(raw) = lookup(ENV_INHERIT) {
            config.inherit_base_parameters = parse_flag(ENV_INHERIT, &raw)?;
        }
        Ok(config)
    }
}

fn parse_flag(name: &str, raw: &str) -> HarnessResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(HarnessError::Config(format!(
            "{name} must be a boolean flag, got '{other}'"
        ))),
    }
}

/// Convenient re-exports for downstream crates.
pub mod prelude {
    pub use crate::{
        Config, HarnessError, HarnessResult, InvocationResult, OutputParams, Params, RecordBatch,
        Row, RowMap,
    };
    pub use types::{SqlType, Value};
}
