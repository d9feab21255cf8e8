use crate::{InvokeError, ProcedureInvoker};
use common::{HarnessError, HarnessResult, InvocationResult, Params};
use regex::Regex;
use std::{collections::BTreeMap, sync::LazyLock};
use tracing::{debug, warn};
use types::{SqlType, Value};

/// Declared parameter types of one procedure, keyed by parameter name.
pub type TypeMappings = BTreeMap<String, SqlType>;

static DATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}/\d{2,4}|[A-Za-z]{3}\s+\d{1,2}\s+\d{4})")
        .expect("date prefix pattern is valid")
});

/// True for strings that start like a date (`1900-01-01`, `1/1/1900`,
/// `Jan 1 1900`), with or without a trailing time part.
pub fn looks_like_date(value: &str) -> bool {
    DATE_PREFIX.is_match(value.trim())
}

/// Adjust one value to the declared SQL type of its parameter.
///
/// Without a declared type the value passes through untouched. Values are
/// only reformatted, never coerced across families: a string that does not
/// parse as a number stays a string and the database reports the mismatch.
pub fn normalize_value(name: &str, value: &Value, sql_type: Option<&SqlType>) -> Value {
    let Some(sql_type) = sql_type else {
        return value.clone();
    };
    if value.is_null() {
        return Value::Null;
    }

    match sql_type {
        SqlType::Date | SqlType::DateTime => match value {
            // 0 is the conventional "unset" marker for date parameters.
            Value::Int(0) => Value::Null,
            other => other.clone(),
        },
        SqlType::Int => match value {
            Value::Text(text) => {
                let trimmed = text.trim();
                if looks_like_date(trimmed) {
                    debug!(param = name, "date string bound to integer parameter left as-is");
                    return value.clone();
                }
                if trimmed.is_empty() {
                    return Value::Int(0);
                }
                match trimmed.parse::<f64>().ok().and_then(whole_i64) {
                    Some(parsed) => Value::Int(parsed),
                    None => {
                        warn!(param = name, value = %text, "cannot convert string to int, passing as-is");
                        value.clone()
                    }
                }
            }
            Value::Bool(b) => Value::Int(i64::from(*b)),
            Value::Float(f) => match whole_i64(*f) {
                Some(parsed) => Value::Int(parsed),
                None => {
                    warn!(param = name, value = %f, "float outside int range, passing as-is");
                    value.clone()
                }
            },
            other => other.clone(),
        },
        SqlType::Bit => match value {
            Value::Text(text) if text.trim().is_empty() => Value::Int(0),
            Value::Text(text) => match text.trim().parse::<i64>() {
                Ok(parsed) => Value::Int(i64::from(parsed != 0)),
                Err(_) => value.clone(),
            },
            Value::Bool(b) => Value::Int(i64::from(*b)),
            Value::Int(v) => Value::Int(i64::from(*v != 0)),
            other => other.clone(),
        },
        SqlType::Decimal => match value {
            Value::Text(text) if text.trim().is_empty() => Value::Int(0),
            other => other.clone(),
        },
        SqlType::Float
        | SqlType::Varchar
        | SqlType::NVarchar
        | SqlType::Time
        | SqlType::Other(_) => value.clone(),
    }
}

/// Whole part of `value` when it fits an `i64`.
fn whole_i64(value: f64) -> Option<i64> {
    // 2^63; `i64::MAX as f64` rounds up to it.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    let whole = value.trunc();
    (whole.is_finite() && (-LIMIT..LIMIT).contains(&whole)).then_some(whole as i64)
}

/// Normalize every parameter that has a declared type, keeping binding order.
pub fn normalize_parameters(params: &Params, mappings: &TypeMappings) -> Params {
    params
        .iter()
        .map(|(name, value)| {
            let normalized = normalize_value(name, value, mappings.get(name));
            if &normalized != value {
                debug!(param = %name, from = ?value, to = ?normalized, "normalized parameter");
            }
            (name.clone(), normalized)
        })
        .collect()
}

/// Source of declared parameter types, e.g. `INFORMATION_SCHEMA.PARAMETERS`.
pub trait ParameterMetadata {
    fn type_mappings(&mut self, procedure: &str) -> Result<TypeMappings, InvokeError>;
}

/// Parameter types known up front, per procedure.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StaticMetadata {
    procedures: BTreeMap<String, TypeMappings>,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_procedure<I, K>(mut self, procedure: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = (K, SqlType)>,
        K: Into<String>,
    {
        self.procedures.insert(
            procedure.into(),
            params.into_iter().map(|(k, ty)| (k.into(), ty)).collect(),
        );
        self
    }

    /// Parse `{"usp_X": {"@id": "int", "@when": "datetime2"}}`.
    pub fn from_json_str(json: &str) -> HarnessResult<Self> {
        let raw: BTreeMap<String, BTreeMap<String, String>> = serde_json::from_str(json)
            .map_err(|err| HarnessError::Config(format!("invalid parameter metadata: {err}")))?;
        let procedures = raw
            .into_iter()
            .map(|(procedure, params)| {
                let mappings = params
                    .into_iter()
                    .map(|(name, ty)| (name, SqlType::from_metadata(&ty)))
                    .collect();
                (procedure, mappings)
            })
            .collect();
        Ok(Self { procedures })
    }
}

impl ParameterMetadata for StaticMetadata {
    fn type_mappings(&mut self, procedure: &str) -> Result<TypeMappings, InvokeError> {
        Ok(self.procedures.get(procedure).cloned().unwrap_or_default())
    }
}

/// Wraps an invoker and normalizes parameters against declared types first.
///
/// Metadata lookup failures are logged and the call proceeds with the raw
/// parameters.
#[derive(Debug)]
pub struct NormalizingInvoker<I, M> {
    inner: I,
    metadata: M,
}

impl<I, M> NormalizingInvoker<I, M> {
    pub fn new(inner: I, metadata: M) -> Self {
        Self { inner, metadata }
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }

    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: ProcedureInvoker, M: ParameterMetadata> ProcedureInvoker for NormalizingInvoker<I, M> {
    fn invoke(&mut self, procedure: &str, params: &Params) -> Result<InvocationResult, InvokeError> {
        let mappings = match self.metadata.type_mappings(procedure) {
            Ok(mappings) => mappings,
            Err(err) => {
                warn!(procedure, error = %err, "failed to fetch parameter metadata");
                TypeMappings::new()
            }
        };
        if mappings.is_empty() {
            debug!(procedure, "no parameter metadata, binding values unchanged");
        }
        let normalized = normalize_parameters(params, &mappings);
        self.inner.invoke(procedure, &normalized)
    }
}
