use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};

/// Declared SQL type of a stored-procedure parameter.
///
/// Built from `INFORMATION_SCHEMA.PARAMETERS.DATA_TYPE`; only the families the
/// parameter normalizer cares about get their own variant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    Int,
    Float,
    Decimal,
    Bit,
    Varchar,
    NVarchar,
    Date,
    DateTime,
    Time,
    Other(String),
}

impl SqlType {
    /// Map a catalog data type name (any case) to its family.
    pub fn from_metadata(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        match upper.as_str() {
            "INT" | "BIGINT" | "SMALLINT" | "TINYINT" => SqlType::Int,
            "FLOAT" | "REAL" => SqlType::Float,
            "DECIMAL" | "NUMERIC" | "MONEY" | "SMALLMONEY" => SqlType::Decimal,
            "BIT" => SqlType::Bit,
            "VARCHAR" | "CHAR" => SqlType::Varchar,
            "NVARCHAR" | "NCHAR" => SqlType::NVarchar,
            "DATE" => SqlType::Date,
            "DATETIME" | "DATETIME2" | "SMALLDATETIME" | "DATETIMEOFFSET" => SqlType::DateTime,
            "TIME" => SqlType::Time,
            _ => SqlType::Other(upper),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, SqlType::Int)
    }
}

/// Scalar carried by fixture parameters, result rows and output parameters.
///
/// Serialized untagged so fixture JSON stays plain: `42`, `1.5`, `"text"`,
/// `true`, `null`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Truthiness used for status columns: non-zero numbers and `true` hold,
    /// everything else (including NULL and text) does not.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::Text(_) | Value::Null => false,
        }
    }

    pub fn cmp_same_type(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
            Value::Null => f.write_str("NULL"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}
