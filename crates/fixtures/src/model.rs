use common::{HarnessError, HarnessResult, Params};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Mapping from one name to another, in fixture order.
pub type NameMapping = IndexMap<String, String>;

/// Closed classification of a test case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CaseType {
    Positive,
    Negative,
    Edge,
}

impl CaseType {
    pub const ALL: [CaseType; 3] = [CaseType::Positive, CaseType::Negative, CaseType::Edge];

    pub fn as_str(self) -> &'static str {
        match self {
            CaseType::Positive => "POSITIVE",
            CaseType::Negative => "NEGATIVE",
            CaseType::Edge => "EDGE",
        }
    }
}

impl FromStr for CaseType {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        CaseType::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                HarnessError::Config(format!(
                    "unknown case type '{trimmed}' (expected POSITIVE, NEGATIVE or EDGE)"
                ))
            })
    }
}

impl TryFrom<String> for CaseType {
    type Error = HarnessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CaseType> for String {
    fn from(value: CaseType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for CaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element of a chain.
///
/// The position in the chain decides execution order; `step` is only the
/// label used in diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Step {
    pub step: usize,
    pub sp_name: String,
    pub parameters: Params,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub input_mapping: NameMapping,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub output_mapping: NameMapping,
}

impl Step {
    pub fn new(step: usize, sp_name: impl Into<String>) -> Self {
        Self {
            step,
            sp_name: sp_name.into(),
            parameters: Params::new(),
            input_mapping: NameMapping::new(),
            output_mapping: NameMapping::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<types::Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn input(mut self, param: impl Into<String>, variable: impl Into<String>) -> Self {
        self.input_mapping.insert(param.into(), variable.into());
        self
    }

    pub fn output(mut self, output: impl Into<String>, variable: impl Into<String>) -> Self {
        self.output_mapping.insert(output.into(), variable.into());
        self
    }
}

/// How a case is executed.
#[derive(Clone, Debug, PartialEq)]
pub enum CasePayload {
    /// One direct call of the case's procedure.
    Single(Params),
    /// An ordered chain of calls.
    Chain(Vec<Step>),
}

/// One unit of validation, immutable once loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct TestCase {
    pub case_id: String,
    pub case_type: CaseType,
    pub description: String,
    pub payload: CasePayload,
}

impl TestCase {
    pub fn parameters(&self) -> Option<&Params> {
        match &self.payload {
            CasePayload::Single(params) => Some(params),
            CasePayload::Chain(_) => None,
        }
    }

    pub fn chain_config(&self) -> Option<&[Step]> {
        match &self.payload {
            CasePayload::Chain(steps) => Some(steps),
            CasePayload::Single(_) => None,
        }
    }

    pub fn is_chain(&self) -> bool {
        matches!(self.payload, CasePayload::Chain(_))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawStep {
    step: Option<usize>,
    sp_name: Option<String>,
    #[serde(default)]
    parameters: Params,
    #[serde(default)]
    input_mapping: NameMapping,
    #[serde(default)]
    output_mapping: NameMapping,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawCase {
    case_id: Option<String>,
    case_type: Option<String>,
    #[serde(default)]
    description: Option<String>,
    parameters: Option<Params>,
    chain_config: Option<Vec<RawStep>>,
}

impl RawCase {
    /// Validate one case of `procedure`. Missing required fields are fixture
    /// errors; a bad payload shape or category is a configuration error.
    pub(crate) fn validate(self, procedure: &str, position: usize) -> HarnessResult<TestCase> {
        let case_id = self.case_id.filter(|id| !id.trim().is_empty()).ok_or_else(|| {
            HarnessError::Fixture(format!(
                "case #{position} of '{procedure}' is missing case_id"
            ))
        })?;
        let raw_type = self.case_type.ok_or_else(|| {
            HarnessError::Fixture(format!(
                "case '{case_id}' of '{procedure}' is missing case_type"
            ))
        })?;
        let case_type = raw_type.parse::<CaseType>().map_err(|err| {
            HarnessError::Config(format!("case '{case_id}' of '{procedure}': {}", err.message()))
        })?;

        let payload = match (self.parameters, self.chain_config) {
            (Some(params), None) => CasePayload::Single(params),
            (None, Some(steps)) => CasePayload::Chain(validate_steps(steps, procedure, &case_id)?),
            (None, None) => {
                return Err(HarnessError::Config(format!(
                    "case '{case_id}' of '{procedure}' has neither parameters nor chain_config"
                )));
            }
            (Some(_), Some(_)) => {
                return Err(HarnessError::Config(format!(
                    "case '{case_id}' of '{procedure}' has both parameters and chain_config"
                )));
            }
        };

        Ok(TestCase {
            case_id,
            case_type,
            description: self.description.unwrap_or_default(),
            payload,
        })
    }
}

fn validate_steps(raw: Vec<RawStep>, procedure: &str, case_id: &str) -> HarnessResult<Vec<Step>> {
    if raw.is_empty() {
        return Err(HarnessError::Config(format!(
            "case '{case_id}' of '{procedure}' has an empty chain_config"
        )));
    }
    raw.into_iter()
        .enumerate()
        .map(|(idx, step)| {
            let position = idx + 1;
            let sp_name = step.sp_name.filter(|n| !n.trim().is_empty()).ok_or_else(|| {
                HarnessError::Fixture(format!(
                    "step {position} of case '{case_id}' is missing sp_name"
                ))
            })?;
            Ok(Step {
                step: step.step.unwrap_or(position),
                sp_name,
                parameters: step.parameters,
                input_mapping: step.input_mapping,
                output_mapping: step.output_mapping,
            })
        })
        .collect()
}
