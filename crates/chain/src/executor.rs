use crate::{
    outcome::{ChainError, ChainOutcome, StepResults},
    template::ParamTemplate,
    variables::ChainVariables,
};
use common::{InvocationResult, Params};
use fixtures::Step;
use invoker::ProcedureInvoker;
use tracing::{debug, error, info, info_span, warn};
use types::Value;

/// How a returned call is judged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Only an invoker error fails a step.
    #[default]
    InvocationOnly,
    /// The first result row carries `(status, message)`; a status whose
    /// integer value is 0 (including false and NULL) fails the step, as does
    /// one that is not numeric.
    StatusRow {
        status_column: usize,
        message_column: usize,
    },
}

impl StatusPolicy {
    /// Status in column 0, message in column 1.
    pub fn status_row() -> Self {
        StatusPolicy::StatusRow {
            status_column: 0,
            message_column: 1,
        }
    }

    /// Judge a returned call. Always `Ok` under [`StatusPolicy::InvocationOnly`].
    pub fn check(self, result: &InvocationResult) -> Result<(), ChainError> {
        let StatusPolicy::StatusRow {
            status_column,
            message_column,
        } = self
        else {
            return Ok(());
        };

        let Some(row) = result.rows().first() else {
            return Err(ChainError::StatusRejected {
                status: Value::Null,
                message: "no result rows returned from procedure".into(),
            });
        };
        let (Some(status), Some(message)) = (row.get(status_column), row.get(message_column))
        else {
            return Err(ChainError::StatusRejected {
                status: row.get(status_column).cloned().unwrap_or(Value::Null),
                message: "result row has insufficient columns".into(),
            });
        };

        match status_code(status) {
            Some(code) if code != 0 => {
                debug!(%status, %message, "status row accepted");
                Ok(())
            }
            Some(_) => Err(ChainError::StatusRejected {
                status: status.clone(),
                message: message.to_string(),
            }),
            None => Err(ChainError::StatusRejected {
                status: status.clone(),
                message: format!("non-numeric status '{status}': {message}"),
            }),
        }
    }
}

/// Integer reading of a status cell: numeric text is parsed, floats keep only
/// their whole part and NULL counts as 0. `None` when nothing numeric is there.
fn status_code(status: &Value) -> Option<i64> {
    let whole = |f: f64| f.is_finite().then(|| f.trunc() as i64);
    match status {
        Value::Null => Some(0),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Int(v) => Some(*v),
        Value::Float(f) => whole(*f),
        Value::Text(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(whole))
        }
    }
}

/// Knobs for a chain run.
#[derive(Clone, Debug, Default, PartialEq, bon::Builder)]
pub struct ChainOptions {
    #[builder(default)]
    pub status_policy: StatusPolicy,
    /// Steps after the first start from the first step's resolved parameters
    /// and override them with their own.
    #[builder(default = false)]
    pub inherit_base_parameters: bool,
}

/// Runs chains of stored-procedure calls against one invoker.
///
/// Steps run strictly in sequence. The first failure stops the chain; earlier
/// side effects are not rolled back.
#[derive(Debug)]
pub struct ChainExecutor<I> {
    invoker: I,
    options: ChainOptions,
}

impl<I: ProcedureInvoker> ChainExecutor<I> {
    pub fn new(invoker: I) -> Self {
        Self::with_options(invoker, ChainOptions::default())
    }

    pub fn with_options(invoker: I, options: ChainOptions) -> Self {
        Self { invoker, options }
    }

    pub fn options(&self) -> &ChainOptions {
        &self.options
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    pub fn into_invoker(self) -> I {
        self.invoker
    }

    /// Execute `steps` in order and report how far the chain got.
    ///
    /// Never fails: resolution and invocation errors end up in the returned
    /// outcome together with the variables and results gathered so far.
    pub fn execute_chain(&mut self, steps: &[Step]) -> ChainOutcome {
        let span = info_span!("chain", steps = steps.len());
        let _guard = span.enter();

        let mut run = ChainRun::default();
        for (idx, step) in steps.iter().enumerate() {
            let position = idx + 1;
            if let Err(err) = self.run_step(&mut run, position, step) {
                error!(step = step.step, procedure = %step.sp_name, error = %err, "chain step failed");
                return ChainOutcome::failed(
                    position,
                    err,
                    run.variables.into_inner(),
                    run.results,
                );
            }
        }

        info!(
            variables = run.variables.len(),
            "chain execution completed successfully"
        );
        ChainOutcome::succeeded(run.variables.into_inner(), run.results)
    }

    fn run_step(
        &mut self,
        run: &mut ChainRun,
        position: usize,
        step: &Step,
    ) -> Result<(), ChainError> {
        let span = info_span!("step", step = step.step, procedure = %step.sp_name);
        let _guard = span.enter();
        info!("executing step");

        let params = self.resolve_parameters(run, step)?;
        info!(
            count = params.len(),
            names = ?params.keys().collect::<Vec<_>>(),
            "resolved parameters"
        );
        debug!(?params, "parameter values");

        let result = self
            .invoker
            .invoke(&step.sp_name, &params)
            .map_err(|err| ChainError::Invocation {
                procedure: step.sp_name.clone(),
                message: err.message,
            })?;
        run.results.insert(position, result);
        let result = &run.results[&position];

        self.options.status_policy.check(result)?;

        let captured = capture_outputs(step, result)?;
        for (variable, value) in captured {
            debug!(variable = %variable, %value, "captured output");
            if let Some(old) = run.variables.set(variable.clone(), value) {
                debug!(variable = %variable, %old, "overwrote chain variable");
            }
        }
        if !step.output_mapping.is_empty() {
            info!(chain_data = ?run.variables, "chain data after extraction");
        }

        if position == 1 && self.options.inherit_base_parameters {
            debug!(count = params.len(), "stored base parameters");
            run.base = Some(params);
        }

        info!("step completed successfully");
        Ok(())
    }

    fn resolve_parameters(&self, run: &ChainRun, step: &Step) -> Result<Params, ChainError> {
        let mut params = match (&run.base, self.options.inherit_base_parameters) {
            (Some(base), true) => base.clone(),
            _ => Params::new(),
        };

        for (name, value) in &step.parameters {
            let resolved = match ParamTemplate::parse(value) {
                ParamTemplate::Literal(literal) => literal.clone(),
                ParamTemplate::Variable(variable) => lookup(&run.variables, name, variable)?,
            };
            params.insert(name.clone(), resolved);
        }

        for (name, variable) in &step.input_mapping {
            let value = lookup(&run.variables, name, variable)?;
            debug!(param = %name, variable = %variable, %value, "applied input mapping");
            params.insert(name.clone(), value);
        }

        Ok(params)
    }
}

/// Execute a chain with default options against `invoker`.
pub fn execute_chain<I: ProcedureInvoker>(invoker: &mut I, steps: &[Step]) -> ChainOutcome {
    ChainExecutor::new(invoker).execute_chain(steps)
}

#[derive(Default)]
struct ChainRun {
    variables: ChainVariables,
    results: StepResults,
    base: Option<Params>,
}

fn lookup(variables: &ChainVariables, parameter: &str, name: &str) -> Result<Value, ChainError> {
    variables.get(name).cloned().ok_or_else(|| {
        warn!(
            variable = name,
            available = ?variables.names().collect::<Vec<_>>(),
            "chain variable not found"
        );
        ChainError::MissingVariable {
            parameter: parameter.to_string(),
            name: name.to_string(),
        }
    })
}

/// Resolve every output mapping of `step` before any variable is written, so
/// a missing output leaves the store untouched.
fn capture_outputs(
    step: &Step,
    result: &InvocationResult,
) -> Result<Vec<(String, Value)>, ChainError> {
    step.output_mapping
        .iter()
        .map(|(output, variable)| {
            find_output(result, output)
                .cloned()
                .map(|value| (variable.clone(), value))
                .ok_or_else(|| ChainError::MissingOutput {
                    procedure: step.sp_name.clone(),
                    output: output.clone(),
                })
        })
        .collect()
}

/// Named outputs first, then the first row's column of the same name. Both
/// lookups accept the name with or without a leading `@`.
pub fn find_output<'r>(result: &'r InvocationResult, output: &str) -> Option<&'r Value> {
    let bare = output.strip_prefix('@').unwrap_or(output);
    let prefixed = format!("@{bare}");
    let candidates = [output, bare, prefixed.as_str()];

    candidates
        .iter()
        .find_map(|name| result.output(name))
        .or_else(|| {
            candidates
                .iter()
                .find_map(|name| result.first_row_value(name))
        })
}
