//! Console tables for invocation results and chain variables.

use crate::{InvocationResult, RecordBatch};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};
use tabled::{Table, Tabled, builder::Builder, settings::Style};
use types::Value;

const EMPTY: &str = "<empty>";

/// Report table styles selectable from config and the command line.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStyleKind {
    #[default]
    Modern,
    Ascii,
    Plain,
}

impl TableStyleKind {
    fn finish(self, mut table: Table) -> String {
        match self {
            Self::Modern => table.with(Style::modern()),
            Self::Ascii => table.with(Style::ascii()),
            Self::Plain => table.with(Style::blank()),
        };
        table.to_string()
    }
}

impl FromStr for TableStyleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        [Self::Modern, Self::Ascii, Self::Plain]
            .into_iter()
            .find(|style| style.to_string().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown table style '{wanted}'"))
    }
}

impl fmt::Display for TableStyleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Modern => "modern",
            Self::Ascii => "ascii",
            Self::Plain => "plain",
        })
    }
}

/// Result rows under their column labels. Columns the procedure left unnamed
/// are labelled by position.
pub fn render_result_set(batch: &RecordBatch, style: TableStyleKind) -> String {
    if batch.rows.is_empty() {
        return EMPTY.into();
    }

    let width = batch
        .rows
        .iter()
        .map(|row| row.values.len())
        .max()
        .unwrap_or_default()
        .max(batch.columns.len());
    let header = (0..width).map(|idx| match batch.columns.get(idx) {
        Some(name) if !name.is_empty() => name.clone(),
        _ => format!("col{}", idx + 1),
    });

    let mut builder = Builder::default();
    builder.push_record(header);
    for row in &batch.rows {
        builder.push_record(row.values.iter().map(format_value));
    }
    style.finish(builder.build())
}

/// Result set (if any) followed by the named output parameters (if any).
pub fn render_invocation(result: &InvocationResult, style: TableStyleKind) -> String {
    let mut sections = Vec::with_capacity(2);
    match &result.result_set {
        Some(batch) => sections.push(render_result_set(batch, style)),
        None => sections.push("<no result set>".to_string()),
    }
    if !result.outputs.is_empty() {
        sections.push(render_key_values(&result.outputs, style));
    }
    sections.join("\n")
}

/// Two-column `name | value` table, used for outputs and chain variables.
pub fn render_key_values(values: &BTreeMap<String, Value>, style: TableStyleKind) -> String {
    if values.is_empty() {
        return EMPTY.into();
    }

    let mut builder = Builder::default();
    builder.push_record(["name", "value"]);
    for (name, value) in values {
        builder.push_record([name.clone(), format_value(value)]);
    }
    style.finish(builder.build())
}

/// Any `Tabled` rows, e.g. per-case summary lines.
pub fn render_structured_rows<T>(rows: &[T], style: TableStyleKind) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return EMPTY.into();
    }
    style.finish(Table::new(rows.to_vec()))
}

/// Text is quoted so that `'1'` and `1` stay distinguishable.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Text(text) => format!("'{text}'"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Row;

    fn batch(columns: &[&str], rows: Vec<Vec<Value>>) -> RecordBatch {
        RecordBatch::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.into_iter().map(Row::new).collect(),
        )
    }

    #[test]
    fn result_set_uses_column_labels() {
        let rendered = render_result_set(
            &batch(
                &["intStatus", "strMessage"],
                vec![vec![Value::Int(1), Value::Text("Saved".into())]],
            ),
            TableStyleKind::Modern,
        );
        assert!(rendered.contains("intStatus"));
        assert!(rendered.contains("'Saved'"));
    }

    #[test]
    fn unnamed_columns_are_positional() {
        let rendered = render_result_set(
            &batch(&["id"], vec![vec![Value::Int(1), Value::Null]]),
            TableStyleKind::Ascii,
        );
        assert!(rendered.contains("id"));
        assert!(rendered.contains("col2"));
        assert!(rendered.contains("NULL"));
    }

    #[test]
    fn empty_inputs_render_placeholder() {
        assert_eq!(
            render_result_set(&RecordBatch::default(), TableStyleKind::Plain),
            EMPTY
        );
        assert_eq!(
            render_key_values(&BTreeMap::new(), TableStyleKind::Plain),
            EMPTY
        );
    }

    #[test]
    fn invocation_without_result_set_says_so() {
        let result = InvocationResult::no_result().with_output("@id", 9);
        let rendered = render_invocation(&result, TableStyleKind::Plain);
        assert!(rendered.starts_with("<no result set>"));
        assert!(rendered.contains("@id"));
    }

    #[test]
    fn text_values_are_quoted() {
        assert_eq!(format_value(&Value::Text("1".into())), "'1'");
        assert_eq!(format_value(&Value::Int(1)), "1");
    }

    #[test]
    fn style_parses_case_insensitively() {
        assert_eq!("ASCII".parse::<TableStyleKind>(), Ok(TableStyleKind::Ascii));
        assert_eq!(" plain ".parse::<TableStyleKind>(), Ok(TableStyleKind::Plain));
        assert!("fancy".parse::<TableStyleKind>().is_err());
    }
}
