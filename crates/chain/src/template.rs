//! The `$(name)` substitution language.
//!
//! A parameter value is a variable reference only when the whole value is a
//! string of the exact form `$(identifier)`. There is no partial-string
//! interpolation and no expression syntax; anything else, including strings
//! that merely contain `$(`, is a literal.

use types::Value;

/// A parameter value classified for substitution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamTemplate<'a> {
    Literal(&'a Value),
    Variable(&'a str),
}

impl<'a> ParamTemplate<'a> {
    pub fn parse(value: &'a Value) -> Self {
        match value {
            Value::Text(text) => match parse_reference(text) {
                Some(name) => ParamTemplate::Variable(name),
                None => ParamTemplate::Literal(value),
            },
            other => ParamTemplate::Literal(other),
        }
    }
}

/// Extract `name` from `$(name)`. Identifiers are ASCII letters, digits and
/// `_`, not starting with a digit.
pub fn parse_reference(text: &str) -> Option<&str> {
    let name = text.strip_prefix("$(")?.strip_suffix(')')?;
    is_identifier(name).then_some(name)
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Render `name` as a reference string.
pub fn reference(name: &str) -> String {
    format!("$({name})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_value_references_parse() {
        assert_eq!(parse_reference("$(new_id)"), Some("new_id"));
        assert_eq!(parse_reference("$(_x9)"), Some("_x9"));
    }

    #[test]
    fn partial_or_malformed_references_are_literals() {
        for text in [
            "id=$(new_id)",
            "$(new_id) ",
            "$(new id)",
            "$()",
            "$(9lives)",
            "$(a.b)",
            "$(unclosed",
            "(x)",
            "$x",
        ] {
            assert_eq!(parse_reference(text), None, "{text}");
        }
    }

    #[test]
    fn non_text_values_are_literals() {
        let value = Value::Int(42);
        assert_eq!(ParamTemplate::parse(&value), ParamTemplate::Literal(&value));
        let reference_value = Value::Text(reference("x"));
        assert_eq!(
            ParamTemplate::parse(&reference_value),
            ParamTemplate::Variable("x")
        );
    }
}
