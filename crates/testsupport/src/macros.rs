//! Declarative macros for building parameter maps in tests.

/// Build a [`common::Params`] map in binding order.
///
/// # Syntax
///
/// ```text
/// params!{ "name" => value, "other" => value, ... }
/// ```
///
/// # Examples
///
/// ```
/// use testsupport::params;
/// use types::Value;
///
/// let p = params! { "@name" => "A", "@size" => 3, "@ref" => "$(new_id)" };
/// assert_eq!(p.keys().collect::<Vec<_>>(), vec!["@name", "@size", "@ref"]);
/// assert_eq!(p["@size"], Value::Int(3));
///
/// let empty = params! {};
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::common::Params::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut _params = ::common::Params::new();
        $(
            _params.insert(::std::string::String::from($name), ::types::Value::from($value));
        )+
        _params
    }};
}

#[cfg(test)]
mod tests {
    use types::Value;

    #[test]
    fn params_macro_keeps_order_and_converts() {
        let p = params! { "b" => 1, "a" => true, "c" => Value::Null };
        assert_eq!(p.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(p["a"], Value::Bool(true));
        assert_eq!(p["c"], Value::Null);
    }
}
