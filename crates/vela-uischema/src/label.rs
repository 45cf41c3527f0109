//! Human readable labels for keys and enum literals.
use serde_json::Value;

/// Turns an enum literal into the label of its [`ParameterOption`](crate::parameter::ParameterOption).
pub type OptionLabelFn = fn(&Value) -> String;

/// Upper-cases the first character of `input`, leaving the rest untouched.
pub fn first_upper(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The default [`OptionLabelFn`].
///
/// Strings are passed through [`first_upper`], numbers and booleans use their JSON form, `null`
/// results in an empty label. Lists and objects are rendered as compact JSON.
pub fn option_label(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(literal) => first_upper(literal),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
