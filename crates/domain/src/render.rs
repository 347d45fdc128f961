//! Text rendering of metadata values for embedding input.
//!
//! Strings are taken as-is at the top level. Everything else uses Python
//! `str()` notation (`True`, `None`, `['a', 'b']`, `{'k': 1.5}`), which the
//! stored embeddings were computed from.

use serde_json::{Number, Value};

pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => repr(other),
    }
}

fn repr(value: &Value) -> String {
    match value {
        Value::Null => "None".to_owned(),
        Value::Bool(true) => "True".to_owned(),
        Value::Bool(false) => "False".to_owned(),
        Value::Number(number) => render_number(number),
        Value::String(text) => quote(text),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(repr).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(key, value)| format!("{}: {}", quote(key), repr(value)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
    }
}

fn render_number(number: &Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }
    match number.as_f64() {
        Some(float) => render_float(float),
        None => number.to_string(),
    }
}

/// Shortest round-trip digits, positional for exponents in `-4..16`,
/// scientific with a signed two-digit exponent otherwise.
fn render_float(float: f64) -> String {
    if float.is_nan() {
        return "nan".to_owned();
    }
    if float.is_infinite() {
        let text = if float > 0.0 { "inf" } else { "-inf" };
        return text.to_owned();
    }

    let scientific = format!("{float:e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..16).contains(&exponent) {
        let positional = float.to_string();
        if positional.contains('.') {
            positional
        } else {
            format!("{positional}.0")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}

/// Single quotes unless the text holds a single quote and no double quote.
fn quote(text: &str) -> String {
    let delimiter = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push(delimiter);
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c == delimiter => {
                quoted.push('\\');
                quoted.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                quoted.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => quoted.push(c),
        }
    }
    quoted.push(delimiter);
    quoted
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn scalars() {
        assert_eq!(render_value(&json!("plain text")), "plain text");
        assert_eq!(render_value(&json!(true)), "True");
        assert_eq!(render_value(&json!(false)), "False");
        assert_eq!(render_value(&json!(null)), "None");
        assert_eq!(render_value(&json!(12)), "12");
        assert_eq!(render_value(&json!(-3)), "-3");
    }

    #[test]
    fn floats() {
        assert_eq!(render_value(&json!(1.0)), "1.0");
        assert_eq!(render_value(&json!(2.5)), "2.5");
        assert_eq!(render_value(&json!(0.1)), "0.1");
        assert_eq!(render_value(&json!(0.0001)), "0.0001");
        assert_eq!(render_value(&json!(0.00001)), "1e-05");
        assert_eq!(render_value(&json!(1e15)), "1000000000000000.0");
        assert_eq!(render_value(&json!(1e16)), "1e+16");
        assert_eq!(render_value(&json!(1.5e300)), "1.5e+300");
        assert_eq!(render_value(&json!(-0.0)), "-0.0");
    }

    #[test]
    fn containers() {
        assert_eq!(render_value(&json!(["a", "b"])), "['a', 'b']");
        assert_eq!(render_value(&json!([])), "[]");
        assert_eq!(render_value(&json!({})), "{}");
        assert_eq!(
            render_value(&json!({ "k": "v", "n": [1, 2.5, null, false] })),
            "{'k': 'v', 'n': [1, 2.5, None, False]}"
        );
    }

    #[test]
    fn nested_strings_are_quoted_and_escaped() {
        assert_eq!(render_value(&json!(["it's"])), r#"["it's"]"#);
        assert_eq!(render_value(&json!([r#"say "it's""#])), r#"['say "it\'s"']"#);
        assert_eq!(render_value(&json!(["a\\b\nc\td"])), r"['a\\b\nc\td']");
        assert_eq!(render_value(&json!(["\u{1}"])), r"['\x01']");
        assert_eq!(render_value(&json!(["café"])), "['café']");
    }
}
