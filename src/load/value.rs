use duckdb::types::Value;

/// Convert one CSV field into a positional bind value.
///
/// Empty fields bind as NULL. Whole numbers bind as BIGINT and other
/// numerics as DOUBLE so typed target columns accept them; everything else
/// binds as text and is cast by the database (dates stay textual here).
pub fn bind_value(field: &str) -> Value {
    let s = field.trim();
    if s.is_empty() {
        return Value::Null;
    }
    if looks_numeric(s) {
        if let Ok(i) = s.parse::<i64>() {
            return Value::BigInt(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return Value::Double(f);
        }
    }
    Value::Text(s.to_string())
}

// `f64::from_str` also accepts words like `inf` and `nan`; restrict the
// alphabet so such fields stay text.
fn looks_numeric(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+' || c == '.')
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
}
