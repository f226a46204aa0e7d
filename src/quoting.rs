//! Value-to-SQL-literal encoding.
//!
//! Every value that reaches SQL text goes through [`quote`], so all
//! drivers share one injection-safe encoding while still customizing
//! boolean literals and identifier delimiters through their
//! [`DatabaseDriver`] override points.

use crate::traits::DatabaseDriver;
use crate::types::SqlValue;

/// Encodes `value` as a SQL literal.
///
/// Lists are quoted element by element and comma-joined without
/// enclosing brackets, ready for `IN (...)` contexts. Boolean literals
/// come from the driver; everything textual goes through
/// [`quote_string`]. Note that a string is always escaped and quoted,
/// even when it happens to look like a number.
pub fn quote(value: &SqlValue, driver: &dyn DatabaseDriver) -> String {
    match value {
        SqlValue::List(items) => items
            .iter()
            .map(|item| quote(item, driver))
            .collect::<Vec<_>>()
            .join(","),
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Bool(true) => driver.quote_true().to_string(),
        SqlValue::Bool(false) => driver.quote_false().to_string(),
        SqlValue::Int(n) => n.to_string(),
        SqlValue::Float(n) => n.to_string(),
        SqlValue::Text(text) => quote_string(text),
    }
}

/// Wraps `text` in single quotes, escaping embedded backslashes and
/// single quotes. Backslashes are doubled first so the quote pass does
/// not re-escape the backslashes it introduces.
pub fn quote_string(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}
