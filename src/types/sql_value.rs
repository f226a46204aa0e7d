/// A value that can be encoded into a SQL literal.
///
/// The variants are the whole quotable domain: a string is always `Text`
/// and is always escaped, never re-interpreted as a number. Callers who
/// want an unquoted numeric literal construct `Int` or `Float` directly.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// A flat sequence, quoted element by element and comma-joined.
    /// Intended for `IN (...)` lists and other multi-value contexts.
    List(Vec<SqlValue>),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(value.into())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

impl<T: Into<SqlValue>> From<Vec<T>> for SqlValue {
    fn from(values: Vec<T>) -> Self {
        SqlValue::List(values.into_iter().map(Into::into).collect())
    }
}
