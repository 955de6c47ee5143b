use std::fmt;

/// A field whose type depends on the source row: survey data encodes most
/// mileages as numbers but some as ranges or free text
#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Coerces a raw cell. Finite numbers become [`Value::Number`], anything
    /// else is kept verbatim as [`Value::Text`]. Returns [`None`] for an empty
    /// cell.
    ///
    /// ```rust
    /// use railref_core::record::Value;
    ///
    /// assert_eq!(Value::coerce("12.5"), Some(Value::Number(12.5)));
    /// assert_eq!(Value::coerce("12m 40ch"), Some(Value::Text("12m 40ch".into())));
    /// assert_eq!(Value::coerce("NaN"), Some(Value::Text("NaN".into())));
    /// assert_eq!(Value::coerce(""), None);
    /// ```
    pub fn coerce(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Some(Value::Number(n)),
            _ => Some(Value::Text(raw.to_string())),
        }
    }

    /// Returns the numeric value if this is a [`Value::Number`]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<Value> for serde_json::Value {
    /// Finite numbers are guaranteed by [`Value::coerce`]. A non-finite
    /// number built by hand has no JSON representation and becomes `null`.
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s),
        }
    }
}
