use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Database, ExpressionBuilder, SQLBuilder};

/// A self-contained SQL value. Unlike a bind parameter, a value knows how to render
/// itself as a dialect-correct literal (strings quoted with `''` escaping, temporal
/// values as quoted ISO text), which is what lets a compiled statement be a plain
/// string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SQLValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Numeric(Decimal),
    String(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Json(serde_json::Value),
}

impl Eq for SQLValue {}

// Values key the eager-load partition maps, so they must hash. Floats hash by bit
// pattern, consistent with the PartialEq derive.
impl Hash for SQLValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            SQLValue::Null => {}
            SQLValue::Bool(b) => b.hash(state),
            SQLValue::Int(i) => i.hash(state),
            SQLValue::Float(f) => f.to_bits().hash(state),
            SQLValue::Numeric(d) => d.hash(state),
            SQLValue::String(s) => s.hash(state),
            SQLValue::Date(d) => d.hash(state),
            SQLValue::Timestamp(t) => t.hash(state),
            SQLValue::Json(v) => v.to_string().hash(state),
        }
    }
}

impl SQLValue {
    /// The literal SQL text for this value.
    pub fn to_literal(&self) -> String {
        match self {
            SQLValue::Null => "NULL".to_owned(),
            SQLValue::Bool(true) => "TRUE".to_owned(),
            SQLValue::Bool(false) => "FALSE".to_owned(),
            SQLValue::Int(i) => i.to_string(),
            SQLValue::Float(f) => f.to_string(),
            SQLValue::Numeric(d) => d.to_string(),
            SQLValue::String(s) => quote_string(s),
            SQLValue::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
            SQLValue::Timestamp(t) => format!("'{}'", t.format("%Y-%m-%d %H:%M:%S%.6f")),
            SQLValue::Json(v) => format!("{}::jsonb", quote_string(&v.to_string())),
        }
    }

    /// The bare text of the value, without quoting. This is the form embedded inside
    /// compound-type wire text (array/row fields) and string coercions.
    pub fn to_plain_text(&self) -> String {
        match self {
            SQLValue::String(s) => s.clone(),
            SQLValue::Null => "NULL".to_owned(),
            SQLValue::Bool(true) => "t".to_owned(),
            SQLValue::Bool(false) => "f".to_owned(),
            SQLValue::Int(i) => i.to_string(),
            SQLValue::Float(f) => f.to_string(),
            SQLValue::Numeric(d) => d.to_string(),
            SQLValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            SQLValue::Timestamp(t) => t.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            SQLValue::Json(v) => v.to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SQLValue::Null)
    }
}

/// Single-quote a string, doubling embedded quotes.
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

impl ExpressionBuilder for SQLValue {
    fn build(&self, _database: &Database, builder: &mut SQLBuilder) {
        builder.push_str(self.to_literal());
    }
}

// Same-variant ordering, used by range bound containment checks.
impl PartialOrd for SQLValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (SQLValue::Int(a), SQLValue::Int(b)) => a.partial_cmp(b),
            (SQLValue::Float(a), SQLValue::Float(b)) => a.partial_cmp(b),
            (SQLValue::Numeric(a), SQLValue::Numeric(b)) => a.partial_cmp(b),
            (SQLValue::String(a), SQLValue::String(b)) => a.partial_cmp(b),
            (SQLValue::Date(a), SQLValue::Date(b)) => a.partial_cmp(b),
            (SQLValue::Timestamp(a), SQLValue::Timestamp(b)) => a.partial_cmp(b),
            (SQLValue::Bool(a), SQLValue::Bool(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl From<i64> for SQLValue {
    fn from(i: i64) -> Self {
        SQLValue::Int(i)
    }
}

impl From<i32> for SQLValue {
    fn from(i: i32) -> Self {
        SQLValue::Int(i as i64)
    }
}

impl From<f64> for SQLValue {
    fn from(f: f64) -> Self {
        SQLValue::Float(f)
    }
}

impl From<bool> for SQLValue {
    fn from(b: bool) -> Self {
        SQLValue::Bool(b)
    }
}

impl From<&str> for SQLValue {
    fn from(s: &str) -> Self {
        SQLValue::String(s.to_owned())
    }
}

impl From<String> for SQLValue {
    fn from(s: String) -> Self {
        SQLValue::String(s)
    }
}

impl From<Decimal> for SQLValue {
    fn from(d: Decimal) -> Self {
        SQLValue::Numeric(d)
    }
}

impl From<NaiveDate> for SQLValue {
    fn from(d: NaiveDate) -> Self {
        SQLValue::Date(d)
    }
}

impl From<NaiveDateTime> for SQLValue {
    fn from(t: NaiveDateTime) -> Self {
        SQLValue::Timestamp(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_literal_escapes_quotes() {
        assert_eq!(SQLValue::from("it's").to_literal(), "'it''s'");
    }

    #[test]
    fn temporal_literals() {
        let date = NaiveDate::from_ymd_opt(2020, 3, 14).unwrap();
        assert_eq!(SQLValue::from(date).to_literal(), "'2020-03-14'");
    }

    #[test]
    fn null_and_bool_literals() {
        assert_eq!(SQLValue::Null.to_literal(), "NULL");
        assert_eq!(SQLValue::from(true).to_literal(), "TRUE");
        assert_eq!(SQLValue::from(false).to_literal(), "FALSE");
    }

    #[test]
    fn float_values_hash_consistently() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(vec![SQLValue::Float(1.5), SQLValue::Int(2)], "a");
        assert_eq!(
            map.get(&vec![SQLValue::Float(1.5), SQLValue::Int(2)]),
            Some(&"a")
        );
    }
}
