use once_cell::sync::Lazy;
use regex::Regex;

use crate::database_error::DatabaseError;
use crate::sql::SQLValue;

use super::{string_converter, ValueConverter};

/// `[` or `(` , bounds , `]` or `)`; bounds may be quoted (timestamps carry
/// spaces) or empty (unbounded).
static RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\[|\()("(?:[^"\\]|\\.)*"|[^,]*),("(?:[^"\\]|\\.)*"|[^\])]*)(\]|\))$"#)
        .unwrap()
});

/// A Postgres range value: optional begin/end bounds with exclusivity flags, an
/// empty sentinel, and the declared range type. Two ranges are equal only when
/// bounds, exclusivity, emptiness and the type tag all match; `[1,2]::int4range`
/// and `[1,2]::numrange` are different values.
#[derive(Debug, Clone, PartialEq)]
pub struct PGRange {
    pub begin: Option<SQLValue>,
    pub end: Option<SQLValue>,
    pub exclude_begin: bool,
    pub exclude_end: bool,
    pub empty: bool,
    pub db_type: String,
}

/// The interval forms a range can convert to. A native range is always bounded
/// on both sides and never begin-exclusive (a half-open interval cannot express
/// an excluded lower bound).
#[derive(Debug, Clone, PartialEq)]
pub enum NativeRange {
    /// `begin <= x < end`
    Exclusive { begin: SQLValue, end: SQLValue },
    /// `begin <= x <= end`
    Inclusive { begin: SQLValue, end: SQLValue },
}

impl PGRange {
    pub fn empty(db_type: impl Into<String>) -> Self {
        Self {
            begin: None,
            end: None,
            exclude_begin: false,
            exclude_end: false,
            empty: true,
            db_type: db_type.into(),
        }
    }

    pub fn bounded(
        begin: SQLValue,
        end: SQLValue,
        exclude_begin: bool,
        exclude_end: bool,
        db_type: impl Into<String>,
    ) -> Self {
        Self {
            begin: Some(begin),
            end: Some(end),
            exclude_begin,
            exclude_end,
            empty: false,
            db_type: db_type.into(),
        }
    }

    /// Parse range wire text, keeping bound values as strings.
    pub fn parse(text: &str, db_type: &str) -> Result<Self, DatabaseError> {
        Self::parse_with(text, db_type, &string_converter)
    }

    /// Parse range wire text with a per-bound converter. `empty` is the
    /// empty-range sentinel; an absent bound is unbounded on that side. Integer
    /// range types are canonicalized to the `[b,e)` form the server itself uses.
    pub fn parse_with(
        text: &str,
        db_type: &str,
        convert: &ValueConverter,
    ) -> Result<Self, DatabaseError> {
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("empty") {
            return Ok(Self::empty(db_type));
        }

        let captures = RANGE_RE.captures(trimmed).ok_or_else(|| {
            DatabaseError::Decode(format!("malformed range text: {text}"))
        })?;

        let bound = |raw: &str| -> Result<Option<SQLValue>, DatabaseError> {
            if raw.is_empty() {
                return Ok(None);
            }
            let unquoted = raw
                .strip_prefix('"')
                .and_then(|r| r.strip_suffix('"'))
                .map(|r| r.replace("\\\"", "\"").replace("\\\\", "\\"))
                .unwrap_or_else(|| raw.to_string());
            convert(&unquoted).map(Some)
        };

        let range = Self {
            begin: bound(&captures[2])?,
            end: bound(&captures[3])?,
            exclude_begin: &captures[1] == "(",
            exclude_end: &captures[4] == ")",
            empty: false,
            db_type: db_type.to_string(),
        };
        Ok(range.canonicalize())
    }

    /// Discrete (integer) ranges have one canonical form, `[b,e)`: an excluded
    /// integer begin means the next integer included, an included integer end
    /// means the next integer excluded.
    fn canonicalize(mut self) -> Self {
        if let Some(SQLValue::Int(begin)) = self.begin {
            // A bound at i64::MAX has no successor; leave it un-canonicalized
            if self.exclude_begin {
                if let Some(next) = begin.checked_add(1) {
                    self.begin = Some(SQLValue::Int(next));
                    self.exclude_begin = false;
                }
            }
        }
        if let Some(SQLValue::Int(end)) = self.end {
            if !self.exclude_end {
                if let Some(next) = end.checked_add(1) {
                    self.end = Some(SQLValue::Int(next));
                    self.exclude_end = true;
                }
            }
        }
        self
    }

    /// Render back to the wire form. Bounds whose text carries range
    /// metacharacters or spaces are quoted.
    pub fn literalize(&self) -> String {
        if self.empty {
            return "empty".to_string();
        }
        let bound = |value: &Option<SQLValue>| match value {
            None => String::new(),
            Some(value) => {
                let text = value.to_plain_text();
                if text.contains([',', '"', '\\', '[', ']', '(', ')', ' ']) {
                    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
                } else {
                    text
                }
            }
        };
        format!(
            "{}{},{}{}",
            if self.exclude_begin { "(" } else { "[" },
            bound(&self.begin),
            bound(&self.end),
            if self.exclude_end { ")" } else { "]" },
        )
    }

    /// Convert to a native interval. Fails when unbounded on either side or when
    /// begin-exclusive, since neither fits a native range form.
    pub fn to_range(&self) -> Result<NativeRange, DatabaseError> {
        if self.empty {
            return Err(DatabaseError::Validation(
                "cannot convert an empty range to a native range".into(),
            ));
        }
        let (Some(begin), Some(end)) = (self.begin.clone(), self.end.clone()) else {
            return Err(DatabaseError::Validation(
                "cannot convert an unbounded range to a native range".into(),
            ));
        };
        if self.exclude_begin {
            return Err(DatabaseError::Validation(
                "cannot convert a begin-exclusive range to a native range".into(),
            ));
        }
        Ok(if self.exclude_end {
            NativeRange::Exclusive { begin, end }
        } else {
            NativeRange::Inclusive { begin, end }
        })
    }

    /// Whether the range covers the given point. Unbounded sides cover
    /// everything on that side.
    pub fn contains(&self, value: &SQLValue) -> bool {
        if self.empty {
            return false;
        }
        let above_begin = match &self.begin {
            None => true,
            Some(begin) => match value.partial_cmp(begin) {
                Some(std::cmp::Ordering::Greater) => true,
                Some(std::cmp::Ordering::Equal) => !self.exclude_begin,
                _ => false,
            },
        };
        let below_end = match &self.end {
            None => true,
            Some(end) => match value.partial_cmp(end) {
                Some(std::cmp::Ordering::Less) => true,
                Some(std::cmp::Ordering::Equal) => !self.exclude_end,
                _ => false,
            },
        };
        above_begin && below_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_converter(text: &str) -> Result<SQLValue, DatabaseError> {
        text.parse::<i64>()
            .map(SQLValue::Int)
            .map_err(|_| DatabaseError::Decode(format!("not an integer: {text}")))
    }

    #[test]
    fn parses_bounded_forms() {
        let range = PGRange::parse_with("[1,5)", "int4range", &int_converter).unwrap();
        assert_eq!(range.begin, Some(SQLValue::Int(1)));
        assert_eq!(range.end, Some(SQLValue::Int(5)));
        assert!(!range.exclude_begin);
        assert!(range.exclude_end);
    }

    #[test]
    fn integer_ranges_canonicalize() {
        let range = PGRange::parse_with("(0,5]", "int4range", &int_converter).unwrap();
        assert_eq!(
            range,
            PGRange::bounded(SQLValue::Int(1), SQLValue::Int(6), false, true, "int4range")
        );
    }

    #[test]
    fn empty_sentinel() {
        let range = PGRange::parse("empty", "int4range").unwrap();
        assert!(range.empty);
        assert_eq!(range.literalize(), "empty");
        assert!(!range.contains(&SQLValue::Int(1)));
    }

    #[test]
    fn unbounded_sides_parse_as_none() {
        let range = PGRange::parse_with("[3,)", "int8range", &int_converter).unwrap();
        assert_eq!(range.begin, Some(SQLValue::Int(3)));
        assert_eq!(range.end, None);
        assert!(range.contains(&SQLValue::Int(1000)));
        assert!(!range.contains(&SQLValue::Int(2)));
    }

    #[test]
    fn quoted_bounds_round_trip() {
        let range = PGRange::parse(r#"["2020-01-01 00:00:00","2020-12-31 23:59:59"]"#, "tsrange")
            .unwrap();
        assert_eq!(range.begin, Some(SQLValue::from("2020-01-01 00:00:00")));
        assert_eq!(
            range.literalize(),
            r#"["2020-01-01 00:00:00","2020-12-31 23:59:59"]"#
        );
    }

    #[test]
    fn round_trips() {
        for text in ["[1,5)", "(,5)", "[3,)", "(,)", "empty"] {
            let range = PGRange::parse_with(text, "int8range", &int_converter).unwrap();
            assert_eq!(range.literalize(), text);
            assert_eq!(
                PGRange::parse_with(&range.literalize(), "int8range", &int_converter).unwrap(),
                range
            );
        }
    }

    fn numeric_converter(text: &str) -> Result<SQLValue, DatabaseError> {
        text.parse::<rust_decimal::Decimal>()
            .map(SQLValue::Numeric)
            .map_err(|_| DatabaseError::Decode(format!("not a numeric: {text}")))
    }

    fn date_converter(text: &str) -> Result<SQLValue, DatabaseError> {
        chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(SQLValue::Date)
            .map_err(|_| DatabaseError::Decode(format!("not a date: {text}")))
    }

    fn timestamp_converter(text: &str) -> Result<SQLValue, DatabaseError> {
        chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
            .map(SQLValue::Timestamp)
            .map_err(|_| DatabaseError::Decode(format!("not a timestamp: {text}")))
    }

    #[test]
    fn canonicalization_leaves_an_extreme_bound_alone() {
        let text = format!("[1,{}]", i64::MAX);
        let range = PGRange::parse_with(&text, "int8range", &int_converter).unwrap();
        assert_eq!(range.end, Some(SQLValue::Int(i64::MAX)));
        assert!(!range.exclude_end);
    }

    #[test]
    fn numeric_subtype_round_trips() {
        let range = PGRange::parse_with("[1.5,2.75)", "numrange", &numeric_converter).unwrap();
        assert_eq!(
            range.begin,
            Some(SQLValue::Numeric("1.5".parse().unwrap()))
        );
        // Numeric ranges are continuous, so no integer canonicalization applies
        assert_eq!(range.literalize(), "[1.5,2.75)");
        assert_eq!(
            PGRange::parse_with(&range.literalize(), "numrange", &numeric_converter).unwrap(),
            range
        );
    }

    #[test]
    fn date_subtype_round_trips() {
        let range =
            PGRange::parse_with("[2020-01-01,2020-06-30)", "daterange", &date_converter).unwrap();
        assert_eq!(
            range.begin,
            Some(SQLValue::Date(
                chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
            ))
        );
        assert_eq!(range.literalize(), "[2020-01-01,2020-06-30)");
        assert_eq!(
            PGRange::parse_with(&range.literalize(), "daterange", &date_converter).unwrap(),
            range
        );
    }

    #[test]
    fn timestamp_subtype_round_trips() {
        let range = PGRange::parse_with(
            r#"["2020-01-01 00:00:00.000000","2020-12-31 23:59:59.500000")"#,
            "tsrange",
            &timestamp_converter,
        )
        .unwrap();
        assert_eq!(
            range.begin,
            Some(SQLValue::Timestamp(
                chrono::NaiveDate::from_ymd_opt(2020, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            ))
        );
        // Timestamp bound text carries a space, so literalization re-quotes it
        assert_eq!(
            range.literalize(),
            r#"["2020-01-01 00:00:00.000000","2020-12-31 23:59:59.500000")"#
        );
        assert_eq!(
            PGRange::parse_with(&range.literalize(), "tsrange", &timestamp_converter).unwrap(),
            range
        );
    }

    #[test]
    fn equality_requires_matching_type_tag() {
        let a = PGRange::bounded(SQLValue::Int(1), SQLValue::Int(2), false, true, "int4range");
        let b = PGRange::bounded(SQLValue::Int(1), SQLValue::Int(2), false, true, "int8range");
        assert_ne!(a, b);
    }

    #[test]
    fn native_conversion_rules() {
        let bounded =
            PGRange::bounded(SQLValue::Int(1), SQLValue::Int(5), false, true, "int4range");
        assert_eq!(
            bounded.to_range().unwrap(),
            NativeRange::Exclusive {
                begin: SQLValue::Int(1),
                end: SQLValue::Int(5)
            }
        );

        let unbounded = PGRange {
            begin: None,
            end: Some(SQLValue::Int(5)),
            exclude_begin: false,
            exclude_end: true,
            empty: false,
            db_type: "int4range".to_string(),
        };
        assert!(matches!(
            unbounded.to_range(),
            Err(DatabaseError::Validation(_))
        ));

        let begin_exclusive = PGRange::bounded(
            SQLValue::Float(1.0),
            SQLValue::Float(2.0),
            true,
            false,
            "numrange",
        );
        assert!(matches!(
            begin_exclusive.to_range(),
            Err(DatabaseError::Validation(_))
        ));
    }

    #[test]
    fn malformed_text_is_a_decode_error() {
        assert!(matches!(
            PGRange::parse("[1,5", "int4range"),
            Err(DatabaseError::Decode(_))
        ));
    }
}
