use crate::database_error::DatabaseError;
use crate::sql::SQLValue;

use super::range::PGRange;
use super::{string_converter, ValueConverter};

/// A Postgres multirange: an ordered sequence of ranges sharing one declared
/// type tag. Wire form is `{range, range, ...}`.
#[derive(Debug, Clone, PartialEq)]
pub struct PGMultiRange {
    pub ranges: Vec<PGRange>,
    pub db_type: String,
}

impl PGMultiRange {
    pub fn new(ranges: Vec<PGRange>, db_type: impl Into<String>) -> Self {
        Self {
            ranges,
            db_type: db_type.into(),
        }
    }

    pub fn parse(text: &str, db_type: &str) -> Result<Self, DatabaseError> {
        Self::parse_with(text, db_type, &string_converter)
    }

    pub fn parse_with(
        text: &str,
        db_type: &str,
        convert: &ValueConverter,
    ) -> Result<Self, DatabaseError> {
        let trimmed = text.trim();
        let inner = trimmed
            .strip_prefix('{')
            .and_then(|t| t.strip_suffix('}'))
            .ok_or_else(|| DatabaseError::Decode(format!("malformed multirange text: {text}")))?;

        let mut ranges = vec![];
        let mut rest = inner.trim();
        while !rest.is_empty() {
            // Each member runs to its closing bracket; bounds may be quoted
            let end = member_end(rest).ok_or_else(|| {
                DatabaseError::Decode(format!("malformed multirange member in: {text}"))
            })?;
            ranges.push(PGRange::parse_with(&rest[..=end], db_type, convert)?);
            rest = rest[end + 1..].trim_start_matches([',', ' ']);
        }
        Ok(Self::new(ranges, db_type))
    }

    pub fn literalize(&self) -> String {
        let members: Vec<String> = self.ranges.iter().map(|range| range.literalize()).collect();
        format!("{{{}}}", members.join(","))
    }

    /// A multirange covers a point when any contained range does.
    pub fn contains(&self, value: &SQLValue) -> bool {
        self.ranges.iter().any(|range| range.contains(value))
    }
}

fn member_end(s: &str) -> Option<usize> {
    let mut in_quote = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quote = !in_quote,
            ']' | ')' if !in_quote => return Some(i),
            _ => {}
        }
    }
    None
}
