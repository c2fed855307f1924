use indexmap::IndexMap;

use crate::database_error::DatabaseError;
use crate::sql::SQLValue;

use super::{string_converter, ValueConverter};

/// A Postgres composite (row) value: positional field values, optionally paired
/// with field names when the row type's declaration is known, plus an optional
/// type tag for the `::type` literal suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct PGRowValue {
    pub values: Vec<SQLValue>,
    pub fields: Option<Vec<String>>,
    pub db_type: Option<String>,
}

impl PGRowValue {
    pub fn new(
        values: Vec<SQLValue>,
        fields: Option<Vec<String>>,
        db_type: Option<String>,
    ) -> Result<Self, DatabaseError> {
        if let Some(fields) = &fields {
            if fields.len() != values.len() {
                return Err(DatabaseError::Config(format!(
                    "row type has {} field names for {} values",
                    fields.len(),
                    values.len()
                )));
            }
        }
        Ok(Self {
            values,
            fields,
            db_type,
        })
    }

    /// Parse composite wire text, keeping fields as strings.
    pub fn parse(text: &str, db_type: Option<&str>) -> Result<Self, DatabaseError> {
        Self::parse_with(text, db_type, None, &string_converter)
    }

    /// Parse composite wire text (`(a,b)`: `"` quoting with doubled-quote and
    /// backslash escapes, an empty field is NULL) or the `ROW(...)` literal form
    /// this type produces. Field names, when supplied, must match the arity.
    pub fn parse_with(
        text: &str,
        db_type: Option<&str>,
        fields: Option<Vec<String>>,
        convert: &ValueConverter,
    ) -> Result<Self, DatabaseError> {
        let trimmed = text.trim();

        if let Some(rest) = trimmed.strip_prefix("ROW(") {
            let end = matching_paren(rest).ok_or_else(|| {
                DatabaseError::Decode(format!("unterminated row literal: {text}"))
            })?;
            let values = parse_literal_fields(&rest[..end], convert)?;
            return Self::new(values, fields, db_type.map(|t| t.to_string()));
        }

        let inner = trimmed
            .strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .ok_or_else(|| DatabaseError::Decode(format!("malformed row text: {text}")))?;
        let values = parse_wire_fields(inner, convert)?;
        Self::new(values, fields, db_type.map(|t| t.to_string()))
    }

    /// The named view of the row. Fails when the row type's field names are not
    /// known.
    pub fn as_map(&self) -> Result<IndexMap<String, SQLValue>, DatabaseError> {
        let fields = self.fields.as_ref().ok_or_else(|| {
            DatabaseError::Validation("row type has no declared field names".into())
        })?;
        Ok(fields
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect())
    }

    /// `ROW(v1, v2, ...)` with the `::type` suffix when the type is declared.
    pub fn literalize(&self) -> String {
        let fields: Vec<String> = self.values.iter().map(|value| value.to_literal()).collect();
        let suffix = self
            .db_type
            .as_ref()
            .map(|t| format!("::{t}"))
            .unwrap_or_default();
        format!("ROW({}){suffix}", fields.join(", "))
    }
}

/// The byte index of the `)` closing the already-opened paren, skipping parens
/// inside single-quoted strings.
fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut in_string = false;
    for (i, c) in s.char_indices() {
        match c {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_wire_fields(
    inner: &str,
    convert: &ValueConverter,
) -> Result<Vec<SQLValue>, DatabaseError> {
    if inner.is_empty() {
        return Ok(vec![]);
    }
    let mut values = vec![];
    let mut chars = inner.chars().peekable();
    loop {
        let value = if chars.peek() == Some(&'"') {
            chars.next();
            let mut out = String::new();
            loop {
                match chars.next() {
                    Some('"') => {
                        if chars.peek() == Some(&'"') {
                            chars.next();
                            out.push('"');
                        } else {
                            break;
                        }
                    }
                    Some('\\') => match chars.next() {
                        Some(c) => out.push(c),
                        None => {
                            return Err(DatabaseError::Decode(
                                "dangling escape in row text".into(),
                            ))
                        }
                    },
                    Some(c) => out.push(c),
                    None => {
                        return Err(DatabaseError::Decode(
                            "unterminated quoted field in row text".into(),
                        ))
                    }
                }
            }
            convert(&out)?
        } else {
            let mut bare = String::new();
            while let Some(c) = chars.peek() {
                if *c == ',' {
                    break;
                }
                bare.push(*c);
                chars.next();
            }
            if bare.is_empty() {
                SQLValue::Null
            } else {
                convert(&bare)?
            }
        };
        values.push(value);
        match chars.next() {
            Some(',') => continue,
            None => break,
            Some(c) => {
                return Err(DatabaseError::Decode(format!(
                    "unexpected character {c:?} in row text"
                )))
            }
        }
    }
    Ok(values)
}

fn parse_literal_fields(
    inner: &str,
    convert: &ValueConverter,
) -> Result<Vec<SQLValue>, DatabaseError> {
    if inner.trim().is_empty() {
        return Ok(vec![]);
    }
    let mut values = vec![];
    let mut chars = inner.chars().peekable();
    loop {
        while chars.peek() == Some(&' ') {
            chars.next();
        }
        let value = if chars.peek() == Some(&'\'') {
            chars.next();
            let mut out = String::new();
            loop {
                match chars.next() {
                    Some('\'') => {
                        if chars.peek() == Some(&'\'') {
                            chars.next();
                            out.push('\'');
                        } else {
                            break;
                        }
                    }
                    Some(c) => out.push(c),
                    None => {
                        return Err(DatabaseError::Decode(
                            "unterminated string in row literal".into(),
                        ))
                    }
                }
            }
            SQLValue::String(out)
        } else {
            let mut bare = String::new();
            while let Some(c) = chars.peek() {
                if *c == ',' {
                    break;
                }
                bare.push(*c);
                chars.next();
            }
            let bare = bare.trim();
            if bare.eq_ignore_ascii_case("NULL") {
                SQLValue::Null
            } else {
                convert(bare)?
            }
        };
        values.push(value);
        while chars.peek() == Some(&' ') {
            chars.next();
        }
        match chars.next() {
            Some(',') => continue,
            None => break,
            Some(c) => {
                return Err(DatabaseError::Decode(format!(
                    "unexpected character {c:?} in row literal"
                )))
            }
        }
    }
    Ok(values)
}
