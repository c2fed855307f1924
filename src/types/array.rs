use crate::database_error::DatabaseError;
use crate::sql::SQLValue;

use super::{string_converter, ValueConverter};

/// One slot of an array: SQL NULL, a scalar value, or a nested array (for
/// multi-dimensional arrays).
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayElement {
    Null,
    Value(SQLValue),
    Array(Vec<ArrayElement>),
}

/// A Postgres array value: an ordered (possibly nested) element sequence plus an
/// optional element type tag used for the `::type[]` literal suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct PGArray {
    pub elements: Vec<ArrayElement>,
    pub db_type: Option<String>,
}

impl PGArray {
    pub fn new(elements: Vec<ArrayElement>, db_type: Option<String>) -> Self {
        Self { elements, db_type }
    }

    /// Parse array wire text, keeping elements as strings.
    pub fn parse(text: &str, db_type: Option<&str>) -> Result<Self, DatabaseError> {
        Self::parse_with(text, db_type, &string_converter)
    }

    /// Parse array wire text with a per-element converter. Accepts both the
    /// brace wire form (`{1,2,3}`, nested braces for higher dimensions, `"..."`
    /// quoting with backslash escapes) and the `ARRAY[...]` literal form this
    /// type itself produces. An unquoted `NULL` is the SQL null; a quoted
    /// `"NULL"` is the four-character string.
    pub fn parse_with(
        text: &str,
        db_type: Option<&str>,
        convert: &ValueConverter,
    ) -> Result<Self, DatabaseError> {
        let trimmed = text.trim();

        let (inner, braces) = if let Some(rest) = trimmed.strip_prefix("ARRAY[") {
            // The ::type[] suffix sits past the matching close bracket
            let end = matching_bracket(rest).ok_or_else(|| {
                DatabaseError::Decode(format!("unterminated array literal: {text}"))
            })?;
            (&rest[..end], false)
        } else if let Some(rest) = trimmed.strip_prefix('\'') {
            // The quoted empty-array literal, '{}'::type[]
            let end = rest.find('\'').ok_or_else(|| {
                DatabaseError::Decode(format!("unterminated array literal: {text}"))
            })?;
            let body = &rest[..end];
            let body = body
                .strip_prefix('{')
                .and_then(|b| b.strip_suffix('}'))
                .ok_or_else(|| DatabaseError::Decode(format!("malformed array text: {text}")))?;
            (body, true)
        } else {
            let body = trimmed
                .strip_prefix('{')
                .and_then(|b| b.strip_suffix('}'))
                .ok_or_else(|| DatabaseError::Decode(format!("malformed array text: {text}")))?;
            (body, true)
        };

        let mut chars = inner.chars().peekable();
        let elements = if braces {
            parse_brace_elements(&mut chars, convert)?
        } else {
            parse_bracket_elements(&mut chars, convert)?
        };
        if chars.next().is_some() {
            return Err(DatabaseError::Decode(format!(
                "trailing characters in array text: {text}"
            )));
        }
        Ok(Self::new(elements, db_type.map(|t| t.to_string())))
    }

    /// Render as an `ARRAY[...]` literal (nested arrays as inner bracket lists)
    /// with the `::type[]` suffix when an element type is declared. The empty
    /// array has no element to infer a type from, so it renders in the quoted
    /// brace form instead.
    pub fn literalize(&self) -> String {
        let suffix = self
            .db_type
            .as_ref()
            .map(|t| format!("::{t}[]"))
            .unwrap_or_default();
        if self.elements.is_empty() {
            return format!("'{{}}'{suffix}");
        }
        format!("ARRAY[{}]{suffix}", literalize_elements(&self.elements))
    }
}

fn literalize_elements(elements: &[ArrayElement]) -> String {
    elements
        .iter()
        .map(|element| match element {
            ArrayElement::Null => "NULL".to_string(),
            ArrayElement::Value(value) => value.to_literal(),
            ArrayElement::Array(inner) => format!("[{}]", literalize_elements(inner)),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

type Chars<'a> = std::iter::Peekable<std::str::Chars<'a>>;

/// Parse a comma-separated element list in the brace wire form, stopping at (and
/// consuming) nothing past the list itself. The caller has stripped the
/// enclosing braces of this level.
fn parse_brace_elements(
    chars: &mut Chars,
    convert: &ValueConverter,
) -> Result<Vec<ArrayElement>, DatabaseError> {
    let mut elements = vec![];
    loop {
        match chars.peek() {
            None => break,
            Some('{') => {
                chars.next();
                let inner = parse_brace_elements(chars, convert)?;
                if chars.next() != Some('}') {
                    return Err(DatabaseError::Decode("unbalanced braces in array text".into()));
                }
                elements.push(ArrayElement::Array(inner));
            }
            Some('"') => {
                chars.next();
                elements.push(parse_quoted(chars, convert)?);
            }
            Some(_) => {
                let bare = take_until(chars, &[',', '}']);
                let bare = bare.trim();
                if bare.eq_ignore_ascii_case("NULL") {
                    elements.push(ArrayElement::Null);
                } else {
                    elements.push(ArrayElement::Value(convert(bare)?));
                }
            }
        }
        match chars.peek() {
            Some(',') => {
                chars.next();
            }
            _ => break,
        }
    }
    Ok(elements)
}

/// Parse the element list of an `ARRAY[...]` literal level: values are SQL
/// literals (single-quoted strings), nested levels are bracket lists.
fn parse_bracket_elements(
    chars: &mut Chars,
    convert: &ValueConverter,
) -> Result<Vec<ArrayElement>, DatabaseError> {
    let mut elements = vec![];
    loop {
        while chars.peek() == Some(&' ') {
            chars.next();
        }
        match chars.peek() {
            None => break,
            Some('[') => {
                chars.next();
                let inner = parse_bracket_elements(chars, convert)?;
                if chars.next() != Some(']') {
                    return Err(DatabaseError::Decode(
                        "unbalanced brackets in array literal".into(),
                    ));
                }
                elements.push(ArrayElement::Array(inner));
            }
            Some('\'') => {
                chars.next();
                let mut out = String::new();
                loop {
                    match chars.next() {
                        Some('\'') => {
                            // A doubled quote is an escaped quote
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
                                "unterminated string in array literal".into(),
                            ))
                        }
                    }
                }
                elements.push(ArrayElement::Value(SQLValue::String(out)));
            }
            Some(_) => {
                let bare = take_until(chars, &[',', ']']);
                let bare = bare.trim();
                if bare.eq_ignore_ascii_case("NULL") {
                    elements.push(ArrayElement::Null);
                } else {
                    elements.push(ArrayElement::Value(convert(bare)?));
                }
            }
        }
        while chars.peek() == Some(&' ') {
            chars.next();
        }
        match chars.peek() {
            Some(',') => {
                chars.next();
            }
            _ => break,
        }
    }
    Ok(elements)
}

/// A quoted element in the brace wire form: `\"` and `\\` escapes, and a quoted
/// NULL is the literal string, not the SQL null.
fn parse_quoted(chars: &mut Chars, convert: &ValueConverter) -> Result<ArrayElement, DatabaseError> {
    let mut out = String::new();
    loop {
        match chars.next() {
            Some('\\') => match chars.next() {
                Some(c) => out.push(c),
                None => {
                    return Err(DatabaseError::Decode(
                        "dangling escape in array text".into(),
                    ))
                }
            },
            Some('"') => break,
            Some(c) => out.push(c),
            None => {
                return Err(DatabaseError::Decode(
                    "unterminated quoted element in array text".into(),
                ))
            }
        }
    }
    convert(&out).map(ArrayElement::Value)
}

/// The byte index of the `]` closing the already-opened bracket, skipping
/// brackets inside single-quoted strings.
fn matching_bracket(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut in_string = false;
    for (i, c) in s.char_indices() {
        match c {
            '\'' => in_string = !in_string,
            '[' if !in_string => depth += 1,
            ']' if !in_string => {
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

fn take_until(chars: &mut Chars, stops: &[char]) -> String {
    let mut out = String::new();
    while let Some(c) = chars.peek() {
        if stops.contains(c) {
            break;
        }
        out.push(*c);
        chars.next();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_converter(text: &str) -> Result<SQLValue, DatabaseError> {
        text.parse::<i64>()
            .map(SQLValue::Int)
            .map_err(|_| DatabaseError::Decode(format!("not an integer: {text}")))
    }

    fn ints(values: &[i64]) -> Vec<ArrayElement> {
        values
            .iter()
            .map(|i| ArrayElement::Value(SQLValue::Int(*i)))
            .collect()
    }

    #[test]
    fn parses_brace_form() {
        let array = PGArray::parse_with("{1,2,3}", Some("int"), &int_converter).unwrap();
        assert_eq!(array.elements, ints(&[1, 2, 3]));
    }

    #[test]
    fn parses_nested_arrays() {
        let array = PGArray::parse_with("{{1,2},{3,4}}", Some("int"), &int_converter).unwrap();
        assert_eq!(
            array.elements,
            vec![
                ArrayElement::Array(ints(&[1, 2])),
                ArrayElement::Array(ints(&[3, 4])),
            ]
        );
    }

    #[test]
    fn quoted_elements_keep_delimiters_and_escapes() {
        let array = PGArray::parse(r#"{"a,b","c\"d","e\\f"}"#, None).unwrap();
        assert_eq!(
            array.elements,
            vec![
                ArrayElement::Value(SQLValue::from("a,b")),
                ArrayElement::Value(SQLValue::from("c\"d")),
                ArrayElement::Value(SQLValue::from("e\\f")),
            ]
        );
    }

    #[test]
    fn bare_null_is_sql_null_but_quoted_null_is_a_string() {
        let array = PGArray::parse(r#"{NULL,"NULL"}"#, None).unwrap();
        assert_eq!(
            array.elements,
            vec![
                ArrayElement::Null,
                ArrayElement::Value(SQLValue::from("NULL")),
            ]
        );
    }

    #[test]
    fn literalizes_with_type_suffix() {
        let array = PGArray::new(ints(&[1, 2]), Some("int".to_string()));
        assert_eq!(array.literalize(), "ARRAY[1, 2]::int[]");
    }

    #[test]
    fn empty_array_literal_uses_braces() {
        let array = PGArray::new(vec![], Some("int".to_string()));
        assert_eq!(array.literalize(), "'{}'::int[]");
    }

    #[test]
    fn round_trips_through_the_literal_form() {
        let cases = vec![
            PGArray::new(ints(&[1, 2, 3]), Some("int".to_string())),
            PGArray::new(
                vec![
                    ArrayElement::Array(ints(&[1, 2])),
                    ArrayElement::Array(ints(&[3, 4])),
                ],
                Some("int".to_string()),
            ),
            PGArray::new(
                vec![
                    ArrayElement::Value(SQLValue::from("it's")),
                    ArrayElement::Null,
                ],
                Some("text".to_string()),
            ),
            PGArray::new(vec![], Some("int".to_string())),
        ];
        for array in cases {
            let converter: &ValueConverter = if array.db_type.as_deref() == Some("int") {
                &int_converter
            } else {
                &string_converter
            };
            let reparsed =
                PGArray::parse_with(&array.literalize(), array.db_type.as_deref(), converter)
                    .unwrap();
            assert_eq!(reparsed, array);
        }
    }

    fn float_converter(text: &str) -> Result<SQLValue, DatabaseError> {
        text.parse::<f64>()
            .map(SQLValue::Float)
            .map_err(|_| DatabaseError::Decode(format!("not a float: {text}")))
    }

    fn numeric_converter(text: &str) -> Result<SQLValue, DatabaseError> {
        text.parse::<rust_decimal::Decimal>()
            .map(SQLValue::Numeric)
            .map_err(|_| DatabaseError::Decode(format!("not a numeric: {text}")))
    }

    #[test]
    fn float_elements_round_trip() {
        let array = PGArray::new(
            vec![
                ArrayElement::Value(SQLValue::Float(1.5)),
                ArrayElement::Value(SQLValue::Float(-0.25)),
                ArrayElement::Null,
            ],
            Some("float8".to_string()),
        );
        assert_eq!(array.literalize(), "ARRAY[1.5, -0.25, NULL]::float8[]");
        assert_eq!(
            PGArray::parse_with(&array.literalize(), Some("float8"), &float_converter).unwrap(),
            array
        );
    }

    #[test]
    fn numeric_elements_round_trip() {
        let dec = |s: &str| {
            ArrayElement::Value(SQLValue::Numeric(s.parse::<rust_decimal::Decimal>().unwrap()))
        };
        let array = PGArray::new(
            vec![dec("3.14"), dec("-0.001"), dec("100")],
            Some("numeric".to_string()),
        );
        assert_eq!(array.literalize(), "ARRAY[3.14, -0.001, 100]::numeric[]");
        assert_eq!(
            PGArray::parse_with(&array.literalize(), Some("numeric"), &numeric_converter).unwrap(),
            array
        );
        assert_eq!(
            PGArray::parse_with("{3.14,-0.001,100}", Some("numeric"), &numeric_converter).unwrap(),
            array
        );
    }

    #[test]
    fn truncated_text_is_a_decode_error() {
        assert!(matches!(
            PGArray::parse("{1,2", None),
            Err(DatabaseError::Decode(_))
        ));
        assert!(matches!(
            PGArray::parse(r#"{"abc}"#, None),
            Err(DatabaseError::Decode(_))
        ));
    }
}
