use serde::{Deserialize, Serialize};

use crate::{database_error::DatabaseError, Database, TableId};

use super::{ExpressionBuilder, SQLBuilder};

/// A column in a physical table
#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Clone)]
pub struct PhysicalColumn {
    /// The table this column belongs to
    pub table_id: TableId,
    /// The name of the column
    pub name: String,
    /// The type of the column
    pub typ: PhysicalColumnType,
    /// Is this column a part of the PK for the table
    pub is_pk: bool,
    /// should this type have a NOT NULL constraint or not?
    pub is_nullable: bool,
}

/// Simpler implementation of Debug for PhysicalColumn. The derived implementation
/// includes every field and obscures the useful information.
impl std::fmt::Debug for PhysicalColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format!(
            "Column: {}.{}",
            &self.table_id.arr_idx(),
            &self.name
        ))
    }
}

impl PhysicalColumn {
    pub fn get_table_name(&self, database: &Database) -> String {
        database.get_table(self.table_id).name.clone()
    }
}

impl ExpressionBuilder for PhysicalColumn {
    fn build(&self, database: &Database, builder: &mut SQLBuilder) {
        builder.push_column(&database.get_table(self.table_id).name, &self.name)
    }
}

/// A stable reference to a column usable inside expression nodes (so the AST carries
/// indices, not lifetimes).
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ColumnId {
    pub table_id: TableId,
    pub column_index: usize,
}

impl ColumnId {
    pub fn get_column<'a>(&self, database: &'a Database) -> &'a PhysicalColumn {
        &database.get_table(self.table_id).columns[self.column_index]
    }
}

/// The type of a column in a physical table, with more precise information than just
/// the type name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhysicalColumnType {
    Int { bits: IntBits },
    Float { bits: FloatBits },
    Numeric { precision: Option<usize>, scale: Option<usize> },
    String { max_length: Option<usize> },
    Boolean,
    Timestamp { timezone: bool, precision: Option<usize> },
    Date,
    Json,
    Array { typ: Box<PhysicalColumnType> },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntBits {
    _16,
    _32,
    _64,
}

/// Number of bits in the float's mantissa.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatBits {
    _24,
    _53,
}

impl PhysicalColumnType {
    /// Create a physical column type from an SQL type string, e.g. when
    /// reverse-engineering an existing schema.
    pub fn from_string(s: &str) -> Result<PhysicalColumnType, DatabaseError> {
        let s = s.to_uppercase();

        if let Some(idx) = s.find('[') {
            let element_type = &s[..idx];
            let mut dims = &s[idx..];

            let mut count = 0;
            while !dims.is_empty() {
                if dims.len() >= 2 && &dims[0..2] == "[]" {
                    dims = &dims[2..];
                    count += 1;
                } else {
                    return Err(DatabaseError::Validation(format!("unknown type {s}")));
                }
            }

            let mut array_type = PhysicalColumnType::Array {
                typ: Box::new(PhysicalColumnType::from_string(element_type)?),
            };
            for _ in 1..count {
                array_type = PhysicalColumnType::Array {
                    typ: Box::new(array_type),
                };
            }
            return Ok(array_type);
        }

        let get_num = |s: &str| {
            s.chars()
                .filter(|c| c.is_numeric())
                .collect::<String>()
                .parse::<usize>()
                .ok()
        };

        Ok(match s.as_str() {
            "SMALLINT" => PhysicalColumnType::Int { bits: IntBits::_16 },
            "INT" | "INTEGER" => PhysicalColumnType::Int { bits: IntBits::_32 },
            "BIGINT" => PhysicalColumnType::Int { bits: IntBits::_64 },
            "REAL" => PhysicalColumnType::Float {
                bits: FloatBits::_24,
            },
            "DOUBLE PRECISION" => PhysicalColumnType::Float {
                bits: FloatBits::_53,
            },
            "TEXT" => PhysicalColumnType::String { max_length: None },
            "BOOLEAN" => PhysicalColumnType::Boolean,
            "DATE" => PhysicalColumnType::Date,
            "JSON" | "JSONB" => PhysicalColumnType::Json,
            s if s.starts_with("CHARACTER VARYING") || s.starts_with("VARCHAR") => {
                PhysicalColumnType::String {
                    max_length: get_num(s),
                }
            }
            s if s.starts_with("TIMESTAMP") => PhysicalColumnType::Timestamp {
                precision: get_num(s),
                timezone: s.contains("WITH TIME ZONE"),
            },
            s if s.starts_with("NUMERIC") || s.starts_with("DECIMAL") => {
                let mut nums = s
                    .trim_start_matches(|c: char| c.is_alphabetic())
                    .trim_start_matches('(')
                    .trim_end_matches(')')
                    .split(',')
                    .map(|part| part.trim().parse::<usize>().ok());
                PhysicalColumnType::Numeric {
                    precision: nums.next().flatten(),
                    scale: nums.next().flatten(),
                }
            }
            s => return Err(DatabaseError::Validation(format!("unknown type {s}"))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_types_from_string() {
        assert_eq!(
            PhysicalColumnType::from_string("integer").unwrap(),
            PhysicalColumnType::Int { bits: IntBits::_32 }
        );
        assert_eq!(
            PhysicalColumnType::from_string("numeric(10,2)").unwrap(),
            PhysicalColumnType::Numeric {
                precision: Some(10),
                scale: Some(2)
            }
        );
    }

    #[test]
    fn array_types_from_string() {
        assert_eq!(
            PhysicalColumnType::from_string("int[][]").unwrap(),
            PhysicalColumnType::Array {
                typ: Box::new(PhysicalColumnType::Array {
                    typ: Box::new(PhysicalColumnType::Int { bits: IntBits::_32 })
                })
            }
        );
    }

    #[test]
    fn unknown_type_is_an_error() {
        assert!(PhysicalColumnType::from_string("frobnicator").is_err());
    }
}
