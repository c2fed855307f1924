pub mod array;
pub mod json_ops;
pub mod multirange;
pub mod range;
pub mod row_type;

use indexmap::IndexMap;

use crate::database_error::DatabaseError;
use crate::sql::SQLValue;

use array::PGArray;
use multirange::PGMultiRange;
use range::PGRange;
use row_type::PGRowValue;

/// Converts one bare value text into a typed value. Supplied at registration
/// time; the default keeps values as strings.
pub type ValueConverter = dyn Fn(&str) -> Result<SQLValue, DatabaseError> + Send + Sync;

pub(crate) fn string_converter(text: &str) -> Result<SQLValue, DatabaseError> {
    Ok(SQLValue::String(text.to_string()))
}

/// Which compound family a registered type belongs to.
#[derive(Debug, Clone, PartialEq)]
enum TypeKind {
    Array,
    Range,
    MultiRange,
    Row { fields: Option<Vec<String>> },
}

struct RegisteredType {
    kind: TypeKind,
    oid: Option<u32>,
    converter: Option<Box<ValueConverter>>,
}

/// A compound value produced by [`TypeRegistry::typecast`].
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Array(PGArray),
    Range(PGRange),
    MultiRange(PGMultiRange),
    Row(PGRowValue),
}

impl TypedValue {
    pub fn literalize(&self) -> String {
        match self {
            TypedValue::Array(array) => array.literalize(),
            TypedValue::Range(range) => range.literalize(),
            TypedValue::MultiRange(multirange) => multirange.literalize(),
            TypedValue::Row(row) => row.literalize(),
        }
    }
}

/// The compound types known to one configuration: the extension point through
/// which array, range, multirange and row types are plugged in, each with an
/// optional OID and an optional per-value converter. Owned by a configuration
/// object with an explicit init/reset lifecycle, never a process-wide global.
#[derive(Default)]
pub struct TypeRegistry {
    types: IndexMap<String, RegisteredType>,
}

type OptionalConverter = Option<Box<ValueConverter>>;

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.types.clear();
    }

    pub fn register_array_type(
        &mut self,
        name: impl Into<String>,
        oid: Option<u32>,
        converter: OptionalConverter,
    ) {
        self.register(name.into(), TypeKind::Array, oid, converter);
    }

    pub fn register_range_type(
        &mut self,
        name: impl Into<String>,
        oid: Option<u32>,
        converter: OptionalConverter,
    ) {
        self.register(name.into(), TypeKind::Range, oid, converter);
    }

    pub fn register_multirange_type(
        &mut self,
        name: impl Into<String>,
        oid: Option<u32>,
        converter: OptionalConverter,
    ) {
        self.register(name.into(), TypeKind::MultiRange, oid, converter);
    }

    pub fn register_row_type(
        &mut self,
        name: impl Into<String>,
        oid: Option<u32>,
        fields: Option<Vec<String>>,
        converter: OptionalConverter,
    ) {
        self.register(name.into(), TypeKind::Row { fields }, oid, converter);
    }

    fn register(
        &mut self,
        name: String,
        kind: TypeKind,
        oid: Option<u32>,
        converter: OptionalConverter,
    ) {
        self.types.insert(
            name,
            RegisteredType {
                kind,
                oid,
                converter,
            },
        );
    }

    pub fn oid_of(&self, name: &str) -> Option<u32> {
        self.types.get(name).and_then(|t| t.oid)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Typecast wire text under a declared type name. An unregistered name is a
    /// configuration error; corrupt text surfaces as a decode error from the
    /// family parser.
    pub fn typecast(&self, name: &str, text: &str) -> Result<TypedValue, DatabaseError> {
        let registered = self.types.get(name).ok_or_else(|| {
            DatabaseError::Config(format!("no registered type named {name}"))
        })?;
        let convert: &ValueConverter = match &registered.converter {
            Some(converter) => converter.as_ref(),
            None => &string_converter,
        };

        Ok(match &registered.kind {
            TypeKind::Array => {
                TypedValue::Array(PGArray::parse_with(text, Some(name), convert)?)
            }
            TypeKind::Range => TypedValue::Range(PGRange::parse_with(text, name, convert)?),
            TypeKind::MultiRange => {
                TypedValue::MultiRange(PGMultiRange::parse_with(text, name, convert)?)
            }
            TypeKind::Row { fields } => TypedValue::Row(PGRowValue::parse_with(
                text,
                Some(name),
                fields.clone(),
                convert,
            )?),
        })
    }
}
