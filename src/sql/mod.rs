pub mod case;
pub mod column;
pub mod conditions;
pub mod database;
pub mod dialect;
pub mod expression_builder;
pub mod function;
pub mod group_by;
pub mod join;
pub mod limit;
pub mod offset;
pub mod order;
pub mod physical_column;
pub mod physical_table;
pub mod predicate;
pub mod select;
pub mod sql_builder;
pub mod table;
pub mod value;

pub use database::{Database, SerializableSlab, TableId};
pub use dialect::{Dialect, IdentifierCase};
pub use expression_builder::ExpressionBuilder;
pub use sql_builder::SQLBuilder;
pub use value::SQLValue;
