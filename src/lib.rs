//! SQL expression compiler with dialect-aware literalization and an
//! association-graph-to-join compiler.
//!
//! The crate is organized in three layers:
//! - The [`sql`] module defines the SQL expression nodes (columns, predicates,
//!   joins, selects) and the [`SQLBuilder`] that renders them to dialect-correct
//!   SQL text against a [`Database`] schema registry.
//! - The [`asql`] module defines the declarative layer: immutable chainable
//!   [`asql::dataset::Dataset`] values and [`asql::association::Association`]
//!   reflections describing relationships between tables.
//! - The [`transform`] module compiles the declarative layer into SQL: lazy and
//!   batched eager association loads, single-query eager graphs, limit-per-group
//!   strategies, and class-table inheritance datasets.
//!
//! The [`types`] module supplies parse/literalize round-trips for Postgres
//! compound values (arrays, ranges, multiranges, row values) and JSON operator
//! expressions, and [`pool`] provides an async dispatch pool that runs dataset
//! actions on worker threads behind lazily-resolved proxy values.

pub mod asql;
pub mod connection;
pub mod database_error;
pub mod pool;
pub mod sql;
pub mod transform;
pub mod types;

pub use connection::{Connection, Row};
pub use database_error::DatabaseError;
pub use sql::column::Column;
pub use sql::predicate::{ConcretePredicate, Predicate};
pub use sql::{Database, Dialect, ExpressionBuilder, IdentifierCase, SQLBuilder, SQLValue, SerializableSlab, TableId};
