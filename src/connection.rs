use indexmap::IndexMap;

use crate::database_error::DatabaseError;
use crate::sql::SQLValue;

/// A fetched row: column names to values, in select order.
pub type Row = IndexMap<String, SQLValue>;

/// The execution boundary. The compilers in this crate produce SQL text; running it
/// is delegated to an injected connection (a real driver in production, a scripted
/// mock in tests).
pub trait Connection: Send + Sync {
    /// Execute a statement, returning the affected row count.
    fn execute(&self, sql: &str) -> Result<u64, DatabaseError>;

    /// Execute a query and fetch all resulting rows.
    fn fetch_rows(&self, sql: &str) -> Result<Vec<Row>, DatabaseError>;
}
