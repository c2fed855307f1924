use maybe_owned::MaybeOwned;

use super::{Database, SQLBuilder};

/// A trait for types that can build themselves into an SQL expression.
///
/// Each constituent of an SQL expression (column, table, predicate, select, etc.)
/// implements this trait, which is then used to hierarchically build the final SQL
/// string against a schema and a dialect.
pub trait ExpressionBuilder {
    /// Build the SQL expression into the given SQL builder
    fn build(&self, database: &Database, builder: &mut SQLBuilder);

    /// Build the SQL expression into a string under the given dialect. Useful for
    /// testing, where we want to assert on the generated SQL without assembling a
    /// builder by hand.
    #[cfg(test)]
    fn to_sql(&self, database: &Database, dialect: &crate::Dialect) -> String {
        let mut builder = SQLBuilder::new(dialect.clone());
        self.build(database, &mut builder);
        builder.into_sql()
    }
}

impl<T> ExpressionBuilder for Box<T>
where
    T: ExpressionBuilder,
{
    fn build(&self, database: &Database, builder: &mut SQLBuilder) {
        self.as_ref().build(database, builder)
    }
}

impl<'a, T> ExpressionBuilder for MaybeOwned<'a, T>
where
    T: ExpressionBuilder,
{
    fn build(&self, database: &Database, builder: &mut SQLBuilder) {
        self.as_ref().build(database, builder)
    }
}

impl<T> ExpressionBuilder for &T
where
    T: ExpressionBuilder,
{
    fn build(&self, database: &Database, builder: &mut SQLBuilder) {
        (**self).build(database, builder)
    }
}
