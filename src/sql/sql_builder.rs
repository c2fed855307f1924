use super::{Dialect, ExpressionBuilder, SQLValue};
use crate::Database;

/// Accumulates SQL text under a dialect. Identifier quoting and input-side case
/// mangling happen here, so expression nodes stay dialect-agnostic.
pub struct SQLBuilder {
    sql: String,
    dialect: Dialect,
}

impl SQLBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            sql: String::new(),
            dialect,
        }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Push a string
    pub fn push_str<T: AsRef<str>>(&mut self, s: T) {
        self.sql.push_str(s.as_ref());
    }

    /// Push a character
    pub fn push(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Push a space. This is a common operation, so it is provided as a separate method.
    pub fn push_space(&mut self) {
        self.sql.push(' ');
    }

    /// Push an identifier, applying the dialect's input case transform and quoting.
    pub fn push_identifier<T: AsRef<str>>(&mut self, s: T) {
        let name = self.dialect.input_identifier(s.as_ref());
        if self.dialect.quote_identifiers {
            self.sql.push('"');
            self.sql.push_str(&name);
            self.sql.push('"');
        } else {
            self.sql.push_str(&name);
        }
    }

    /// Push `<qualifier>.<column_name>`, e.g. a table-or-alias qualified column.
    pub fn push_column<T: AsRef<str>>(&mut self, qualifier: T, column_name: T) {
        self.push_identifier(qualifier);
        self.push('.');
        self.push_identifier(column_name);
    }

    /// Push a value as an inline literal.
    pub fn push_value(&mut self, value: &SQLValue) {
        self.sql.push_str(&value.to_literal());
    }

    /// Push elements of an iterator, separated by `sep`. The `push_elem` function
    /// provides the flexibility to map the elements (compared to
    /// [`SQLBuilder::push_elems`], which assumes that the elements implement
    /// [`ExpressionBuilder`] and [`build`](ExpressionBuilder::build) is all you need to
    /// call).
    pub fn push_iter<T>(
        &mut self,
        iter: impl ExactSizeIterator<Item = T>,
        sep: &str,
        push_elem: impl Fn(&mut Self, T),
    ) {
        let len = iter.len();
        for (i, item) in iter.enumerate() {
            push_elem(self, item);

            if i < len - 1 {
                self.sql.push_str(sep);
            }
        }
    }

    /// Push elements of a slice, separated by `sep`. The elements must themselves
    /// implement `ExpressionBuilder`.
    pub fn push_elems<T: ExpressionBuilder>(
        &mut self,
        database: &Database,
        elems: &[T],
        sep: &str,
    ) {
        self.push_iter(elems.iter(), sep, |builder, elem| {
            elem.build(database, builder);
        });
    }

    /// Get the SQL string. Calling this method is the final step in building an SQL
    /// expression, and thus consumes the builder.
    pub fn into_sql(self) -> String {
        self.sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_identifier() {
        let mut builder = SQLBuilder::new(Dialect::postgres());
        builder.push_column("people", "age");
        assert_eq!(builder.into_sql(), r#""people"."age""#);
    }

    #[test]
    fn unquoted_identifier() {
        let mut builder = SQLBuilder::new(Dialect::unquoted());
        builder.push_column("people", "age");
        assert_eq!(builder.into_sql(), "people.age");
    }

    #[test]
    fn input_case_applies_before_quoting() {
        let dialect = Dialect {
            identifier_input_method: Some(crate::sql::dialect::IdentifierCase::Uppercase),
            ..Dialect::postgres()
        };
        let mut builder = SQLBuilder::new(dialect);
        builder.push_identifier("people");
        assert_eq!(builder.into_sql(), r#""PEOPLE""#);
    }
}
