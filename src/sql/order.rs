use super::{column::Column, Database, ExpressionBuilder, SQLBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    Asc,
    Desc,
}

/// An `ORDER BY` clause: an ordered list of (column, direction) pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy(pub Vec<(Column, Ordering)>);

impl OrderBy {
    pub fn asc(column: Column) -> Self {
        OrderBy(vec![(column, Ordering::Asc)])
    }

    pub fn desc(column: Column) -> Self {
        OrderBy(vec![(column, Ordering::Desc)])
    }
}

impl ExpressionBuilder for OrderBy {
    fn build(&self, database: &Database, builder: &mut SQLBuilder) {
        builder.push_str("ORDER BY ");
        builder.push_iter(self.0.iter(), ", ", |builder, (column, ordering)| {
            column.build(database, builder);
            builder.push_str(match ordering {
                Ordering::Asc => " ASC",
                Ordering::Desc => " DESC",
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dialect;

    #[test]
    fn multi_column_order() {
        let database = Database::default();
        let order_by = OrderBy(vec![
            (Column::Name("age".into()), Ordering::Desc),
            (Column::Name("name".into()), Ordering::Asc),
        ]);
        assert_eq!(
            order_by.to_sql(&database, &Dialect::unquoted()),
            "ORDER BY age DESC, name ASC"
        );
    }
}
