use super::{
    column::Column, group_by::GroupBy, limit::Limit, offset::Offset, order::OrderBy,
    predicate::ConcretePredicate, table::Table, Database, ExpressionBuilder, SQLBuilder,
};

/// A `SELECT` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: Table,
    /// An empty list renders as `SELECT *`.
    pub columns: Vec<Column>,
    pub predicate: ConcretePredicate,
    pub group_by: Option<GroupBy>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<Limit>,
    pub offset: Option<Offset>,
}

impl Select {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            columns: vec![],
            predicate: ConcretePredicate::True,
            group_by: None,
            order_by: None,
            limit: None,
            offset: None,
        }
    }
}

impl ExpressionBuilder for Select {
    fn build(&self, database: &Database, builder: &mut SQLBuilder) {
        builder.push_str("SELECT ");

        if self.columns.is_empty() {
            builder.push('*');
        } else {
            builder.push_elems(database, &self.columns, ", ");
        }

        builder.push_str(" FROM ");
        self.table.build(database, builder);

        // A TRUE predicate elides the WHERE clause entirely
        if self.predicate != ConcretePredicate::True {
            builder.push_str(" WHERE ");
            self.predicate.build_grouped(database, builder);
        }

        if let Some(group_by) = &self.group_by {
            builder.push_space();
            group_by.build(database, builder);
        }
        if let Some(order_by) = &self.order_by {
            builder.push_space();
            order_by.build(database, builder);
        }
        if let Some(limit) = &self.limit {
            builder.push_space();
            limit.build(database, builder);
        }
        if let Some(offset) = &self.offset {
            builder.push_space();
            offset.build(database, builder);
        }
    }
}
