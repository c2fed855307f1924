use super::{column::Column, Database, ExpressionBuilder, SQLBuilder};

/// A `GROUP BY` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy(pub Vec<Column>);

impl ExpressionBuilder for GroupBy {
    fn build(&self, database: &Database, builder: &mut SQLBuilder) {
        builder.push_str("GROUP BY ");
        builder.push_elems(database, &self.0, ", ");
    }
}
