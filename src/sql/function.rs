use super::{column::Column, order::OrderBy, Database, ExpressionBuilder, SQLBuilder};

/// A function application. Window functions carry their OVER clause, since the
/// limit-per-group compiler partitions by foreign-key columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    Named {
        function_name: String,
        args: Vec<Column>,
    },
    /// `row_number() OVER (PARTITION BY ... ORDER BY ...)`
    RowNumberOver {
        partition_by: Vec<Column>,
        order_by: Option<OrderBy>,
    },
}

impl ExpressionBuilder for Function {
    fn build(&self, database: &Database, builder: &mut SQLBuilder) {
        match self {
            Function::Named {
                function_name,
                args,
            } => {
                builder.push_str(function_name);
                builder.push('(');
                builder.push_elems(database, args, ", ");
                builder.push(')');
            }
            Function::RowNumberOver {
                partition_by,
                order_by,
            } => {
                builder.push_str("row_number() OVER (PARTITION BY ");
                builder.push_elems(database, partition_by, ", ");
                if let Some(order_by) = order_by {
                    builder.push_space();
                    order_by.build(database, builder);
                }
                builder.push(')');
            }
        }
    }
}
