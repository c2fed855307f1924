use super::{Database, ExpressionBuilder, SQLBuilder};

/// A `LIMIT` clause, rendered as an inline literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit(pub u64);

impl ExpressionBuilder for Limit {
    fn build(&self, _database: &Database, builder: &mut SQLBuilder) {
        builder.push_str("LIMIT ");
        builder.push_str(self.0.to_string());
    }
}
