use super::{Database, ExpressionBuilder, SQLBuilder};

/// An `OFFSET` clause, rendered as an inline literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset(pub u64);

impl ExpressionBuilder for Offset {
    fn build(&self, _database: &Database, builder: &mut SQLBuilder) {
        builder.push_str("OFFSET ");
        builder.push_str(self.0.to_string());
    }
}
