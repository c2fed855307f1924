use super::{
    predicate::ConcretePredicate, table::Table, Database, ExpressionBuilder, SQLBuilder,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
}

impl JoinKind {
    fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::LeftOuter => "LEFT OUTER JOIN",
        }
    }
}

/// The join condition: an `ON` predicate or a `USING` column list.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinCondition {
    On(ConcretePredicate),
    Using(Vec<String>),
}

/// A join of two table expressions. The left side may itself be a join, which is
/// how multi-hop chains nest.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    left: Table,
    right: Table,
    kind: JoinKind,
    condition: JoinCondition,
}

impl Join {
    pub fn new(left: Table, right: Table, kind: JoinKind, condition: JoinCondition) -> Self {
        Self {
            left,
            right,
            kind,
            condition,
        }
    }

    pub fn inner(left: Table, right: Table, predicate: ConcretePredicate) -> Table {
        Table::Join(Box::new(Join::new(
            left,
            right,
            JoinKind::Inner,
            JoinCondition::On(predicate),
        )))
    }

    pub fn left_outer(left: Table, right: Table, predicate: ConcretePredicate) -> Table {
        Table::Join(Box::new(Join::new(
            left,
            right,
            JoinKind::LeftOuter,
            JoinCondition::On(predicate),
        )))
    }

    pub fn inner_using(left: Table, right: Table, columns: Vec<String>) -> Table {
        Table::Join(Box::new(Join::new(
            left,
            right,
            JoinKind::Inner,
            JoinCondition::Using(columns),
        )))
    }

    pub fn left(&self) -> &Table {
        &self.left
    }

    pub fn right(&self) -> &Table {
        &self.right
    }
}

impl ExpressionBuilder for Join {
    fn build(&self, database: &Database, builder: &mut SQLBuilder) {
        self.left.build(database, builder);
        builder.push_space();
        builder.push_str(self.kind.keyword());
        builder.push_space();
        self.right.build(database, builder);
        match &self.condition {
            JoinCondition::On(predicate) => {
                builder.push_str(" ON ");
                predicate.build_grouped(database, builder);
            }
            JoinCondition::Using(columns) => {
                builder.push_str(" USING (");
                builder.push_iter(columns.iter(), ", ", |builder, column| {
                    builder.push_identifier(column);
                });
                builder.push(')');
            }
        }
    }
}
