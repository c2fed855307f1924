use super::{column::Column, predicate::ConcretePredicate, value::SQLValue};

/// The right-hand side of one condition pair.
#[derive(Debug, Clone, PartialEq)]
pub enum CondValue {
    Value(SQLValue),
    List(Vec<SQLValue>),
    Column(Column),
}

impl From<SQLValue> for CondValue {
    fn from(value: SQLValue) -> Self {
        CondValue::Value(value)
    }
}

impl From<Vec<SQLValue>> for CondValue {
    fn from(values: Vec<SQLValue>) -> Self {
        CondValue::List(values)
    }
}

impl From<Column> for CondValue {
    fn from(column: Column) -> Self {
        CondValue::Column(column)
    }
}

/// An ordered list of (column, value) condition pairs, convertible to a filter
/// predicate in four ways: and-combined, and-combined negated, or-combined, and
/// the De Morgan inversion of the and-combination.
///
/// Per-pair translation depends on the value: NULL becomes `IS NULL`, booleans
/// become `IS TRUE`/`IS FALSE`, a list becomes `IN`, anything else an equality.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConditionList {
    pairs: Vec<(Column, CondValue)>,
}

impl ConditionList {
    pub fn new(pairs: Vec<(Column, CondValue)>) -> Self {
        Self { pairs }
    }

    fn pair_predicate(column: &Column, value: &CondValue) -> ConcretePredicate {
        match value {
            CondValue::Value(SQLValue::Null) => ConcretePredicate::IsNull(column.clone()),
            CondValue::Value(SQLValue::Bool(true)) => ConcretePredicate::IsTrue(column.clone()),
            CondValue::Value(SQLValue::Bool(false)) => ConcretePredicate::IsFalse(column.clone()),
            CondValue::Value(value) => {
                ConcretePredicate::Eq(column.clone(), Column::Literal(value.clone()))
            }
            CondValue::List(values) => ConcretePredicate::In(
                column.clone(),
                Column::List(values.iter().cloned().map(Column::Literal).collect()),
            ),
            CondValue::Column(rhs) => ConcretePredicate::Eq(column.clone(), rhs.clone()),
        }
    }

    fn pair_negation(column: &Column, value: &CondValue) -> ConcretePredicate {
        match value {
            CondValue::Value(SQLValue::Null) => ConcretePredicate::IsNotNull(column.clone()),
            CondValue::Value(SQLValue::Bool(true)) => ConcretePredicate::IsNotTrue(column.clone()),
            CondValue::Value(SQLValue::Bool(false)) => {
                ConcretePredicate::IsNotFalse(column.clone())
            }
            CondValue::Value(value) => {
                ConcretePredicate::Neq(column.clone(), Column::Literal(value.clone()))
            }
            CondValue::List(values) => ConcretePredicate::NotIn(
                column.clone(),
                Column::List(values.iter().cloned().map(Column::Literal).collect()),
            ),
            CondValue::Column(rhs) => ConcretePredicate::Neq(column.clone(), rhs.clone()),
        }
    }

    /// And-combination of the pair predicates.
    pub fn expr(&self) -> ConcretePredicate {
        ConcretePredicate::all(
            self.pairs
                .iter()
                .map(|(column, value)| Self::pair_predicate(column, value)),
        )
    }

    /// And-combination of the per-pair negations (the dual of [`expr`](Self::expr)
    /// pair by pair, still joined with AND).
    pub fn negate(&self) -> ConcretePredicate {
        ConcretePredicate::all(
            self.pairs
                .iter()
                .map(|(column, value)| Self::pair_negation(column, value)),
        )
    }

    /// Or-combination of the pair predicates.
    pub fn or_expr(&self) -> ConcretePredicate {
        ConcretePredicate::any(
            self.pairs
                .iter()
                .map(|(column, value)| Self::pair_predicate(column, value)),
        )
    }

    /// De Morgan inversion of [`expr`](Self::expr): each pair negated, and the
    /// combinator flipped from AND to OR.
    pub fn invert(&self) -> ConcretePredicate {
        ConcretePredicate::any(
            self.pairs
                .iter()
                .map(|(column, value)| Self::pair_negation(column, value)),
        )
    }
}
