use super::{column::Column, Database, ExpressionBuilder, SQLBuilder};

pub type ConcretePredicate = Predicate<Column>;

/// A boolean filter expression over column-position operands.
///
/// Rendering parenthesizes exactly enough to preserve precedence: a comparison
/// renders bare (`x = 100`), while `And`/`Or`/`Not` render with their own
/// enclosing parentheses and wrap each non-self-grouping operand, so an
/// and-combination of two equalities renders as `((x = 100) AND (y = 'a'))`.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<C>
where
    C: PartialEq,
{
    True,
    False,
    Eq(C, C),
    Neq(C, C),
    Lt(C, C),
    Lte(C, C),
    Gt(C, C),
    Gte(C, C),
    In(C, C),
    NotIn(C, C),
    IsNull(C),
    IsNotNull(C),
    IsTrue(C),
    IsNotTrue(C),
    IsFalse(C),
    IsNotFalse(C),
    And(Box<Predicate<C>>, Box<Predicate<C>>),
    Or(Box<Predicate<C>>, Box<Predicate<C>>),
    Not(Box<Predicate<C>>),
}

impl<C> Predicate<C>
where
    C: PartialEq,
{
    /// Conjunction with short-circuit simplification, so chains of `and` never
    /// accumulate redundant `TRUE`/`FALSE` nodes.
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Predicate::True, p) | (p, Predicate::True) => p,
            (Predicate::False, _) | (_, Predicate::False) => Predicate::False,
            (lhs, rhs) => Predicate::And(Box::new(lhs), Box::new(rhs)),
        }
    }

    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Predicate::True, _) | (_, Predicate::True) => Predicate::True,
            (Predicate::False, p) | (p, Predicate::False) => p,
            (lhs, rhs) => Predicate::Or(Box::new(lhs), Box::new(rhs)),
        }
    }

    pub fn not(self) -> Self {
        match self {
            Predicate::True => Predicate::False,
            Predicate::False => Predicate::True,
            Predicate::Not(inner) => *inner,
            p => Predicate::Not(Box::new(p)),
        }
    }

    /// Fold a sequence of predicates into a conjunction. An empty sequence is `TRUE`.
    pub fn all(predicates: impl IntoIterator<Item = Self>) -> Self {
        predicates
            .into_iter()
            .fold(Predicate::True, Predicate::and)
    }

    /// Fold a sequence of predicates into a disjunction. An empty sequence is `FALSE`.
    pub fn any(predicates: impl IntoIterator<Item = Self>) -> Self {
        predicates.into_iter().fold(Predicate::False, Predicate::or)
    }

    /// True for variants that render with their own enclosing parentheses, so
    /// wrapping contexts need not add another pair.
    fn is_self_grouping(&self) -> bool {
        matches!(
            self,
            Predicate::And(..) | Predicate::Or(..) | Predicate::Not(..)
        )
    }
}

impl ConcretePredicate {
    pub fn eq(lhs: Column, rhs: Column) -> Self {
        Predicate::Eq(lhs, rhs)
    }

    /// Render the predicate parenthesized unless it already carries its own
    /// parentheses. WHERE clauses and boolean operands render through this.
    pub(crate) fn build_grouped(&self, database: &Database, builder: &mut SQLBuilder) {
        if self.is_self_grouping() {
            self.build(database, builder);
        } else {
            builder.push('(');
            self.build(database, builder);
            builder.push(')');
        }
    }
}

impl ExpressionBuilder for ConcretePredicate {
    fn build(&self, database: &Database, builder: &mut SQLBuilder) {
        fn binary(
            database: &Database,
            builder: &mut SQLBuilder,
            lhs: &Column,
            op: &str,
            rhs: &Column,
        ) {
            lhs.build(database, builder);
            builder.push_str(op);
            rhs.build(database, builder);
        }

        fn postfix(database: &Database, builder: &mut SQLBuilder, col: &Column, op: &str) {
            col.build(database, builder);
            builder.push_str(op);
        }

        match self {
            Predicate::True => builder.push_str("TRUE"),
            Predicate::False => builder.push_str("FALSE"),
            Predicate::Eq(lhs, rhs) => binary(database, builder, lhs, " = ", rhs),
            Predicate::Neq(lhs, rhs) => binary(database, builder, lhs, " != ", rhs),
            Predicate::Lt(lhs, rhs) => binary(database, builder, lhs, " < ", rhs),
            Predicate::Lte(lhs, rhs) => binary(database, builder, lhs, " <= ", rhs),
            Predicate::Gt(lhs, rhs) => binary(database, builder, lhs, " > ", rhs),
            Predicate::Gte(lhs, rhs) => binary(database, builder, lhs, " >= ", rhs),
            Predicate::In(lhs, rhs) => binary(database, builder, lhs, " IN ", rhs),
            Predicate::NotIn(lhs, rhs) => binary(database, builder, lhs, " NOT IN ", rhs),
            Predicate::IsNull(col) => postfix(database, builder, col, " IS NULL"),
            Predicate::IsNotNull(col) => postfix(database, builder, col, " IS NOT NULL"),
            Predicate::IsTrue(col) => postfix(database, builder, col, " IS TRUE"),
            Predicate::IsNotTrue(col) => postfix(database, builder, col, " IS NOT TRUE"),
            Predicate::IsFalse(col) => postfix(database, builder, col, " IS FALSE"),
            Predicate::IsNotFalse(col) => postfix(database, builder, col, " IS NOT FALSE"),
            Predicate::And(lhs, rhs) => {
                builder.push('(');
                lhs.build_grouped(database, builder);
                builder.push_str(" AND ");
                rhs.build_grouped(database, builder);
                builder.push(')');
            }
            Predicate::Or(lhs, rhs) => {
                builder.push('(');
                lhs.build_grouped(database, builder);
                builder.push_str(" OR ");
                rhs.build_grouped(database, builder);
                builder.push(')');
            }
            Predicate::Not(inner) => {
                builder.push_str("(NOT ");
                inner.build_grouped(database, builder);
                builder.push(')');
            }
        }
    }
}
