use crate::database_error::DatabaseError;

use super::{column::Column, predicate::ConcretePredicate, Database, ExpressionBuilder, SQLBuilder};

/// A `CASE WHEN ... THEN ... ELSE ... END` expression: an ordered list of
/// (condition, result) pairs plus a mandatory else branch.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseExpr {
    whens: Vec<(ConcretePredicate, Column)>,
    else_branch: Box<Column>,
}

impl CaseExpr {
    /// Fails when given zero pairs; a CASE with only an ELSE branch is malformed.
    pub fn new(
        whens: Vec<(ConcretePredicate, Column)>,
        else_branch: Column,
    ) -> Result<Self, DatabaseError> {
        if whens.is_empty() {
            return Err(DatabaseError::Config(
                "CASE expression requires at least one WHEN/THEN pair".into(),
            ));
        }
        Ok(Self {
            whens,
            else_branch: Box::new(else_branch),
        })
    }
}

impl ExpressionBuilder for CaseExpr {
    fn build(&self, database: &Database, builder: &mut SQLBuilder) {
        builder.push_str("(CASE");
        for (condition, result) in &self.whens {
            builder.push_str(" WHEN ");
            condition.build(database, builder);
            builder.push_str(" THEN ");
            result.build(database, builder);
        }
        builder.push_str(" ELSE ");
        self.else_branch.build(database, builder);
        builder.push_str(" END)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::value::SQLValue;
    use crate::Dialect;

    #[test]
    fn empty_case_is_rejected() {
        let result = CaseExpr::new(vec![], Column::Literal(SQLValue::Int(0)));
        assert!(matches!(result, Err(DatabaseError::Config(_))));
    }

    #[test]
    fn case_rendering() {
        let database = Database::default();
        let case = CaseExpr::new(
            vec![(
                ConcretePredicate::Gt(
                    Column::Name("age".into()),
                    Column::Literal(SQLValue::Int(17)),
                ),
                Column::Literal(SQLValue::from("adult")),
            )],
            Column::Literal(SQLValue::from("minor")),
        )
        .unwrap();

        assert_eq!(
            case.to_sql(&database, &Dialect::unquoted()),
            "(CASE WHEN age > 17 THEN 'adult' ELSE 'minor' END)"
        );
    }
}
