use crate::sql::column::Column;
use crate::sql::group_by::GroupBy;
use crate::sql::join::{Join, JoinCondition, JoinKind};
use crate::sql::limit::Limit;
use crate::sql::offset::Offset;
use crate::sql::order::OrderBy;
use crate::sql::predicate::ConcretePredicate;
use crate::sql::select::Select;
use crate::sql::table::Table;
use crate::sql::{Database, Dialect, ExpressionBuilder, SQLBuilder, TableId};

/// One join attached to a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetJoin {
    pub kind: JoinKind,
    pub table_id: TableId,
    pub alias: Option<String>,
    pub condition: JoinCondition,
}

/// An immutable, chainable query builder value.
///
/// Every chainable method returns a new dataset with exactly one option changed;
/// nothing is mutated in place, so datasets can be shared and specialized freely.
/// An empty column list selects `*`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub table_id: TableId,
    pub alias: Option<String>,
    pub columns: Vec<Column>,
    pub predicate: ConcretePredicate,
    pub joins: Vec<DatasetJoin>,
    pub group_by: Option<GroupBy>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<Limit>,
    pub offset: Option<Offset>,
}

impl Dataset {
    pub fn from_table(table_id: TableId) -> Self {
        Self {
            table_id,
            alias: None,
            columns: vec![],
            predicate: ConcretePredicate::True,
            joins: vec![],
            group_by: None,
            order_by: None,
            limit: None,
            offset: None,
        }
    }

    pub fn aliased(self, alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..self
        }
    }

    pub fn select(self, columns: Vec<Column>) -> Self {
        Self { columns, ..self }
    }

    /// And-combine the given predicate with the current filter.
    pub fn filter(self, predicate: ConcretePredicate) -> Self {
        Self {
            predicate: self.predicate.clone().and(predicate),
            ..self
        }
    }

    pub fn inner_join(
        self,
        table_id: TableId,
        alias: Option<String>,
        condition: JoinCondition,
    ) -> Self {
        self.join(JoinKind::Inner, table_id, alias, condition)
    }

    pub fn left_outer_join(
        self,
        table_id: TableId,
        alias: Option<String>,
        condition: JoinCondition,
    ) -> Self {
        self.join(JoinKind::LeftOuter, table_id, alias, condition)
    }

    fn join(
        self,
        kind: JoinKind,
        table_id: TableId,
        alias: Option<String>,
        condition: JoinCondition,
    ) -> Self {
        let mut joins = self.joins.clone();
        joins.push(DatasetJoin {
            kind,
            table_id,
            alias,
            condition,
        });
        Self { joins, ..self }
    }

    pub fn group(self, group_by: GroupBy) -> Self {
        Self {
            group_by: Some(group_by),
            ..self
        }
    }

    pub fn order(self, order_by: OrderBy) -> Self {
        Self {
            order_by: Some(order_by),
            ..self
        }
    }

    pub fn limit(self, limit: u64) -> Self {
        Self {
            limit: Some(Limit(limit)),
            ..self
        }
    }

    pub fn offset(self, offset: u64) -> Self {
        Self {
            offset: Some(Offset(offset)),
            ..self
        }
    }

    /// Fold the base table and joins into a table expression.
    pub fn table_expr(&self) -> Table {
        let base = Table::Physical {
            table_id: self.table_id,
            alias: self.alias.clone(),
        };
        self.joins.iter().fold(base, |left, join| {
            Table::Join(Box::new(Join::new(
                left,
                Table::Physical {
                    table_id: join.table_id,
                    alias: join.alias.clone(),
                },
                join.kind,
                join.condition.clone(),
            )))
        })
    }

    /// Lower into an SQL select node.
    pub fn to_select(&self) -> Select {
        Select {
            table: self.table_expr(),
            columns: self.columns.clone(),
            predicate: self.predicate.clone(),
            group_by: self.group_by.clone(),
            order_by: self.order_by.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }

    /// Render the dataset to SQL text under the given dialect.
    pub fn sql(&self, database: &Database, dialect: &Dialect) -> String {
        let mut builder = SQLBuilder::new(dialect.clone());
        self.to_select().build(database, &mut builder);
        builder.into_sql()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::physical_table::PhysicalTable;
    use crate::sql::value::SQLValue;

    #[test]
    fn chaining_does_not_mutate_the_receiver() {
        let mut database = Database::default();
        let people = database.insert_table(PhysicalTable::new("people"));

        let base = Dataset::from_table(people);
        let filtered = base.clone().filter(ConcretePredicate::Eq(
            Column::Name("age".into()),
            Column::Literal(SQLValue::Int(30)),
        ));

        assert_eq!(base.sql(&database, &Dialect::unquoted()), "SELECT * FROM people");
        assert_eq!(
            filtered.sql(&database, &Dialect::unquoted()),
            "SELECT * FROM people WHERE (age = 30)"
        );
    }

    #[test]
    fn using_join_chain() {
        let mut database = Database::default();
        let employees = database.insert_table(PhysicalTable::new("employees"));
        let managers = database.insert_table(PhysicalTable::new("managers"));

        let dataset = Dataset::from_table(employees).inner_join(
            managers,
            None,
            JoinCondition::Using(vec!["id".to_string()]),
        );
        assert_eq!(
            dataset.sql(&database, &Dialect::unquoted()),
            "SELECT * FROM employees INNER JOIN managers USING (id)"
        );
    }

    #[test]
    fn repeated_filters_and_combine() {
        let mut database = Database::default();
        let people = database.insert_table(PhysicalTable::new("people"));

        let dataset = Dataset::from_table(people)
            .filter(ConcretePredicate::Eq(
                Column::Name("x".into()),
                Column::Literal(SQLValue::Int(100)),
            ))
            .filter(ConcretePredicate::Eq(
                Column::Name("y".into()),
                Column::Literal(SQLValue::from("a")),
            ));
        assert_eq!(
            dataset.sql(&database, &Dialect::unquoted()),
            "SELECT * FROM people WHERE ((x = 100) AND (y = 'a'))"
        );
    }
}
