use crate::sql::column::Column;
use crate::sql::limit::Limit;
use crate::sql::offset::Offset;
use crate::sql::order::OrderBy;
use crate::sql::predicate::ConcretePredicate;
use crate::sql::select::Select;
use crate::sql::table::Table;
use crate::sql::{Database, Dialect};

use super::{LimitContext, LimitStrategy};

const SUBQUERY_ALIAS: &str = "t1";

/// Limit per group by filtering the main query with `pk IN (subquery)`, where the
/// subquery re-selects the target table under an alias, correlated on the
/// foreign-key columns, ordered and limited per group. Works on every dialect;
/// assumes the foreign-key columns live on the target table itself (through
/// chains use the window-function strategy).
pub struct CorrelatedSubqueryStrategy;

fn requalify(column: Column, from: &str, to: &str) -> Column {
    match column {
        Column::Qualified { qualifier, name } if qualifier == from => Column::Qualified {
            qualifier: to.to_string(),
            name,
        },
        other => other,
    }
}

impl LimitStrategy for CorrelatedSubqueryStrategy {
    fn id(&self) -> &'static str {
        "CorrelatedSubqueryStrategy"
    }

    fn suitable(&self, _dialect: &Dialect) -> bool {
        true
    }

    fn apply(&self, database: &Database, select: Select, context: &LimitContext) -> Select {
        let Some(target_table) = database.get_table_id(context.pk_qualifier) else {
            tracing::warn!(
                "cannot build correlated limit subquery: {} is not a table",
                context.pk_qualifier
            );
            return select;
        };

        let correlation = ConcretePredicate::all(context.fk_columns.iter().map(|column| {
            ConcretePredicate::Eq(
                Column::Qualified {
                    qualifier: SUBQUERY_ALIAS.to_string(),
                    name: column.clone(),
                },
                Column::Qualified {
                    qualifier: context.fk_qualifier.to_string(),
                    name: column.clone(),
                },
            )
        }));

        let order_by = context.order_by.map(|order_by| {
            OrderBy(
                order_by
                    .0
                    .iter()
                    .map(|(column, ordering)| {
                        (
                            requalify(column.clone(), context.pk_qualifier, SUBQUERY_ALIAS),
                            *ordering,
                        )
                    })
                    .collect(),
            )
        });

        let subquery = Select {
            table: Table::aliased(target_table, SUBQUERY_ALIAS),
            columns: context
                .pk_columns
                .iter()
                .map(|column| Column::Qualified {
                    qualifier: SUBQUERY_ALIAS.to_string(),
                    name: column.clone(),
                })
                .collect(),
            predicate: correlation,
            group_by: None,
            order_by,
            limit: Some(Limit(context.limit)),
            offset: context.offset.map(Offset),
        };

        let pk: Vec<Column> = context
            .pk_columns
            .iter()
            .map(|column| Column::Qualified {
                qualifier: context.pk_qualifier.to_string(),
                name: column.clone(),
            })
            .collect();
        let pk_expr = if pk.len() == 1 {
            pk.into_iter().next().unwrap_or(Column::Null)
        } else {
            Column::RowValue(pk)
        };

        let in_subquery = ConcretePredicate::In(pk_expr, Column::SubSelect(Box::new(subquery)));

        Select {
            predicate: select.predicate.clone().and(in_subquery),
            ..select
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asql::dataset::Dataset;
    use crate::sql::order::Ordering;
    use crate::sql::ExpressionBuilder;
    use crate::transform::test_util::TestSetup;

    #[test]
    fn correlated_limit_subquery() {
        TestSetup::with_setup(|setup| {
            let order_by = OrderBy(vec![(
                Column::Qualified {
                    qualifier: "albums".to_string(),
                    name: "title".to_string(),
                },
                Ordering::Asc,
            )]);
            let fk_columns = vec!["artist_id".to_string()];
            let pk_columns = vec!["id".to_string()];
            let context = LimitContext {
                fk_qualifier: "albums",
                fk_columns: &fk_columns,
                pk_qualifier: "albums",
                pk_columns: &pk_columns,
                order_by: Some(&order_by),
                limit: 2,
                offset: Some(1),
            };

            let select = Dataset::from_table(setup.albums_table).to_select();
            let limited = CorrelatedSubqueryStrategy.apply(&setup.database, select, &context);
            assert_eq!(
                limited.to_sql(&setup.database, &Dialect::unquoted()),
                "SELECT * FROM albums WHERE (albums.id IN \
                 (SELECT t1.id FROM albums AS t1 WHERE (t1.artist_id = albums.artist_id) \
                 ORDER BY t1.title ASC LIMIT 2 OFFSET 1))"
            );
        });
    }
}
