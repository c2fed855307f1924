use crate::sql::column::Column;
use crate::sql::function::Function;
use crate::sql::predicate::ConcretePredicate;
use crate::sql::select::Select;
use crate::sql::table::Table;
use crate::sql::{Database, Dialect, SQLValue};

use super::{LimitContext, LimitStrategy};

/// The alias under which the per-group row number is exposed in the wrapping
/// query. Kept short enough to fit every backend's identifier-length limit.
pub const ROW_NUMBER_ALIAS: &str = "x_row_number_x";

/// Limit per group by wrapping the join query in an outer query that computes
/// `row_number() OVER (PARTITION BY <fk> ORDER BY <assoc order>)` and filters on
/// the row number. Requires window-function support from the dialect.
pub struct WindowFunctionStrategy;

impl LimitStrategy for WindowFunctionStrategy {
    fn id(&self) -> &'static str {
        "WindowFunctionStrategy"
    }

    fn suitable(&self, dialect: &Dialect) -> bool {
        dialect.supports_window_functions
    }

    fn apply(&self, _database: &Database, select: Select, context: &LimitContext) -> Select {
        let mut inner = select;
        if inner.columns.is_empty() {
            inner.columns.push(Column::Star(None));
        }

        let partition_by = context
            .fk_columns
            .iter()
            .map(|column| Column::Qualified {
                qualifier: context.fk_qualifier.to_string(),
                name: column.clone(),
            })
            .collect();
        inner.columns.push(
            Column::Function(Function::RowNumberOver {
                partition_by,
                order_by: context.order_by.cloned(),
            })
            .aliased(ROW_NUMBER_ALIAS),
        );
        // The per-group ordering is expressed by the window, not the inner query
        inner.order_by = None;

        let row_number = || Column::Name(ROW_NUMBER_ALIAS.to_string());
        let int = |n: u64| Column::Literal(SQLValue::Int(n as i64));
        let predicate = match context.offset {
            None => ConcretePredicate::Lte(row_number(), int(context.limit)),
            Some(offset) => ConcretePredicate::Gte(row_number(), int(offset + 1)).and(
                ConcretePredicate::Lt(row_number(), int(offset + 1 + context.limit)),
            ),
        };

        Select {
            table: Table::SubSelect {
                select: Box::new(inner),
                alias: Some("t1".to_string()),
            },
            columns: vec![],
            predicate,
            group_by: None,
            order_by: None,
            limit: None,
            offset: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asql::dataset::Dataset;
    use crate::sql::order::{OrderBy, Ordering};
    use crate::sql::ExpressionBuilder;
    use crate::transform::test_util::TestSetup;

    #[test]
    fn limit_renders_row_number_filter() {
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
                offset: None,
            };

            let select = Dataset::from_table(setup.albums_table).to_select();
            let limited = WindowFunctionStrategy.apply(&setup.database, select, &context);
            assert_eq!(
                limited.to_sql(&setup.database, &Dialect::unquoted()),
                "SELECT * FROM (SELECT *, \
                 row_number() OVER (PARTITION BY albums.artist_id ORDER BY albums.title ASC) \
                 AS x_row_number_x FROM albums) AS t1 WHERE (x_row_number_x <= 2)"
            );
        });
    }

    #[test]
    fn offset_renders_a_row_number_window() {
        TestSetup::with_setup(|setup| {
            let fk_columns = vec!["artist_id".to_string()];
            let pk_columns = vec!["id".to_string()];
            let context = LimitContext {
                fk_qualifier: "albums",
                fk_columns: &fk_columns,
                pk_qualifier: "albums",
                pk_columns: &pk_columns,
                order_by: None,
                limit: 2,
                offset: Some(3),
            };

            let select = Dataset::from_table(setup.albums_table).to_select();
            let limited = WindowFunctionStrategy.apply(&setup.database, select, &context);
            let sql = limited.to_sql(&setup.database, &Dialect::unquoted());
            assert!(sql.contains("((x_row_number_x >= 4) AND (x_row_number_x < 6))"));
        });
    }
}
