mod correlated_subquery_strategy;
mod window_function_strategy;

use crate::sql::order::OrderBy;
use crate::sql::select::Select;
use crate::sql::{Database, Dialect};

pub use correlated_subquery_strategy::CorrelatedSubqueryStrategy;
pub use window_function_strategy::WindowFunctionStrategy;

/// Everything a limit-per-group strategy needs: the partition (foreign-key)
/// columns, the per-group ordering, the primary-key columns of the target, and
/// the limit window itself.
pub struct LimitContext<'a> {
    pub fk_qualifier: &'a str,
    pub fk_columns: &'a [String],
    pub pk_qualifier: &'a str,
    pub pk_columns: &'a [String],
    pub order_by: Option<&'a OrderBy>,
    pub limit: u64,
    pub offset: Option<u64>,
}

/// A strategy for limiting an eager-loaded to-many association to N rows per
/// owning row. Each strategy declares whether the dialect can run it; the chain
/// picks the first suitable one. All strategies must produce the same result set
/// as the naive unlimited fetch truncated per group.
pub trait LimitStrategy {
    /// A unique identifier for this strategy, used for debugging purposes.
    fn id(&self) -> &'static str;

    fn suitable(&self, dialect: &Dialect) -> bool;

    fn apply(&self, database: &Database, select: Select, context: &LimitContext) -> Select;
}

/// The strategies in precedence order. The window-function strategy is preferred
/// whenever the dialect supports window functions; the correlated subquery works
/// everywhere.
pub struct LimitStrategyChain {
    strategies: Vec<Box<dyn LimitStrategy>>,
}

impl Default for LimitStrategyChain {
    fn default() -> Self {
        Self {
            strategies: vec![
                Box::new(WindowFunctionStrategy),
                Box::new(CorrelatedSubqueryStrategy),
            ],
        }
    }
}

impl LimitStrategyChain {
    pub fn apply(
        &self,
        database: &Database,
        dialect: &Dialect,
        select: Select,
        context: &LimitContext,
    ) -> Select {
        let strategy: &dyn LimitStrategy = self
            .strategies
            .iter()
            .find(|strategy| strategy.suitable(dialect))
            .map(|strategy| strategy.as_ref())
            .unwrap_or(&CorrelatedSubqueryStrategy);

        tracing::debug!("Using limit strategy: {}", strategy.id());
        strategy.apply(database, select, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asql::dataset::Dataset;
    use crate::sql::column::Column;
    use crate::sql::order::Ordering;
    use crate::sql::ExpressionBuilder;
    use crate::transform::test_util::TestSetup;

    #[test_log::test]
    fn window_strategy_is_chosen_when_supported() {
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
            let limited =
                LimitStrategyChain::default().apply(&setup.database, &Dialect::postgres(), select, &context);
            let sql = limited.to_sql(&setup.database, &Dialect::unquoted());
            assert!(sql.contains("row_number() OVER (PARTITION BY"));
            assert!(sql.contains("x_row_number_x <= 2"));
        });
    }

    #[test_log::test]
    fn correlated_subquery_is_the_fallback() {
        TestSetup::with_setup(|setup| {
            let no_window = Dialect {
                supports_window_functions: false,
                ..Dialect::unquoted()
            };
            let fk_columns = vec!["artist_id".to_string()];
            let pk_columns = vec!["id".to_string()];
            let context = LimitContext {
                fk_qualifier: "albums",
                fk_columns: &fk_columns,
                pk_qualifier: "albums",
                pk_columns: &pk_columns,
                order_by: None,
                limit: 2,
                offset: None,
            };

            let select = Dataset::from_table(setup.albums_table).to_select();
            let limited =
                LimitStrategyChain::default().apply(&setup.database, &no_window, select, &context);
            let sql = limited.to_sql(&setup.database, &no_window);
            assert!(sql.contains("IN (SELECT"));
            assert!(sql.contains("LIMIT 2"));
        });
    }
}
