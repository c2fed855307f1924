use std::collections::HashMap;

use crate::asql::association::Association;
use crate::connection::{Connection, Row};
use crate::database_error::DatabaseError;
use crate::sql::column::Column;
use crate::sql::select::Select;
use crate::sql::{Database, Dialect, ExpressionBuilder, SQLBuilder, SQLValue};

use super::join_util::{association_join, batch_filter, owner_filter};
use super::limit_strategy::{LimitContext, LimitStrategyChain};

/// The alias prefix under which eager loads annotate each fetched row with the
/// foreign-key value(s) used for the join: `x_foreign_key_x` for a simple key,
/// `x_foreign_key_0_x`, `x_foreign_key_1_x`, ... for composite keys.
pub const FOREIGN_KEY_ALIAS: &str = "x_foreign_key_x";

fn foreign_key_alias(index: usize, arity: usize) -> String {
    if arity == 1 {
        FOREIGN_KEY_ALIAS.to_string()
    } else {
        format!("x_foreign_key_{index}_x")
    }
}

/// The lazy-load select for one owning row: the through-chain joined in, filtered
/// by the owner's key values, with the association's order and limit applied
/// directly.
pub fn lazy_select(
    database: &Database,
    association: &Association,
    owner_keys: &[SQLValue],
) -> Result<Select, DatabaseError> {
    if owner_keys.len() != association.source_keys.len() {
        return Err(DatabaseError::Validation(format!(
            "association {}: expected {} owner key values, got {}",
            association.name,
            association.source_keys.len(),
            owner_keys.len()
        )));
    }

    let join = association_join(database, association);
    let mut dataset = join.dataset.filter(owner_filter(
        &join.filter_qualifier,
        &join.filter_columns,
        owner_keys,
    ));

    if let Some(order_by) = &association.order_by {
        dataset = dataset.order(order_by.clone());
    }
    if let Some(limit) = association.limit {
        dataset = dataset.limit(limit);
    }
    if let Some(offset) = association.offset {
        dataset = dataset.offset(offset);
    }

    Ok(dataset.to_select())
}

/// The eager-load select for a batch of owning rows: one query filtered by
/// `key IN (batch)` (row-value IN for composite keys), selecting the target's
/// columns plus the join-key columns under the `x_foreign_key_x` aliases, so
/// results can be partitioned back onto their owners. A per-owner limit is
/// applied through the limit strategy chain.
pub fn eager_select(
    database: &Database,
    dialect: &Dialect,
    association: &Association,
    batch: &[Vec<SQLValue>],
) -> Result<Select, DatabaseError> {
    for tuple in batch {
        if tuple.len() != association.source_keys.len() {
            return Err(DatabaseError::Validation(format!(
                "association {}: expected {} key values per batch entry, got {}",
                association.name,
                association.source_keys.len(),
                tuple.len()
            )));
        }
    }

    let join = association_join(database, association);
    let target_qualifier = database.get_table(association.target_table).name.clone();

    let arity = join.filter_columns.len();
    let mut columns = vec![Column::Star(Some(target_qualifier.clone()))];
    columns.extend(join.filter_columns.iter().enumerate().map(|(i, column)| {
        Column::Qualified {
            qualifier: join.filter_qualifier.clone(),
            name: column.clone(),
        }
        .aliased(foreign_key_alias(i, arity))
    }));

    let mut dataset = join
        .dataset
        .select(columns)
        .filter(batch_filter(
            &join.filter_qualifier,
            &join.filter_columns,
            batch,
        ));

    match association.limit {
        Some(limit) => {
            let pk_columns: Vec<String> = database
                .get_pk_column_ids(association.target_table)
                .iter()
                .map(|column_id| column_id.get_column(database).name.clone())
                .collect();
            let context = LimitContext {
                fk_qualifier: &join.filter_qualifier,
                fk_columns: &join.filter_columns,
                pk_qualifier: &target_qualifier,
                pk_columns: &pk_columns,
                order_by: association.order_by.as_ref(),
                limit,
                offset: association.offset,
            };
            Ok(LimitStrategyChain::default().apply(database, dialect, dataset.to_select(), &context))
        }
        None => {
            if let Some(order_by) = &association.order_by {
                dataset = dataset.order(order_by.clone());
            }
            Ok(dataset.to_select())
        }
    }
}

/// Run an eager load for a batch of owner key tuples: issue exactly one query and
/// partition the fetched rows by the annotated foreign-key values. Returns a map
/// from key tuple to the associated rows, with the annotation columns stripped.
pub fn eager_load(
    database: &Database,
    dialect: &Dialect,
    connection: &dyn Connection,
    association: &Association,
    batch: &[Vec<SQLValue>],
) -> Result<HashMap<Vec<SQLValue>, Vec<Row>>, DatabaseError> {
    let select = eager_select(database, dialect, association, batch)?;
    let mut builder = SQLBuilder::new(dialect.clone());
    select.build(database, &mut builder);
    let rows = connection.fetch_rows(&builder.into_sql())?;

    let arity = if association.hops.is_empty() {
        association.target_keys.len()
    } else {
        association.hops[0].left.len()
    };

    let mut partitioned: HashMap<Vec<SQLValue>, Vec<Row>> = HashMap::new();
    for mut row in rows {
        let mut key = Vec::with_capacity(arity);
        for i in 0..arity {
            let alias = foreign_key_alias(i, arity);
            let value = row.shift_remove(&alias).ok_or_else(|| {
                DatabaseError::Decode(format!(
                    "eager load of {}: fetched row is missing the {alias} annotation",
                    association.name
                ))
            })?;
            key.push(value);
        }
        partitioned.entry(key).or_default().push(row);
    }
    Ok(partitioned)
}
