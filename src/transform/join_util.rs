use crate::asql::association::Association;
use crate::asql::dataset::Dataset;
use crate::sql::column::Column;
use crate::sql::join::JoinCondition;
use crate::sql::predicate::ConcretePredicate;
use crate::sql::{Database, SQLValue};

use super::alias::AliasGenerator;

/// The join plan for loading an association's target rows: the target table with
/// the through-chain joined in, plus the (qualifier, columns) the owner-side key
/// values filter on.
pub struct AssociationJoin {
    pub dataset: Dataset,
    pub filter_qualifier: String,
    pub filter_columns: Vec<String>,
}

/// A conjunction of per-column equalities between two qualified key lists. The
/// lists are known to be of equal arity (association construction validates it),
/// so the predicate count equals the key column count.
pub fn key_equalities(
    left_qualifier: &str,
    left_columns: &[String],
    right_qualifier: &str,
    right_columns: &[String],
) -> ConcretePredicate {
    ConcretePredicate::all(left_columns.iter().zip(right_columns.iter()).map(
        |(left, right)| {
            ConcretePredicate::Eq(
                Column::Qualified {
                    qualifier: left_qualifier.to_string(),
                    name: left.clone(),
                },
                Column::Qualified {
                    qualifier: right_qualifier.to_string(),
                    name: right.clone(),
                },
            )
        },
    ))
}

/// Build the join plan for an association. Through-chain hops are joined from
/// the target outward: the last hop joins the target on its `right` keys, each
/// earlier hop joins the next hop's `left` keys, and the first hop's `left`
/// columns are what owner key values ultimately filter on. Repeated tables get
/// distinct aliases in first-seen order.
pub fn association_join(database: &Database, association: &Association) -> AssociationJoin {
    let target_name = database.get_table(association.target_table).name.clone();

    let mut aliases = AliasGenerator::new();
    let target_qualifier = aliases.qualifier(&target_name);

    let mut dataset = Dataset::from_table(association.target_table);

    if association.hops.is_empty() {
        return AssociationJoin {
            dataset,
            filter_qualifier: target_qualifier,
            filter_columns: association.target_keys.clone(),
        };
    }

    // The chain is declared source-to-target; we join target-to-source.
    let mut outer_qualifier = target_qualifier;
    let mut outer_keys = association.target_keys.clone();
    for hop in association.hops.iter().rev() {
        let hop_name = database.get_table(hop.table_id).name.clone();
        let alias = aliases.alias(&hop_name);
        let hop_qualifier = alias.clone().unwrap_or_else(|| hop_name.clone());

        let condition = key_equalities(&hop_qualifier, &hop.right, &outer_qualifier, &outer_keys);
        dataset = dataset.inner_join(hop.table_id, alias, JoinCondition::On(condition));

        outer_qualifier = hop_qualifier;
        outer_keys = hop.left.clone();
    }

    AssociationJoin {
        dataset,
        filter_qualifier: outer_qualifier,
        filter_columns: outer_keys,
    }
}

/// The lazy-load filter: owner key values equated column by column.
pub fn owner_filter(
    qualifier: &str,
    columns: &[String],
    values: &[SQLValue],
) -> ConcretePredicate {
    ConcretePredicate::all(columns.iter().zip(values.iter()).map(|(column, value)| {
        ConcretePredicate::Eq(
            Column::Qualified {
                qualifier: qualifier.to_string(),
                name: column.clone(),
            },
            Column::Literal(value.clone()),
        )
    }))
}

/// The eager batch filter: `key IN (v1, v2, ...)` for a simple key, or a
/// row-value `(k1, k2) IN ((a, b), (c, d))` for composite keys. An empty batch
/// matches nothing.
pub fn batch_filter(
    qualifier: &str,
    columns: &[String],
    batch: &[Vec<SQLValue>],
) -> ConcretePredicate {
    if batch.is_empty() {
        return ConcretePredicate::False;
    }

    if columns.len() == 1 {
        let values = batch
            .iter()
            .map(|tuple| Column::Literal(tuple[0].clone()))
            .collect();
        ConcretePredicate::In(
            Column::Qualified {
                qualifier: qualifier.to_string(),
                name: columns[0].clone(),
            },
            Column::List(values),
        )
    } else {
        let key_tuple = Column::RowValue(
            columns
                .iter()
                .map(|column| Column::Qualified {
                    qualifier: qualifier.to_string(),
                    name: column.clone(),
                })
                .collect(),
        );
        let value_tuples = batch
            .iter()
            .map(|tuple| Column::RowValue(tuple.iter().cloned().map(Column::Literal).collect()))
            .collect();
        ConcretePredicate::In(key_tuple, Column::List(value_tuples))
    }
}
