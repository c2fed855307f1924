use indexmap::IndexMap;

use crate::asql::association::Association;
use crate::asql::dataset::Dataset;
use crate::connection::{Connection, Row};
use crate::database_error::DatabaseError;
use crate::sql::column::Column;
use crate::sql::join::{JoinCondition, JoinKind};
use crate::sql::select::Select;
use crate::sql::{Database, Dialect, ExpressionBuilder, SQLBuilder, SQLValue};

use super::alias::AliasGenerator;
use super::join_util::key_equalities;

fn association_alias(association: &Association) -> String {
    format!("{}_id", association.name)
}

/// One root row with its de-duplicated association fingerprints: for each graphed
/// association, the distinct representative values seen across the joined rows.
#[derive(Debug, PartialEq)]
pub struct GraphNode {
    pub root: Row,
    pub associated: IndexMap<String, Vec<SQLValue>>,
}

fn graph_join(
    dataset: Dataset,
    kind: JoinKind,
    table_id: crate::TableId,
    alias: Option<String>,
    condition: JoinCondition,
) -> Dataset {
    match kind {
        JoinKind::Inner => dataset.inner_join(table_id, alias, condition),
        JoinKind::LeftOuter => dataset.left_outer_join(table_id, alias, condition),
    }
}

/// Build the single-query eager graph: every association joined in under its
/// graph join kind (LEFT OUTER by default; hops walked source-to-target,
/// repeated tables uniquely aliased), selecting the root's columns plus one
/// representative column per association, aliased `<association>_id`.
pub fn graph_select(
    database: &Database,
    associations: &[&Association],
) -> Result<Select, DatabaseError> {
    let root_table = root_of(associations)?;
    let root_name = database.get_table(root_table).name.clone();

    let mut aliases = AliasGenerator::new();
    let root_qualifier = aliases.qualifier(&root_name);

    let mut dataset = Dataset::from_table(root_table);
    let mut columns = vec![Column::Star(Some(root_qualifier.clone()))];

    for association in associations {
        let mut prev_qualifier = root_qualifier.clone();
        let mut prev_keys = association.source_keys.clone();

        for hop in &association.hops {
            let hop_name = database.get_table(hop.table_id).name.clone();
            let alias = aliases.alias(&hop_name);
            let hop_qualifier = alias.clone().unwrap_or_else(|| hop_name.clone());

            let condition = key_equalities(&hop_qualifier, &hop.left, &prev_qualifier, &prev_keys);
            dataset = graph_join(
                dataset,
                association.graph_join_kind,
                hop.table_id,
                alias,
                JoinCondition::On(condition),
            );

            prev_qualifier = hop_qualifier;
            prev_keys = hop.right.clone();
        }

        let target_name = database.get_table(association.target_table).name.clone();
        let alias = aliases.alias(&target_name);
        let target_qualifier = alias.clone().unwrap_or_else(|| target_name.clone());

        let condition = key_equalities(
            &target_qualifier,
            &association.target_keys,
            &prev_qualifier,
            &prev_keys,
        );
        dataset = graph_join(
            dataset,
            association.graph_join_kind,
            association.target_table,
            alias,
            JoinCondition::On(condition),
        );

        let representative = database
            .get_pk_column_ids(association.target_table)
            .first()
            .map(|column_id| column_id.get_column(database).name.clone())
            .unwrap_or_else(|| association.target_keys[0].clone());
        columns.push(
            Column::Qualified {
                qualifier: target_qualifier,
                name: representative,
            }
            .aliased(association_alias(association)),
        );
    }

    Ok(dataset.select(columns).to_select())
}

fn root_of(associations: &[&Association]) -> Result<crate::TableId, DatabaseError> {
    let mut tables = associations.iter().map(|a| a.source_table);
    let root = tables
        .next()
        .ok_or_else(|| DatabaseError::Config("eager graph requires at least one association".into()))?;
    if tables.any(|table| table != root) {
        return Err(DatabaseError::Config(
            "eager graph associations must share one source table".into(),
        ));
    }
    Ok(root)
}

/// Run the eager graph query and eliminate the relational cross-product: rows are
/// grouped by root primary key, and for each association only distinct
/// representative values are kept, so M x N joined rows collapse back to one root
/// with M and N associated entries.
pub fn graph_fetch(
    database: &Database,
    dialect: &Dialect,
    connection: &dyn Connection,
    associations: &[&Association],
) -> Result<Vec<GraphNode>, DatabaseError> {
    let root_table = root_of(associations)?;
    let select = graph_select(database, associations)?;

    let mut builder = SQLBuilder::new(dialect.clone());
    select.build(database, &mut builder);
    let rows = connection.fetch_rows(&builder.into_sql())?;

    let pk_columns: Vec<String> = database
        .get_pk_column_ids(root_table)
        .iter()
        .map(|column_id| column_id.get_column(database).name.clone())
        .collect();

    let mut nodes: IndexMap<Vec<SQLValue>, GraphNode> = IndexMap::new();
    for mut row in rows {
        let mut associated_values: Vec<(String, SQLValue)> = Vec::with_capacity(associations.len());
        for association in associations {
            let alias = association_alias(association);
            let value = row.shift_remove(&alias).ok_or_else(|| {
                DatabaseError::Decode(format!(
                    "eager graph: fetched row is missing the {alias} column"
                ))
            })?;
            associated_values.push((association.name.clone(), value));
        }

        let mut key = Vec::with_capacity(pk_columns.len());
        for pk in &pk_columns {
            let value = row.get(pk).cloned().ok_or_else(|| {
                DatabaseError::Decode(format!(
                    "eager graph: fetched row is missing the root key column {pk}"
                ))
            })?;
            key.push(value);
        }

        let node = nodes.entry(key).or_insert_with(|| GraphNode {
            root: row,
            associated: associations
                .iter()
                .map(|association| (association.name.clone(), vec![]))
                .collect(),
        });
        for (name, value) in associated_values {
            if value == SQLValue::Null {
                continue;
            }
            if let Some(values) = node.associated.get_mut(&name) {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }
    }

    Ok(nodes.into_values().collect())
}
