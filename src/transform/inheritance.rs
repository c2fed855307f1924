use indexmap::IndexMap;

use crate::asql::dataset::Dataset;
use crate::connection::{Connection, Row};
use crate::database_error::DatabaseError;
use crate::sql::join::JoinCondition;
use crate::sql::{Database, Dialect, ExpressionBuilder, SQLBuilder, SQLValue, TableId};

use super::join_util::batch_filter;

/// One registered level of a class-table-inheritance hierarchy: a discriminator
/// tag and the ordered ancestor chain of tables, base first, most-derived last.
#[derive(Debug, Clone, PartialEq)]
pub struct InheritanceEntry {
    pub tag: String,
    pub chain: Vec<TableId>,
}

/// A declarative class-table-inheritance map: one table per class level, joined
/// by a shared primary key, with a discriminator column on the base table
/// selecting the concrete level. Built once at configuration time; resolution
/// never walks a class hierarchy at runtime.
#[derive(Debug)]
pub struct InheritanceMap {
    base_table: TableId,
    discriminator_column: String,
    key_columns: Vec<String>,
    entries: IndexMap<String, InheritanceEntry>,
}

impl InheritanceMap {
    pub fn new(
        database: &Database,
        base_table: TableId,
        discriminator_column: impl Into<String>,
    ) -> Result<Self, DatabaseError> {
        let discriminator_column = discriminator_column.into();
        let base = database.get_table(base_table);
        if base.column_index(&discriminator_column).is_none() {
            return Err(DatabaseError::Config(format!(
                "inheritance base table {} has no discriminator column {}",
                base.name, discriminator_column
            )));
        }

        let key_columns: Vec<String> = base
            .get_pk_physical_columns()
            .iter()
            .map(|column| column.name.clone())
            .collect();
        if key_columns.is_empty() {
            return Err(DatabaseError::Config(format!(
                "inheritance base table {} has no primary key",
                base.name
            )));
        }

        Ok(Self {
            base_table,
            discriminator_column,
            key_columns,
            entries: IndexMap::new(),
        })
    }

    pub fn base_table(&self) -> TableId {
        self.base_table
    }

    pub fn discriminator_column(&self) -> &str {
        &self.discriminator_column
    }

    /// Register one level. The chain must start at the base table and every
    /// table in it must carry the shared key columns. Re-registering a tag
    /// replaces the previous entry.
    pub fn register(
        &mut self,
        database: &Database,
        tag: impl Into<String>,
        chain: Vec<TableId>,
    ) -> Result<(), DatabaseError> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(DatabaseError::Config(
                "inheritance tag must be non-empty".into(),
            ));
        }
        if chain.first() != Some(&self.base_table) {
            return Err(DatabaseError::Config(format!(
                "inheritance chain for {tag} must start at the base table"
            )));
        }
        for table_id in &chain {
            let table = database.get_table(*table_id);
            for key in &self.key_columns {
                if table.column_index(key).is_none() {
                    return Err(DatabaseError::Config(format!(
                        "inheritance chain for {tag}: table {} lacks key column {key}",
                        table.name
                    )));
                }
            }
        }
        self.entries.insert(tag.clone(), InheritanceEntry { tag, chain });
        Ok(())
    }

    /// Resolve a discriminator value to its ancestor chain. An unregistered or
    /// non-string discriminator falls back to the base table alone; this
    /// leniency is relied upon by data written before a subclass existed.
    pub fn resolve(&self, discriminator: &SQLValue) -> Vec<TableId> {
        let entry = match discriminator {
            SQLValue::String(tag) => self.entries.get(tag.as_str()),
            _ => None,
        };
        match entry {
            Some(entry) => entry.chain.clone(),
            None => {
                tracing::warn!(
                    "unresolved inheritance discriminator {:?}, falling back to the base table",
                    discriminator
                );
                vec![self.base_table]
            }
        }
    }

    /// The dataset for one level: the base table with each descendant table
    /// chained in through `INNER JOIN ... USING (<key>)`.
    pub fn dataset(&self, discriminator: &SQLValue) -> Dataset {
        let chain = self.resolve(discriminator);
        chain[1..].iter().fold(
            Dataset::from_table(self.base_table),
            |dataset, table_id| {
                dataset.inner_join(
                    *table_id,
                    None,
                    JoinCondition::Using(self.key_columns.clone()),
                )
            },
        )
    }

    /// The column set of one level: the union of every chain table's columns,
    /// in chain order, de-duplicated with name collisions resolved in favor of
    /// the most-derived table.
    pub fn columns(&self, database: &Database, discriminator: &SQLValue) -> Vec<String> {
        let mut columns: IndexMap<String, ()> = IndexMap::new();
        for table_id in self.resolve(discriminator) {
            for name in database.get_table(table_id).column_names() {
                columns.insert(name.to_string(), ());
            }
        }
        columns.into_keys().collect()
    }

    /// Enrich base-table rows with their subclass columns: one additional query
    /// per distinct subclass table across the whole batch (keyed by primary-key
    /// batch), never one query per row. Rows keep their fetch order; subclass
    /// column values overwrite base values on name collision.
    pub fn eager_load(
        &self,
        database: &Database,
        dialect: &Dialect,
        connection: &dyn Connection,
        rows: Vec<Row>,
    ) -> Result<Vec<Row>, DatabaseError> {
        // Which rows (by index) need each subclass table
        let mut needed: IndexMap<TableId, Vec<usize>> = IndexMap::new();
        for (index, row) in rows.iter().enumerate() {
            let discriminator = row
                .get(&self.discriminator_column)
                .cloned()
                .unwrap_or(SQLValue::Null);
            for table_id in self.resolve(&discriminator).into_iter().skip(1) {
                needed.entry(table_id).or_default().push(index);
            }
        }

        let mut rows = rows;
        for (table_id, indexes) in needed {
            let table_name = database.get_table(table_id).name.clone();

            let mut batch = Vec::with_capacity(indexes.len());
            for index in &indexes {
                let mut key = Vec::with_capacity(self.key_columns.len());
                for column in &self.key_columns {
                    let value = rows[*index].get(column).cloned().ok_or_else(|| {
                        DatabaseError::Decode(format!(
                            "inheritance eager load: row is missing key column {column}"
                        ))
                    })?;
                    key.push(value);
                }
                batch.push(key);
            }

            let select = Dataset::from_table(table_id)
                .filter(batch_filter(&table_name, &self.key_columns, &batch))
                .to_select();
            let mut builder = SQLBuilder::new(dialect.clone());
            select.build(database, &mut builder);
            let fetched = connection.fetch_rows(&builder.into_sql())?;

            let by_key: IndexMap<Vec<SQLValue>, Row> = fetched
                .into_iter()
                .map(|row| {
                    let key = self
                        .key_columns
                        .iter()
                        .filter_map(|column| row.get(column).cloned())
                        .collect();
                    (key, row)
                })
                .collect();

            for (index, key) in indexes.iter().zip(batch) {
                if let Some(subclass_row) = by_key.get(&key) {
                    for (column, value) in subclass_row {
                        rows[*index].insert(column.clone(), value.clone());
                    }
                }
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::test_util::{row, MockConnection, TestSetup};

    fn employee_map(setup: &TestSetup) -> InheritanceMap {
        let mut map = InheritanceMap::new(&setup.database, setup.employees_table, "kind").unwrap();
        map.register(
            &setup.database,
            "Manager",
            vec![setup.employees_table, setup.managers_table],
        )
        .unwrap();
        map.register(
            &setup.database,
            "Executive",
            vec![
                setup.employees_table,
                setup.managers_table,
                setup.executives_table,
            ],
        )
        .unwrap();
        map
    }

    #[test]
    fn subclass_dataset_chains_using_joins() {
        TestSetup::with_setup(|setup| {
            let map = employee_map(&setup);
            assert_eq!(
                map.dataset(&SQLValue::from("Manager"))
                    .sql(&setup.database, &Dialect::unquoted()),
                "SELECT * FROM employees INNER JOIN managers USING (id)"
            );
            assert_eq!(
                map.dataset(&SQLValue::from("Executive"))
                    .sql(&setup.database, &Dialect::unquoted()),
                "SELECT * FROM employees INNER JOIN managers USING (id) \
                 INNER JOIN executives USING (id)"
            );
        });
    }

    #[test]
    fn unknown_discriminator_falls_back_to_the_base_table() {
        TestSetup::with_setup(|setup| {
            let map = employee_map(&setup);
            assert_eq!(
                map.dataset(&SQLValue::from("Intern"))
                    .sql(&setup.database, &Dialect::unquoted()),
                "SELECT * FROM employees"
            );
            assert_eq!(map.resolve(&SQLValue::Null), vec![setup.employees_table]);
        });
    }

    #[test]
    fn chain_must_start_at_the_base() {
        TestSetup::with_setup(|setup| {
            let mut map =
                InheritanceMap::new(&setup.database, setup.employees_table, "kind").unwrap();
            let result = map.register(
                &setup.database,
                "Manager",
                vec![setup.managers_table],
            );
            assert!(matches!(result, Err(DatabaseError::Config(_))));
        });
    }

    #[test]
    fn column_union_prefers_the_most_derived_table() {
        TestSetup::with_setup(|setup| {
            let map = employee_map(&setup);
            assert_eq!(
                map.columns(&setup.database, &SQLValue::from("Executive")),
                ["id", "kind", "name", "num_staff", "num_managers"]
                    .map(str::to_string)
                    .to_vec()
            );
        });
    }

    #[test]
    fn eager_load_issues_one_query_per_level() {
        TestSetup::with_setup(|setup| {
            let map = employee_map(&setup);
            let connection = MockConnection::new();
            // managers level, then executives level
            connection.enqueue_rows(vec![
                row(&[("id", SQLValue::Int(1)), ("num_staff", SQLValue::Int(5))]),
                row(&[("id", SQLValue::Int(2)), ("num_staff", SQLValue::Int(9))]),
            ]);
            connection.enqueue_rows(vec![row(&[
                ("id", SQLValue::Int(2)),
                ("num_managers", SQLValue::Int(3)),
            ])]);

            let base_rows = vec![
                row(&[("id", SQLValue::Int(1)), ("kind", SQLValue::from("Manager"))]),
                row(&[
                    ("id", SQLValue::Int(2)),
                    ("kind", SQLValue::from("Executive")),
                ]),
                row(&[("id", SQLValue::Int(3)), ("kind", SQLValue::from("Clerk"))]),
            ];

            let enriched = map
                .eager_load(
                    &setup.database,
                    &Dialect::unquoted(),
                    &connection,
                    base_rows,
                )
                .unwrap();

            // Two subclass levels are present, so exactly two extra queries
            assert_eq!(connection.executed_sql().len(), 2);
            assert_eq!(enriched[0].get("num_staff"), Some(&SQLValue::Int(5)));
            assert_eq!(enriched[1].get("num_staff"), Some(&SQLValue::Int(9)));
            assert_eq!(enriched[1].get("num_managers"), Some(&SQLValue::Int(3)));
            assert_eq!(enriched[2].get("num_staff"), None);
        });
    }
}
