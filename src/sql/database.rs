use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};
use typed_generational_arena::{Arena, IgnoreGeneration, Index};

use super::physical_column::ColumnId;
use super::physical_table::PhysicalTable;

pub type SerializableSlab<T> = Arena<T, usize, IgnoreGeneration>;
pub type TableId = Index<PhysicalTable, usize, IgnoreGeneration>;

/// The physical schema: a registry of tables owned by one value with an explicit
/// lifecycle, passed by reference into the compilers (never a process-wide global).
#[derive(Serialize, Deserialize)]
pub struct Database {
    tables: SerializableSlab<PhysicalTable>,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            tables: SerializableSlab::new(),
        }
    }
}

impl Database {
    pub fn get_table(&self, id: TableId) -> &PhysicalTable {
        &self.tables[id]
    }

    pub fn get_table_mut(&mut self, id: TableId) -> &mut PhysicalTable {
        &mut self.tables[id]
    }

    pub fn insert_table(&mut self, table: PhysicalTable) -> TableId {
        self.tables.insert(table)
    }

    pub fn tables(&self) -> &SerializableSlab<PhysicalTable> {
        &self.tables
    }

    pub fn get_table_id(&self, table_name: &str) -> Option<TableId> {
        self.tables.iter().find_map(|(id, table)| {
            if table.name == table_name {
                Some(id)
            } else {
                None
            }
        })
    }

    pub fn get_column_id(&self, table_id: TableId, column_name: &str) -> Option<ColumnId> {
        self.tables[table_id]
            .column_index(column_name)
            .map(|column_index| ColumnId {
                table_id,
                column_index,
            })
    }

    pub fn get_column_ids(&self, table_id: TableId) -> Vec<ColumnId> {
        (0..self.tables[table_id].columns.len())
            .map(|column_index| ColumnId {
                table_id,
                column_index,
            })
            .collect()
    }

    /// The primary key columns of a table, in declaration order. Composite keys are the
    /// norm in the association compiler, so this always returns a list.
    pub fn get_pk_column_ids(&self, table_id: TableId) -> Vec<ColumnId> {
        let table = self.get_table(table_id);
        table
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.is_pk)
            .map(|(column_index, _)| ColumnId {
                table_id,
                column_index,
            })
            .collect()
    }
}

impl Debug for Database {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (id, table) in self.tables.iter() {
            writeln!(f, "{}: {}", id.arr_idx(), table.name)?;
            for (column_index, column) in table.columns.iter().enumerate() {
                writeln!(f, "    {}: {:?}", column_index, column)?;
            }
        }
        Ok(())
    }
}
