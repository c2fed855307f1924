use super::{join::Join, select::Select, Database, ExpressionBuilder, SQLBuilder, TableId};

/// A table-position expression. Essentially `<table>` in a `SELECT ... FROM <table>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Table {
    /// A physical table, under an alias when it appears more than once in a query.
    Physical {
        table_id: TableId,
        alias: Option<String>,
    },
    Join(Box<Join>),
    SubSelect {
        select: Box<Select>,
        alias: Option<String>,
    },
}

impl Table {
    pub fn physical(table_id: TableId) -> Self {
        Table::Physical {
            table_id,
            alias: None,
        }
    }

    pub fn aliased(table_id: TableId, alias: impl Into<String>) -> Self {
        Table::Physical {
            table_id,
            alias: Some(alias.into()),
        }
    }

    /// The name a column of this table should be qualified with: the alias when one
    /// is set, otherwise the physical name. Joins and sub-selects have no single
    /// qualifier.
    pub fn qualifier(&self, database: &Database) -> Option<String> {
        match self {
            Table::Physical { table_id, alias } => Some(
                alias
                    .clone()
                    .unwrap_or_else(|| database.get_table(*table_id).name.clone()),
            ),
            Table::SubSelect { alias, .. } => alias.clone(),
            Table::Join(_) => None,
        }
    }
}

impl ExpressionBuilder for Table {
    fn build(&self, database: &Database, builder: &mut SQLBuilder) {
        match self {
            Table::Physical { table_id, alias } => {
                database.get_table(*table_id).build(database, builder);
                if let Some(alias) = alias {
                    builder.push_str(" AS ");
                    builder.push_identifier(alias);
                }
            }
            Table::Join(join) => join.build(database, builder),
            Table::SubSelect { select, alias } => {
                builder.push('(');
                select.build(database, builder);
                builder.push(')');
                if let Some(alias) = alias {
                    builder.push_str(" AS ");
                    builder.push_identifier(alias);
                }
            }
        }
    }
}
