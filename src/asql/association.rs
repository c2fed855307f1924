use indexmap::IndexMap;

use crate::database_error::DatabaseError;
use crate::sql::join::JoinKind;
use crate::sql::order::OrderBy;
use crate::sql::{Database, TableId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    ManyToOne,
    OneToMany,
    ManyToMany,
    ManyThroughMany,
}

impl AssociationKind {
    pub fn is_through(&self) -> bool {
        matches!(
            self,
            AssociationKind::ManyToMany | AssociationKind::ManyThroughMany
        )
    }

    /// Whether loading yields a collection (as opposed to a single row).
    pub fn is_to_many(&self) -> bool {
        !matches!(self, AssociationKind::ManyToOne)
    }
}

/// One intermediate table in a through-chain. `left` points back toward the
/// source side, `right` toward the target side.
#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    pub table_id: TableId,
    pub left: Vec<String>,
    pub right: Vec<String>,
}

/// A static descriptor of one relationship between two tables, created once at
/// definition time and immutable thereafter. Re-registering under the same name
/// replaces the previous descriptor.
///
/// Key columns are lists throughout so composite keys need no special casing:
/// a simple key is a one-element list. The chain invariant is that key arities
/// match at every boundary: `source_keys` pairs with the first hop's `left`,
/// each hop's `right` pairs with the next hop's `left`, and the last hop's
/// `right` pairs with `target_keys` (with hops absent, `source_keys` pairs with
/// `target_keys` directly).
#[derive(Debug, Clone, PartialEq)]
pub struct Association {
    pub name: String,
    pub kind: AssociationKind,
    pub source_table: TableId,
    pub target_table: TableId,
    pub source_keys: Vec<String>,
    pub target_keys: Vec<String>,
    pub hops: Vec<Hop>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// The join kind used when this association participates in an eager graph.
    /// Defaults to LEFT OUTER so roots without associated rows still appear.
    pub graph_join_kind: JoinKind,
}

impl Association {
    /// Validate and build an association descriptor. All structural problems
    /// (empty key lists, arity mismatches, missing through-chain, unknown
    /// columns) are configuration errors raised here, not at load time.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        database: &Database,
        name: impl Into<String>,
        kind: AssociationKind,
        source_table: TableId,
        target_table: TableId,
        source_keys: Vec<String>,
        target_keys: Vec<String>,
        hops: Vec<Hop>,
    ) -> Result<Self, DatabaseError> {
        let name = name.into();

        if source_keys.is_empty() || target_keys.is_empty() {
            return Err(DatabaseError::Config(format!(
                "association {name}: key column lists must be non-empty"
            )));
        }

        if kind.is_through() && hops.is_empty() {
            return Err(DatabaseError::Config(format!(
                "association {name}: through association requires at least one join table"
            )));
        }
        if !kind.is_through() && !hops.is_empty() {
            return Err(DatabaseError::Config(format!(
                "association {name}: direct association cannot carry a join-table chain"
            )));
        }

        // Arity must match at every chain boundary
        let boundaries: Vec<(usize, usize)> = if hops.is_empty() {
            vec![(source_keys.len(), target_keys.len())]
        } else {
            let mut boundaries = vec![(source_keys.len(), hops[0].left.len())];
            for pair in hops.windows(2) {
                boundaries.push((pair[0].right.len(), pair[1].left.len()));
            }
            boundaries.push((hops[hops.len() - 1].right.len(), target_keys.len()));
            boundaries
        };
        for (left, right) in boundaries {
            if left != right {
                return Err(DatabaseError::Config(format!(
                    "association {name}: key arity mismatch in join chain ({left} vs {right})"
                )));
            }
        }

        let check_columns = |table_id: TableId, keys: &[String]| -> Result<(), DatabaseError> {
            let table = database.get_table(table_id);
            for key in keys {
                if table.column_index(key).is_none() {
                    return Err(DatabaseError::Config(format!(
                        "association {name}: no column {key} in table {}",
                        table.name
                    )));
                }
            }
            Ok(())
        };
        check_columns(source_table, &source_keys)?;
        check_columns(target_table, &target_keys)?;
        for hop in &hops {
            check_columns(hop.table_id, &hop.left)?;
            check_columns(hop.table_id, &hop.right)?;
        }

        Ok(Self {
            name,
            kind,
            source_table,
            target_table,
            source_keys,
            target_keys,
            hops,
            order_by: None,
            limit: None,
            offset: None,
            graph_join_kind: JoinKind::LeftOuter,
        })
    }

    pub fn with_graph_join_kind(self, graph_join_kind: JoinKind) -> Self {
        Self {
            graph_join_kind,
            ..self
        }
    }

    pub fn with_order(self, order_by: OrderBy) -> Self {
        Self {
            order_by: Some(order_by),
            ..self
        }
    }

    pub fn with_limit(self, limit: u64, offset: Option<u64>) -> Self {
        Self {
            limit: Some(limit),
            offset,
            ..self
        }
    }
}

/// The associations registered for a schema, keyed by name. Owned by one
/// configuration object and passed by reference to the compilers.
#[derive(Debug, Default)]
pub struct AssociationRegistry {
    associations: IndexMap<String, Association>,
}

impl AssociationRegistry {
    /// Register an association, replacing any previous one of the same name.
    pub fn register(&mut self, association: Association) {
        self.associations
            .insert(association.name.clone(), association);
    }

    pub fn get(&self, name: &str) -> Option<&Association> {
        self.associations.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Association> {
        self.associations.values()
    }
}
