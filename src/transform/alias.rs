use indexmap::IndexMap;

/// Deterministic alias assignment for tables that appear more than once in a
/// query (self-referential chains, multiply-joined tables).
///
/// The first occurrence of a table keeps its own name; each subsequent
/// occurrence gets a `_0`, `_1`, ... suffix in first-seen order. Distinctness of
/// the generated names is what makes repeated-table joins correct.
#[derive(Debug, Default)]
pub struct AliasGenerator {
    seen: IndexMap<String, usize>,
}

impl AliasGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `table_name`. Returns `None` for the first
    /// occurrence (the plain name suffices) and a fresh suffixed alias for each
    /// repeat.
    pub fn alias(&mut self, table_name: &str) -> Option<String> {
        match self.seen.get_mut(table_name) {
            None => {
                self.seen.insert(table_name.to_string(), 0);
                None
            }
            Some(count) => {
                let alias = format!("{table_name}_{count}");
                *count += 1;
                Some(alias)
            }
        }
    }

    /// The effective qualifier for the occurrence: the alias when one was
    /// generated, the table name otherwise.
    pub fn qualifier(&mut self, table_name: &str) -> String {
        self.alias(table_name)
            .unwrap_or_else(|| table_name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_is_unaliased() {
        let mut gen = AliasGenerator::new();
        assert_eq!(gen.alias("tags"), None);
    }

    #[test]
    fn repeats_are_numbered_in_first_seen_order() {
        let mut gen = AliasGenerator::new();
        assert_eq!(gen.alias("nodes"), None);
        assert_eq!(gen.alias("edges"), None);
        assert_eq!(gen.alias("nodes"), Some("nodes_0".to_string()));
        assert_eq!(gen.alias("nodes"), Some("nodes_1".to_string()));
        assert_eq!(gen.alias("edges"), Some("edges_0".to_string()));
    }
}
