/// How identifiers are case-mangled when crossing the SQL text boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierCase {
    Uppercase,
    Lowercase,
}

impl IdentifierCase {
    fn apply(&self, s: &str) -> String {
        match self {
            IdentifierCase::Uppercase => s.to_uppercase(),
            IdentifierCase::Lowercase => s.to_lowercase(),
        }
    }
}

/// Per-backend rendering rules. Every expression node renders deterministically given one
/// of these; the same AST can thus serve multiple backends.
#[derive(Debug, Clone)]
pub struct Dialect {
    /// Surround identifiers with double quotes when rendering.
    pub quote_identifiers: bool,
    /// Case transform applied when a name is converted toward SQL text.
    pub identifier_input_method: Option<IdentifierCase>,
    /// Case transform applied when a returned column name is converted back to an
    /// identifier on the way out of the database.
    pub identifier_output_method: Option<IdentifierCase>,
    /// Whether the backend supports `row_number() OVER (...)`; decides the
    /// limit-per-group strategy.
    pub supports_window_functions: bool,
    /// Numeric server version (Postgres convention, e.g. 140000); gates the JSON
    /// subscript operator rendering.
    pub server_version_num: u32,
}

impl Dialect {
    pub fn postgres() -> Self {
        Dialect {
            quote_identifiers: true,
            identifier_input_method: None,
            identifier_output_method: None,
            supports_window_functions: true,
            server_version_num: 150000,
        }
    }

    /// A dialect that renders identifiers bare, the way test assertions read them.
    pub fn unquoted() -> Self {
        Dialect {
            quote_identifiers: false,
            ..Dialect::postgres()
        }
    }

    /// Transform a name on its way into SQL text (casing only; quoting is the
    /// builder's concern).
    pub fn input_identifier(&self, name: &str) -> String {
        match &self.identifier_input_method {
            Some(case) => case.apply(name),
            None => name.to_owned(),
        }
    }

    /// Transform a column name returned by the database back into an identifier.
    /// An empty name has no usable identifier form, so it maps to `untitled`.
    pub fn output_identifier(&self, name: &str) -> String {
        if name.is_empty() {
            return "untitled".to_owned();
        }
        match &self.identifier_output_method {
            Some(case) => case.apply(name),
            None => name.to_owned(),
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::postgres()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_casing() {
        let dialect = Dialect {
            identifier_input_method: Some(IdentifierCase::Uppercase),
            ..Dialect::postgres()
        };
        assert_eq!(dialect.input_identifier("employees"), "EMPLOYEES");
    }

    #[test]
    fn output_casing() {
        let dialect = Dialect {
            identifier_output_method: Some(IdentifierCase::Lowercase),
            ..Dialect::postgres()
        };
        assert_eq!(dialect.output_identifier("NAME"), "name");
    }

    #[test]
    fn empty_output_identifier_becomes_untitled() {
        let dialect = Dialect {
            identifier_output_method: Some(IdentifierCase::Lowercase),
            ..Dialect::postgres()
        };
        assert_eq!(dialect.output_identifier(""), "untitled");
    }
}
