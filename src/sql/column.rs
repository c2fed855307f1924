use crate::database_error::DatabaseError;
use crate::types::json_ops::JsonExpr;

use super::{
    case::CaseExpr, function::Function, physical_column::ColumnId, select::Select,
    value::SQLValue, Database, ExpressionBuilder, SQLBuilder,
};

/// A column-position expression. Essentially `<column>` in a
/// `SELECT <column>, <column> FROM <table>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// A column in a physical table, optionally qualified by a table alias (instead of
    /// the table's own name) when the table appears under an alias in the FROM clause.
    Physical {
        column_id: ColumnId,
        table_alias: Option<String>,
    },
    /// A bare identifier, not qualified by any table.
    Name(String),
    /// An identifier qualified by an explicit name (e.g. an alias the schema does not
    /// know about).
    Qualified { qualifier: String, name: String },
    /// An inline literal value.
    Literal(SQLValue),
    Function(Function),
    Case(CaseExpr),
    /// Array subscript access: `expr[i]` or `expr[i, j]`.
    Subscript {
        base: Box<Column>,
        indexes: Vec<Column>,
    },
    /// `expr::type`
    Cast { expr: Box<Column>, cast_type: String },
    /// String concatenation join: `(a || sep || b || sep || c)`. Non-string literal
    /// operands are coerced to string literals before joining.
    StringJoin {
        elems: Vec<Column>,
        separator: SQLValue,
    },
    /// A literal SQL fragment with `?` slots interleaved with argument expressions.
    /// Construct through [`Column::placeholder`], which validates the arity.
    Placeholder {
        fragments: Vec<String>,
        args: Vec<Column>,
    },
    /// A parenthesized tuple `(a, b)`, e.g. the left side of a row-value IN.
    RowValue(Vec<Column>),
    /// A parenthesized list `(a, b, c)`, e.g. the right side of an IN.
    List(Vec<Column>),
    /// A parenthesized sub-select.
    SubSelect(Box<Select>),
    /// `expr AS alias`
    Aliased { expr: Box<Column>, alias: String },
    /// A JSON path/operator expression (rendering is server-version gated).
    Json(Box<JsonExpr>),
    /// `*` (None) or `<table>.*` (Some)
    Star(Option<String>),
    Null,
}

impl Column {
    pub fn physical(column_id: ColumnId) -> Self {
        Column::Physical {
            column_id,
            table_alias: None,
        }
    }

    pub fn aliased(self, alias: impl Into<String>) -> Self {
        Column::Aliased {
            expr: Box::new(self),
            alias: alias.into(),
        }
    }

    /// Build a placeholder fragment column. The number of `?` slots in `format` must
    /// match the number of arguments; a mismatch is a definition-time error.
    pub fn placeholder(format: &str, args: Vec<Column>) -> Result<Column, DatabaseError> {
        let fragments: Vec<String> = format.split('?').map(|s| s.to_owned()).collect();
        if fragments.len() != args.len() + 1 {
            return Err(DatabaseError::Config(format!(
                "placeholder fragment {:?} has {} slots, but {} arguments were supplied",
                format,
                fragments.len() - 1,
                args.len()
            )));
        }
        Ok(Column::Placeholder { fragments, args })
    }
}

impl ExpressionBuilder for Column {
    fn build(&self, database: &Database, builder: &mut SQLBuilder) {
        match self {
            Column::Physical {
                column_id,
                table_alias,
            } => {
                let column = column_id.get_column(database);
                match table_alias {
                    Some(alias) => builder.push_column(alias, &column.name),
                    None => column.build(database, builder),
                }
            }
            Column::Name(name) => builder.push_identifier(name),
            Column::Qualified { qualifier, name } => builder.push_column(qualifier, name),
            Column::Literal(value) => builder.push_value(value),
            Column::Function(function) => function.build(database, builder),
            Column::Case(case) => case.build(database, builder),
            Column::Subscript { base, indexes } => {
                base.build(database, builder);
                builder.push('[');
                builder.push_elems(database, indexes, ", ");
                builder.push(']');
            }
            Column::Cast { expr, cast_type } => {
                expr.build(database, builder);
                builder.push_str("::");
                builder.push_str(cast_type);
            }
            Column::StringJoin { elems, separator } => {
                builder.push('(');
                builder.push_iter(elems.iter(), &format!(" || {} || ", separator.to_literal()), |builder, elem| {
                    // Coerce non-string literals so the concatenation is string-typed
                    match elem {
                        Column::Literal(value) if !matches!(value, SQLValue::String(_)) => builder
                            .push_value(&SQLValue::String(value.to_plain_text())),
                        other => other.build(database, builder),
                    }
                });
                builder.push(')');
            }
            Column::Placeholder { fragments, args } => {
                for (i, fragment) in fragments.iter().enumerate() {
                    builder.push_str(fragment);
                    if let Some(arg) = args.get(i) {
                        arg.build(database, builder);
                    }
                }
            }
            Column::RowValue(elems) | Column::List(elems) => {
                builder.push('(');
                builder.push_elems(database, elems, ", ");
                builder.push(')');
            }
            Column::SubSelect(select) => {
                builder.push('(');
                select.build(database, builder);
                builder.push(')');
            }
            Column::Aliased { expr, alias } => {
                expr.build(database, builder);
                builder.push_str(" AS ");
                builder.push_identifier(alias);
            }
            Column::Json(json) => json.build(database, builder),
            Column::Star(table_name) => {
                if let Some(table_name) = table_name {
                    builder.push_identifier(table_name);
                    builder.push('.');
                }
                builder.push('*');
            }
            Column::Null => builder.push_str("NULL"),
        }
    }
}
