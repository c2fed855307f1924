use crate::sql::column::Column;
use crate::sql::value::quote_string;
use crate::sql::{Database, ExpressionBuilder, SQLBuilder};

/// The server version where the native jsonb subscript operator appeared.
const SUBSCRIPT_VERSION: u32 = 140000;

/// A JSON path/operator expression over a json column or expression. Rendering
/// is version-gated: path extraction uses the native subscript operator when the
/// server supports it and falls back to the `json_extract_path` function call on
/// older servers.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonExpr {
    /// Extract the json value at a key path.
    ExtractPath { base: Column, path: Vec<String> },
    /// Extract the value at a key path as text (always a function call; the
    /// subscript operator has no text-returning form).
    ExtractPathText { base: Column, path: Vec<String> },
    /// `jsonb_set(base, '{path}', 'value'::jsonb)`
    Set {
        base: Column,
        path: Vec<String>,
        value: serde_json::Value,
    },
    /// `jsonb_path_query(base, 'path')`
    PathQuery { base: Column, path: String },
    /// `jsonb_path_exists(base, 'path')`
    PathExists { base: Column, path: String },
}

impl JsonExpr {
    pub fn into_column(self) -> Column {
        Column::Json(Box::new(self))
    }
}

fn push_path_array(builder: &mut SQLBuilder, path: &[String]) {
    builder.push_str(quote_string(&format!("{{{}}}", path.join(","))));
}

fn push_function_path(
    database: &Database,
    builder: &mut SQLBuilder,
    name: &str,
    base: &Column,
    path: &[String],
) {
    builder.push_str(name);
    builder.push('(');
    base.build(database, builder);
    for key in path {
        builder.push_str(", ");
        builder.push_str(quote_string(key));
    }
    builder.push(')');
}

impl ExpressionBuilder for JsonExpr {
    fn build(&self, database: &Database, builder: &mut SQLBuilder) {
        match self {
            JsonExpr::ExtractPath { base, path } => {
                if builder.dialect().server_version_num >= SUBSCRIPT_VERSION {
                    base.build(database, builder);
                    for key in path {
                        builder.push('[');
                        builder.push_str(quote_string(key));
                        builder.push(']');
                    }
                } else {
                    push_function_path(database, builder, "json_extract_path", base, path);
                }
            }
            JsonExpr::ExtractPathText { base, path } => {
                push_function_path(database, builder, "json_extract_path_text", base, path);
            }
            JsonExpr::Set { base, path, value } => {
                builder.push_str("jsonb_set(");
                base.build(database, builder);
                builder.push_str(", ");
                push_path_array(builder, path);
                builder.push_str(", ");
                builder.push_str(quote_string(&value.to_string()));
                builder.push_str("::jsonb)");
            }
            JsonExpr::PathQuery { base, path } => {
                builder.push_str("jsonb_path_query(");
                base.build(database, builder);
                builder.push_str(", ");
                builder.push_str(quote_string(path));
                builder.push(')');
            }
            JsonExpr::PathExists { base, path } => {
                builder.push_str("jsonb_path_exists(");
                base.build(database, builder);
                builder.push_str(", ");
                builder.push_str(quote_string(path));
                builder.push(')');
            }
        }
    }
}
