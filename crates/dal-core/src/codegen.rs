//! Record source generation.
//!
//! Turns a table's column list into the Rust source of a
//! `#[derive(Record)]` struct, for schema-first tooling.

use std::collections::HashSet;

/// Word segments rendered in upper case rather than title case.
const INITIALISMS: &[&str] = &[
    "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID", "IP",
    "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SSH", "TLS", "TTL", "UI", "UID",
    "UUID", "URI", "URL", "UTF8", "VM", "XML",
];

/// Rust type used for columns whose database type is not recognized.
pub const UNTYPED: &str = "dal_core::SqlValue";

/// Generates a Rust source string declaring a record for the given columns.
///
/// # Arguments
///
/// * `struct_name` - Name of the generated struct.
/// * `columns` - `(column name, database type)` pairs in table order.
///
/// Every column becomes a public field named with [`field_name`], typed with
/// [`rust_type`] and tagged with the column name. Field names that collide
/// after conversion get a numeric suffix.
#[must_use]
pub fn generate_record<N, T>(struct_name: &str, columns: &[(N, T)]) -> String
where
    N: AsRef<str>,
    T: AsRef<str>,
{
    let mut taken = HashSet::new();
    let fields: String = columns
        .iter()
        .map(|(column, data_type)| {
            let column = column.as_ref();
            let base = field_name(column);
            let mut name = base.clone();
            let mut suffix = 2;
            while !taken.insert(name.clone()) {
                name = format!("{base}{suffix}");
                suffix += 1;
            }
            format!(
                "    #[dal({column:?})]\n    pub {name}: {},\n",
                rust_type(data_type.as_ref())
            )
        })
        .collect();

    format!(
        "#[allow(non_snake_case)]\n\
         #[derive(Debug, Default, Record)]\n\
         pub struct {struct_name} {{\n\
         {fields}\
         }}\n"
    )
}

/// Converts a column name such as `user_id` into a field name such as
/// `UserID`.
///
/// Characters that cannot appear in an identifier separate words like `_`
/// does. The result is always a valid, non-keyword identifier.
#[must_use]
pub fn field_name(column: &str) -> String {
    let mut name = String::with_capacity(column.len());
    for segment in column
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
    {
        let upper = segment.to_ascii_uppercase();
        if INITIALISMS.contains(&upper.as_str()) {
            name.push_str(&upper);
        } else {
            let mut chars = segment.chars();
            if let Some(first) = chars.next() {
                name.push(first.to_ascii_uppercase());
                name.push_str(&chars.as_str().to_ascii_lowercase());
            }
        }
    }
    if name.is_empty() {
        name.push_str("Field");
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    } else if name == "Self" {
        name.push('_');
    }
    name
}

/// Maps a database type name to the Rust type of its field.
#[must_use]
pub fn rust_type(data_type: &str) -> &'static str {
    match data_type.trim().to_ascii_lowercase().as_str() {
        "boolean" | "bool" => "bool",
        "integer" | "int" | "int2" | "int4" | "int8" | "smallint" | "bigint" | "serial"
        | "bigserial" => "i64",
        "real" | "float" | "float4" | "float8" | "double" | "double precision" | "numeric" => {
            "f64"
        }
        "text" | "varchar" | "character varying" | "char" | "character" | "string" => "String",
        "blob" | "bytea" => "Vec<u8>",
        "date" => "chrono::NaiveDate",
        "timestamp" | "timestamp without time zone" | "datetime" => "chrono::NaiveDateTime",
        "timestamp with time zone" | "timestamptz" => "chrono::DateTime<chrono::Utc>",
        other if other.starts_with("varchar(") || other.starts_with("character varying(") => {
            "String"
        }
        _ => UNTYPED,
    }
}
