//! Table and column introspection over INFORMATION_SCHEMA.
//!
//! Plain passthroughs to the database's metadata views; the only client-side
//! work is mapping the rows into typed structs.

use crate::error::MssqlBootstrapError;
use crate::results::ResultSet;
use crate::session::Session;
use crate::types::RowValues;

const LIST_TABLES: &str = r"
SELECT TABLE_NAME, TABLE_TYPE
FROM INFORMATION_SCHEMA.TABLES
WHERE TABLE_TYPE = 'BASE TABLE'
ORDER BY TABLE_NAME
";

const DESCRIBE_TABLE: &str = r"
SELECT COLUMN_NAME, DATA_TYPE, IS_NULLABLE, COLUMN_DEFAULT
FROM INFORMATION_SCHEMA.COLUMNS
WHERE TABLE_NAME = @P1
ORDER BY ORDINAL_POSITION
";

/// A base table, as reported by `INFORMATION_SCHEMA.TABLES`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub table_type: String,
}

/// One column of a table, as reported by `INFORMATION_SCHEMA.COLUMNS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub default: Option<String>,
}

/// List the base tables of the connected database, ordered by name.
///
/// # Errors
///
/// Returns `MssqlBootstrapError::UsageError` on a closed session, or
/// `ExecutionError` on query failure and when the metadata rows are missing
/// expected columns.
pub async fn list_tables(session: &mut Session) -> Result<Vec<TableInfo>, MssqlBootstrapError> {
    let result_set = session.query(LIST_TABLES, &[]).await?;
    parse_tables(&result_set)
}

/// Describe the columns of `table`, ordered by ordinal position.
///
/// The table name is bound as a parameter, never interpolated into the
/// query text.
///
/// # Errors
///
/// Same as [`list_tables`].
pub async fn describe_table(
    session: &mut Session,
    table: &str,
) -> Result<Vec<ColumnInfo>, MssqlBootstrapError> {
    let params = [RowValues::Text(table.to_string())];
    let result_set = session.query(DESCRIBE_TABLE, &params).await?;
    parse_columns(&result_set)
}

fn parse_tables(result_set: &ResultSet) -> Result<Vec<TableInfo>, MssqlBootstrapError> {
    result_set
        .rows()
        .iter()
        .map(|row| {
            Ok(TableInfo {
                name: required_text(row.get("TABLE_NAME"), "TABLE_NAME")?,
                table_type: required_text(row.get("TABLE_TYPE"), "TABLE_TYPE")?,
            })
        })
        .collect()
}

fn parse_columns(result_set: &ResultSet) -> Result<Vec<ColumnInfo>, MssqlBootstrapError> {
    result_set
        .rows()
        .iter()
        .map(|row| {
            // INFORMATION_SCHEMA reports nullability as 'YES'/'NO'.
            let is_nullable =
                required_text(row.get("IS_NULLABLE"), "IS_NULLABLE")?.eq_ignore_ascii_case("YES");
            let default = row
                .get("COLUMN_DEFAULT")
                .and_then(RowValues::as_text)
                .map(str::to_string);

            Ok(ColumnInfo {
                name: required_text(row.get("COLUMN_NAME"), "COLUMN_NAME")?,
                data_type: required_text(row.get("DATA_TYPE"), "DATA_TYPE")?,
                is_nullable,
                default,
            })
        })
        .collect()
}

fn required_text(
    value: Option<&RowValues>,
    column: &str,
) -> Result<String, MssqlBootstrapError> {
    value
        .and_then(RowValues::as_text)
        .map(str::to_string)
        .ok_or_else(|| {
            MssqlBootstrapError::ExecutionError(format!(
                "information schema row is missing {column}"
            ))
        })
}
