//! Driver glue: parameter binding and row extraction for tiberius.

use std::sync::Arc;

use chrono::NaiveDateTime;
use futures_util::TryStreamExt;
use tiberius::Query;

use crate::error::MssqlBootstrapError;
use crate::results::ResultSet;
use crate::session::MssqlClient;
use crate::types::RowValues;

/// Run `query` with `params` bound as `@P1..@Pn` and materialize the rows.
pub(crate) async fn build_result_set(
    client: &mut MssqlClient,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, MssqlBootstrapError> {
    let query_builder = bind_query_params(query, params);

    let mut stream = query_builder.query(client).await.map_err(|e| {
        MssqlBootstrapError::ExecutionError(format!("SQL Server query error: {e}"))
    })?;

    let columns_opt = stream.columns().await.map_err(|e| {
        MssqlBootstrapError::ExecutionError(format!("SQL Server column fetch error: {e}"))
    })?;

    // A statement with no result set (e.g. DDL issued through the query
    // path) materializes as an empty table.
    let Some(columns) = columns_opt else {
        return Ok(ResultSet::default());
    };

    let column_names: Vec<String> = columns.iter().map(|col| col.name().to_string()).collect();
    let col_count = column_names.len();
    let mut result_set = ResultSet::new(Arc::new(column_names));

    let mut rows = stream.into_row_stream();
    while let Some(row) = rows.try_next().await.map_err(|e| {
        MssqlBootstrapError::ExecutionError(format!("SQL Server row fetch error: {e}"))
    })? {
        let mut values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            values.push(extract_value(&row, i).unwrap_or(RowValues::Null));
        }
        result_set.push_row(values);
    }

    Ok(result_set)
}

/// Pull the value at `idx` out of a driver row, trying the concrete types
/// SQL Server commonly hands back.
///
/// `None` means NULL. A type with no arm below (e.g. `decimal`,
/// `uniqueidentifier`) also comes back `None` and is materialized as NULL;
/// cast such columns in the query when their value matters.
fn extract_value(row: &tiberius::Row, idx: usize) -> Option<RowValues> {
    if let Ok(Some(val)) = row.try_get::<i32, _>(idx) {
        return Some(RowValues::Int(i64::from(val)));
    }
    if let Ok(Some(val)) = row.try_get::<i64, _>(idx) {
        return Some(RowValues::Int(val));
    }
    if let Ok(Some(val)) = row.try_get::<i16, _>(idx) {
        return Some(RowValues::Int(i64::from(val)));
    }
    if let Ok(Some(val)) = row.try_get::<u8, _>(idx) {
        return Some(RowValues::Int(i64::from(val)));
    }

    if let Ok(Some(val)) = row.try_get::<f32, _>(idx) {
        return Some(RowValues::Float(f64::from(val)));
    }
    if let Ok(Some(val)) = row.try_get::<f64, _>(idx) {
        return Some(RowValues::Float(val));
    }

    if let Ok(Some(val)) = row.try_get::<bool, _>(idx) {
        return Some(RowValues::Bool(val));
    }

    // datetime/datetime2 come straight through the chrono feature.
    if let Ok(Some(val)) = row.try_get::<NaiveDateTime, _>(idx) {
        return Some(RowValues::Timestamp(val));
    }

    if let Ok(Some(val)) = row.try_get::<&str, _>(idx) {
        return Some(RowValues::Text(val.to_string()));
    }

    if let Ok(Some(val)) = row.try_get::<&[u8], _>(idx) {
        return Some(RowValues::Blob(val.to_vec()));
    }

    None
}

/// Build a tiberius query with every parameter already bound, in order.
pub(crate) fn bind_query_params<'a>(query: &'a str, params: &[RowValues]) -> Query<'a> {
    let mut query_builder = Query::new(query);

    for param in params {
        match param {
            RowValues::Int(i) => query_builder.bind(*i),
            RowValues::Float(f) => query_builder.bind(*f),
            RowValues::Text(s) => query_builder.bind(s.clone()),
            RowValues::Bool(b) => query_builder.bind(*b),
            RowValues::Timestamp(dt) => query_builder.bind(*dt),
            RowValues::Null => query_builder.bind(Option::<String>::None),
            RowValues::JSON(jsval) => query_builder.bind(jsval.to_string()),
            RowValues::Blob(bytes) => query_builder.bind(bytes.clone()),
        }
    }

    query_builder
}
