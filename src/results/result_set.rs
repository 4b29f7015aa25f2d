use std::sync::Arc;

use super::row::ResultRow;
use crate::types::RowValues;

/// The materialized rows of a query, plus shared column metadata.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    column_names: Arc<Vec<String>>,
    rows: Vec<ResultRow>,
}

impl ResultSet {
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>) -> Self {
        Self {
            column_names,
            rows: Vec::new(),
        }
    }

    /// Append a row; `values` must be in column order.
    pub fn push_row(&mut self, values: Vec<RowValues>) {
        self.rows
            .push(ResultRow::new(Arc::clone(&self.column_names), values));
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    #[must_use]
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
