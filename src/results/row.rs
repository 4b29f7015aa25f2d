use std::sync::Arc;

use crate::types::RowValues;

/// One row of a query result, with access by column name or index.
///
/// Column names are shared across all rows of a result set.
#[derive(Debug, Clone)]
pub struct ResultRow {
    column_names: Arc<Vec<String>>,
    values: Vec<RowValues>,
}

impl ResultRow {
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<RowValues>) -> Self {
        Self {
            column_names,
            values,
        }
    }

    /// The value under `column_name`, or `None` if no such column exists.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        let idx = self
            .column_names
            .iter()
            .position(|name| name == column_name)?;
        self.values.get(idx)
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    #[must_use]
    pub fn values(&self) -> &[RowValues] {
        &self.values
    }
}
