//! The boundary between compiled statements and a database driver.

use crate::error::CrudResult;
use crate::statement::CompiledSql;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;

static NULL: Value = Value::Null;

/// Rows returned by a query.
///
/// `data` is column-major: `data[c][r]` is the value of column `c` in row `r`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub column_names: Vec<String>,
    pub row_count: usize,
    pub data: Vec<Vec<Value>>,
    /// Total matching rows across all pages (filled in by paged reads).
    pub total_row_count: u64,
}

impl QueryResult {
    /// Build from row-major values, as drivers return them.
    pub fn from_rows(column_names: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let row_count = rows.len();
        let mut data = vec![Vec::with_capacity(row_count); column_names.len()];
        for row in rows {
            for (column, value) in data.iter_mut().zip(row) {
                column.push(value);
            }
        }
        Self {
            column_names,
            row_count,
            data,
            total_row_count: 0,
        }
    }

    /// Iterate row by row; short columns read as null.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.row_count).map(move |r| {
            self.data
                .iter()
                .map(|column| column.get(r).unwrap_or(&NULL))
                .collect()
        })
    }

    /// The first cell of the first row, if any.
    pub fn scalar(&self) -> Option<&Value> {
        self.data.first().and_then(|column| column.first())
    }
}

/// Something that can run a [`CompiledSql`].
///
/// Implementations must accept the placeholder syntax of the dialect the
/// statement was compiled for, and bind `params` in order.
pub trait Executor: Send + Sync {
    /// Run a statement and return the number of rows affected.
    fn execute(&self, sql: &CompiledSql) -> impl Future<Output = CrudResult<u64>> + Send;

    /// Run a query and return its rows.
    fn query(&self, sql: &CompiledSql) -> impl Future<Output = CrudResult<QueryResult>> + Send;
}

impl<E: Executor> Executor for &E {
    fn execute(&self, sql: &CompiledSql) -> impl Future<Output = CrudResult<u64>> + Send {
        (**self).execute(sql)
    }

    fn query(&self, sql: &CompiledSql) -> impl Future<Output = CrudResult<QueryResult>> + Send {
        (**self).query(sql)
    }
}
