//! Table-bound CRUD operations: compile a request, log it, run it.

use crate::clause::Clause;
use crate::descriptor::{self, ReadParams};
use crate::dialect::Dialect;
use crate::error::CrudResult;
use crate::executor::{Executor, QueryResult};
use crate::ident::TableRef;
use crate::statement::{self, CompiledSql};
use serde_json::{Map, Value};

const LOG_TARGET: &str = "tabcrud.sql";

fn log_compiled(op: &'static str, table: &TableRef, sql: &CompiledSql) {
    tracing::debug!(
        target: LOG_TARGET,
        op,
        table = %table.table,
        params = sql.params.len(),
        sql = %sql.sql,
        "compiled statement"
    );
}

fn log_rejected<T>(op: &'static str, result: CrudResult<T>) -> CrudResult<T> {
    if let Err(err) = &result {
        if err.is_request_error() {
            tracing::warn!(target: LOG_TARGET, op, error = %err, "request rejected");
        }
    }
    result
}

/// CRUD operations against one table through an [`Executor`].
///
/// # Example
///
/// ```ignore
/// use tabcrud::{Dialect, PgExecutor, Persistor, TableRef};
///
/// let executor = PgExecutor::connect(&url).await?;
/// let orders = Persistor::new(Dialect::postgres(), TableRef::new("orders").schema("sales"), executor);
/// let result = orders.handle_read(&serde_json::from_str(body)?).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Persistor<E> {
    dialect: Dialect,
    table: TableRef,
    executor: E,
}

impl<E: Executor> Persistor<E> {
    pub fn new(dialect: Dialect, table: impl Into<TableRef>, executor: E) -> Self {
        Self {
            dialect,
            table: table.into(),
            executor,
        }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Insert one row; returns rows affected.
    pub async fn insert(&self, values: &Map<String, Value>) -> CrudResult<u64> {
        let sql = log_rejected("insert", statement::insert(&self.dialect, &self.table, values))?;
        log_compiled("insert", &self.table, &sql);
        self.executor.execute(&sql).await
    }

    /// Update matching rows; returns rows affected.
    pub async fn update(&self, where_clauses: &[Clause], updates: &[Clause]) -> CrudResult<u64> {
        let sql = log_rejected(
            "update",
            statement::update(&self.dialect, &self.table, where_clauses, updates),
        )?;
        log_compiled("update", &self.table, &sql);
        self.executor.execute(&sql).await
    }

    /// Delete matching rows; returns rows affected.
    pub async fn delete(&self, where_clauses: &[Clause]) -> CrudResult<u64> {
        let sql = log_rejected(
            "delete",
            statement::delete(&self.dialect, &self.table, where_clauses),
        )?;
        log_compiled("delete", &self.table, &sql);
        self.executor.execute(&sql).await
    }

    /// Read one page and the total number of matching rows.
    pub async fn read(&self, params: &ReadParams) -> CrudResult<QueryResult> {
        let read = log_rejected("read", statement::read(&self.dialect, &self.table, params))?;
        log_compiled("read", &self.table, &read.page);
        log_compiled("count", &self.table, &read.count);

        let mut result = self.executor.query(&read.page).await?;
        let count = self.executor.query(&read.count).await?;
        result.total_row_count = count.scalar().and_then(Value::as_u64).unwrap_or(0);
        Ok(result)
    }

    /// Fetch the table's columns without rows.
    pub async fn test_connection(&self) -> CrudResult<QueryResult> {
        let sql = statement::test_connection(&self.dialect, &self.table);
        log_compiled("test", &self.table, &sql);
        self.executor.query(&sql).await
    }

    /// `{"values": {...}}`
    pub async fn handle_insert(&self, request: &Value) -> CrudResult<u64> {
        let values = log_rejected("insert", descriptor::parse_insert(request))?;
        self.insert(&values).await
    }

    /// `{"where": [...], "updates": {...}}`
    pub async fn handle_update(&self, request: &Value) -> CrudResult<u64> {
        let params = log_rejected("update", descriptor::parse_update_request(request))?;
        self.update(&params.where_clauses, &params.updates).await
    }

    /// `{"where": [...]}`
    pub async fn handle_delete(&self, request: &Value) -> CrudResult<u64> {
        let where_clauses = log_rejected("delete", descriptor::parse_delete(request))?;
        self.delete(&where_clauses).await
    }

    /// `{"fields": [...], "where": [...], "orderBy": [...], "pageSize": n, "page": n}`
    pub async fn handle_read(&self, request: &Value) -> CrudResult<QueryResult> {
        let params = log_rejected("read", descriptor::parse_read(request))?;
        self.read(&params).await
    }
}
