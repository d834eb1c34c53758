//! Postgres [`Executor`]s over `tokio-postgres`.
//!
//! Statements run here must be compiled with [`Dialect::postgres`](crate::Dialect::postgres)
//! (`$N` placeholders). Parameters are bound as JSON and converted to the
//! column types the server infers for each placeholder.

mod bind;
mod decode;
mod numeric;

use crate::error::{CrudError, CrudResult};
use crate::executor::{Executor, QueryResult};
use crate::statement::CompiledSql;
use bind::JsonParam;
use std::future::Future;
use std::time::Duration;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};

async fn with_timeout<T>(
    timeout: Option<Duration>,
    fut: impl Future<Output = CrudResult<T>>,
) -> CrudResult<T> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| CrudError::Timeout(limit))?,
        None => fut.await,
    }
}

fn bind_values(sql: &CompiledSql) -> Vec<JsonParam<'_>> {
    sql.values().map(JsonParam).collect()
}

fn param_refs<'a>(values: &'a [JsonParam<'_>]) -> Vec<&'a (dyn ToSql + Sync)> {
    values
        .iter()
        .map(|v| v as &(dyn ToSql + Sync))
        .collect()
}

async fn execute_on(client: &Client, sql: &CompiledSql) -> CrudResult<u64> {
    let values = bind_values(sql);
    let params = param_refs(&values);
    Ok(client.execute(sql.sql.as_str(), &params).await?)
}

async fn query_on(client: &Client, sql: &CompiledSql) -> CrudResult<QueryResult> {
    let values = bind_values(sql);
    let params = param_refs(&values);

    // Prepare first so column names survive an empty result.
    let statement = client.prepare(&sql.sql).await?;
    let column_names = statement
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    let rows = client.query(&statement, &params).await?;
    let data = rows
        .iter()
        .map(decode::row_values)
        .collect::<CrudResult<Vec<_>>>()?;
    Ok(QueryResult::from_rows(column_names, data))
}

/// Executor over a single connection.
pub struct PgExecutor {
    client: Client,
    timeout: Option<Duration>,
}

impl PgExecutor {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Connect without TLS and drive the connection on the current runtime.
    pub async fn connect(database_url: &str) -> CrudResult<Self> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .map_err(|e| CrudError::Connection(e.to_string()))?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(target: "tabcrud.pg", error = %e, "connection closed with error");
            }
        });
        Ok(Self::new(client))
    }

    /// Fail statements that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl Executor for PgExecutor {
    async fn execute(&self, sql: &CompiledSql) -> CrudResult<u64> {
        with_timeout(self.timeout, execute_on(&self.client, sql)).await
    }

    async fn query(&self, sql: &CompiledSql) -> CrudResult<QueryResult> {
        with_timeout(self.timeout, query_on(&self.client, sql)).await
    }
}

/// Executor checking a connection out of a pool per statement.
#[cfg(feature = "pool")]
#[derive(Clone)]
pub struct PgPoolExecutor {
    pool: deadpool_postgres::Pool,
    timeout: Option<Duration>,
}

#[cfg(feature = "pool")]
impl PgPoolExecutor {
    pub fn new(pool: deadpool_postgres::Pool) -> Self {
        Self {
            pool,
            timeout: None,
        }
    }

    /// Fail statements that run longer than `timeout`. Waiting for a pooled
    /// connection counts towards it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn pool(&self) -> &deadpool_postgres::Pool {
        &self.pool
    }
}

#[cfg(feature = "pool")]
impl Executor for PgPoolExecutor {
    async fn execute(&self, sql: &CompiledSql) -> CrudResult<u64> {
        with_timeout(self.timeout, async {
            let client = self.pool.get().await?;
            execute_on(&client, sql).await
        })
        .await
    }

    async fn query(&self, sql: &CompiledSql) -> CrudResult<QueryResult> {
        with_timeout(self.timeout, async {
            let client = self.pool.get().await?;
            query_on(&client, sql).await
        })
        .await
    }
}
