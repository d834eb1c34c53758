//! # tabcrud
//!
//! Compiles loosely-typed JSON filter and update descriptors into
//! parameterized SQL for editing a single relational table.
//!
//! ## Features
//!
//! - **Parameterized only**: every value becomes a named placeholder with a matching binding
//! - **Dialect-aware**: identifier quoting, placeholder syntax and paging per backend
//!   (ANSI, SQL Server, Snowflake, Postgres)
//! - **Strict descriptors**: malformed WHERE entries are rejected with the offending
//!   1-based entry index
//! - **Safe defaults**: UPDATE and DELETE require a WHERE clause
//! - **Postgres execution**: run compiled statements through `tokio-postgres`,
//!   optionally pooled with `deadpool-postgres` (feature `pool`)
//!
//! ## Compiling a filter
//!
//! ```ignore
//! use tabcrud::{combine_where, parse_where, Dialect};
//!
//! let raw = serde_json::json!([
//!     {"field": "category", "operator": "equals", "values": ["new"]},
//!     {"field": "amount", "operator": "range", "values": [0, 100]},
//! ]);
//! let clauses = parse_where(&raw)?;
//! let part = combine_where(&clauses, 1, &Dialect::sql_server())?;
//! assert_eq!(part.text, "[category]=@param1 AND [amount] BETWEEN @param2 AND @param3");
//! assert_eq!(part.next_param_index, 4);
//! ```
//!
//! ## Running requests
//!
//! ```ignore
//! use tabcrud::{Dialect, PgExecutor, Persistor};
//!
//! let executor = PgExecutor::connect("postgres://localhost/shop").await?;
//! let orders = Persistor::new(Dialect::postgres(), "orders", executor);
//! let affected = orders
//!     .handle_update(&serde_json::json!({
//!         "where": [{"field": "id", "operator": "in", "values": [1, 2]}],
//!         "updates": {"status": "shipped"},
//!     }))
//!     .await?;
//! ```

pub mod clause;
pub mod combine;
pub mod descriptor;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod ident;
pub mod param;
pub mod persistor;
pub mod pg;
pub mod statement;

pub use clause::{
    Clause, Emit, EqualClause, FieldListClause, InClause, RangeClause, SqlFragment, UpdateClause,
    ValuesClause,
};
pub use combine::{CombinedPart, combine, combine_update, combine_where};
pub use descriptor::{
    ReadParams, UpdateParams, parse_delete, parse_fields, parse_insert, parse_read,
    parse_update, parse_update_request, parse_where,
};
pub use dialect::{Dialect, DialectKind, PaginationStyle, PlaceholderStyle, QuoteStyle};
pub use error::{CrudError, CrudResult};
pub use executor::{Executor, QueryResult};
pub use ident::TableRef;
pub use param::{Param, validate_param_name};
pub use persistor::Persistor;
pub use pg::PgExecutor;
pub use statement::{CompiledRead, CompiledSql};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pg::PgPoolExecutor;
#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};
