use crate::cli::{Operation, RunArgs};
use crate::config::Settings;
use crate::render::result_table;
use crate::request::read_request;
use serde_json::Value;
use std::time::Duration;
use tabcrud::{Dialect, DialectKind, PgPoolExecutor, Persistor, QueryResult, create_pool_with_config};

pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let settings = Settings::load(args.config)?;
    let conn = settings.connection(&args.connection)?;
    if conn.dialect != DialectKind::Postgres {
        anyhow::bail!(
            "connection {} uses the {} dialect; only postgres connections can be executed \
             (use `tabcrud compile --dialect {}` to inspect the SQL)",
            conn.name,
            conn.dialect,
            conn.dialect
        );
    }

    let request = if args.op.takes_request() {
        read_request(&args.request)?
    } else {
        Value::Null
    };

    let pool = create_pool_with_config(&conn.url, conn.max_pool_size)?;
    let mut executor = PgPoolExecutor::new(pool);
    if let Some(secs) = conn.statement_timeout {
        executor = executor.with_timeout(Duration::from_secs(secs));
    }

    tracing::info!(
        config = %settings.config_path.display(),
        connection = %conn.name,
        op = args.op.as_str(),
        table = %args.table,
        "running request"
    );

    let persistor = Persistor::new(Dialect::postgres(), conn.table_ref(&args.table), executor);
    match args.op {
        Operation::Insert => report_affected(persistor.handle_insert(&request).await?),
        Operation::Update => report_affected(persistor.handle_update(&request).await?),
        Operation::Delete => report_affected(persistor.handle_delete(&request).await?),
        Operation::Read => report_rows(&persistor.handle_read(&request).await?),
        Operation::Test => {
            let result = persistor.test_connection().await?;
            println!("{}", result_table(&result));
            println!("connection ok: {} column(s)", result.column_names.len());
        }
    }
    Ok(())
}

fn report_affected(n: u64) {
    println!("{n} row(s) affected");
}

fn report_rows(result: &QueryResult) {
    println!("{}", result_table(result));
    println!(
        "{} row(s) of {} total",
        result.row_count, result.total_row_count
    );
}
