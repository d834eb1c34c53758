use crate::cli::{CompileArgs, Operation};
use crate::request::read_request;
use serde_json::Value;
use tabcrud::{Dialect, TableRef, descriptor, statement};

pub fn run(args: CompileArgs) -> anyhow::Result<()> {
    let request = if args.op.takes_request() {
        read_request(&args.request)?
    } else {
        Value::Null
    };

    let table = TableRef {
        database: args.database,
        schema: args.schema,
        table: args.table,
    };
    let out = compile(args.op, &Dialect::from(args.dialect), &table, &request)?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

/// Compile a request without executing it.
pub fn compile(
    op: Operation,
    dialect: &Dialect,
    table: &TableRef,
    request: &Value,
) -> anyhow::Result<Value> {
    let out = match op {
        Operation::Insert => {
            let values = descriptor::parse_insert(request)?;
            serde_json::to_value(statement::insert(dialect, table, &values)?)?
        }
        Operation::Update => {
            let params = descriptor::parse_update_request(request)?;
            serde_json::to_value(statement::update(
                dialect,
                table,
                &params.where_clauses,
                &params.updates,
            )?)?
        }
        Operation::Delete => {
            let where_clauses = descriptor::parse_delete(request)?;
            serde_json::to_value(statement::delete(dialect, table, &where_clauses)?)?
        }
        Operation::Read => {
            let params = descriptor::parse_read(request)?;
            serde_json::to_value(statement::read(dialect, table, &params)?)?
        }
        Operation::Test => serde_json::to_value(statement::test_connection(dialect, table))?,
    };
    Ok(out)
}
