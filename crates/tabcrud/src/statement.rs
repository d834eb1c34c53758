//! Full CRUD statements assembled from combined clause lists.
//!
//! Every statement numbers its parameters from 1. Where a statement has both
//! a SET and a WHERE list, SET is compiled first and WHERE continues from its
//! `next_param_index`, so bindings appear in the same order as their
//! placeholders (required by positional dialects).
//!
//! # Example
//! ```ignore
//! use tabcrud::{statement, Clause, Dialect, TableRef};
//!
//! let sql = statement::update(
//!     &Dialect::sql_server(),
//!     &TableRef::new("orders"),
//!     &[Clause::equal("id", 7)],
//!     &[Clause::update("status", "shipped")],
//! )?;
//! assert_eq!(sql.sql, "UPDATE [orders] SET [status]=@param1 WHERE [id]=@param2");
//! ```

use crate::clause::{Clause, Emit};
use crate::combine::{combine_update, combine_where};
use crate::descriptor::ReadParams;
use crate::dialect::Dialect;
use crate::error::{CrudError, CrudResult};
use crate::ident::TableRef;
use crate::param::{Param, param_name};
use serde::Serialize;
use serde_json::{Map, Value};

/// A statement ready for the executor: SQL text plus its bindings, in
/// placeholder order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompiledSql {
    pub sql: String,
    pub params: Vec<Param>,
}

impl CompiledSql {
    pub fn new(sql: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Bound values without their names.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.params.iter().map(|p| &p.value)
    }
}

/// A paged read: the page itself and the total-count query sharing its filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledRead {
    pub page: CompiledSql,
    pub count: CompiledSql,
}

/// `INSERT INTO t (<fields>) VALUES (<placeholders>)`
pub fn insert(
    dialect: &Dialect,
    table: &TableRef,
    values: &Map<String, Value>,
) -> CrudResult<CompiledSql> {
    if values.is_empty() {
        return Err(CrudError::structural(
            "at least 1 field and value must be provided",
        ));
    }

    let fields = Clause::field_list(values.keys().map(String::as_str));
    let placeholders = Clause::values(values.values().cloned().collect());

    let columns = fields.emit(&[], dialect)?;
    let names: Vec<String> = (1..=placeholders.arity()).map(param_name).collect();
    let row = placeholders.emit(&names, dialect)?;

    Ok(CompiledSql::new(
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.to_sql(dialect),
            columns.text,
            row.text
        ),
        row.bindings,
    ))
}

/// `UPDATE t SET <set> WHERE <where>`
///
/// Both lists must be non-empty: a statement touching every row is never
/// produced.
pub fn update(
    dialect: &Dialect,
    table: &TableRef,
    where_clauses: &[Clause],
    updates: &[Clause],
) -> CrudResult<CompiledSql> {
    if where_clauses.is_empty() {
        return Err(CrudError::structural(
            "at least 1 where clause must be provided",
        ));
    }
    if updates.is_empty() {
        return Err(CrudError::structural(
            "at least 1 update clause must be provided",
        ));
    }

    let set = combine_update(updates, 1, dialect)?;
    let filter = combine_where(where_clauses, set.next_param_index, dialect)?;

    let mut params = set.bindings;
    params.extend(filter.bindings);
    Ok(CompiledSql::new(
        format!(
            "UPDATE {} SET {} WHERE {}",
            table.to_sql(dialect),
            set.text,
            filter.text
        ),
        params,
    ))
}

/// `DELETE FROM t WHERE <where>`
pub fn delete(
    dialect: &Dialect,
    table: &TableRef,
    where_clauses: &[Clause],
) -> CrudResult<CompiledSql> {
    if where_clauses.is_empty() {
        return Err(CrudError::structural(
            "at least 1 where clause must be provided",
        ));
    }

    let filter = combine_where(where_clauses, 1, dialect)?;
    Ok(CompiledSql::new(
        format!("DELETE FROM {} WHERE {}", table.to_sql(dialect), filter.text),
        filter.bindings,
    ))
}

/// One page of rows plus the matching total count.
pub fn read(dialect: &Dialect, table: &TableRef, params: &ReadParams) -> CrudResult<CompiledRead> {
    if params.fields.is_empty() {
        return Err(CrudError::structural("at least 1 field must be provided"));
    }
    if params.order_by.is_empty() {
        return Err(CrudError::structural(
            "at least 1 order by field must be provided",
        ));
    }
    if params.page_size == 0 {
        return Err(CrudError::structural("'pageSize' must be at least 1"));
    }
    if params.page == 0 {
        return Err(CrudError::structural("'page' must be at least 1"));
    }

    let table = table.to_sql(dialect);
    let columns = Clause::field_list(params.fields.iter().map(String::as_str)).emit(&[], dialect)?;
    let order_by = dialect.quote_list(&params.order_by);
    let filter = combine_where(&params.where_clauses, 1, dialect)?;

    let where_sql = if filter.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", filter.text)
    };
    let offset = (params.page - 1).saturating_mul(params.page_size);

    Ok(CompiledRead {
        page: CompiledSql::new(
            format!(
                "SELECT {} FROM {table}{where_sql} ORDER BY {order_by} {}",
                columns.text,
                dialect.pagination_sql(offset, params.page_size)
            ),
            filter.bindings.clone(),
        ),
        count: CompiledSql::new(
            format!("SELECT count(*) FROM {table}{where_sql}"),
            filter.bindings,
        ),
    })
}

/// A statement returning the table's columns and no rows.
pub fn test_connection(dialect: &Dialect, table: &TableRef) -> CompiledSql {
    CompiledSql::new(dialect.probe_sql(&table.to_sql(dialect)), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    fn read_params(where_clauses: Vec<Clause>) -> ReadParams {
        ReadParams {
            fields: vec!["id".into(), "name".into()],
            where_clauses,
            order_by: vec!["id".into()],
            page_size: 10,
            page: 3,
        }
    }

    #[test]
    fn insert_statement() {
        let sql = insert(
            &Dialect::sql_server(),
            &TableRef::new("t").schema("dbo").database("db"),
            &map(json!({"a": 1, "b": "x"})),
        )
        .unwrap();
        assert_eq!(
            sql.sql,
            "INSERT INTO [db].[dbo].[t] ([a],[b]) VALUES (@param1,@param2)"
        );
        assert_eq!(
            sql.params,
            vec![Param::new("param1", 1), Param::new("param2", "x")]
        );
    }

    #[test]
    fn insert_requires_values() {
        let err = insert(&Dialect::ansi(), &"t".into(), &Map::new()).unwrap_err();
        assert!(matches!(err, CrudError::Structural { .. }));
    }

    #[test]
    fn update_numbers_set_before_where() {
        let sql = update(
            &Dialect::postgres(),
            &"t".into(),
            &[Clause::in_list("id", vec![json!(1), json!(2)], false)],
            &[Clause::update("a", "x"), Clause::update("b", json!(null))],
        )
        .unwrap();
        assert_eq!(
            sql.sql,
            r#"UPDATE "t" SET "a"=$1,"b"=$2 WHERE "id" IN ($3,$4)"#
        );
        let names: Vec<&str> = sql.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["param1", "param2", "param3", "param4"]);
    }

    #[test]
    fn update_and_delete_require_where() {
        let d = Dialect::ansi();
        let t = TableRef::new("t");
        assert!(update(&d, &t, &[], &[Clause::update("a", 1)]).is_err());
        assert!(update(&d, &t, &[Clause::equal("a", 1)], &[]).is_err());
        assert!(delete(&d, &t, &[]).is_err());
    }

    #[test]
    fn delete_statement() {
        let sql = delete(
            &Dialect::ansi(),
            &"t".into(),
            &[Clause::range("d", Some(json!("2024-01-01")), None, true)],
        )
        .unwrap();
        assert_eq!(
            sql.sql,
            r#"DELETE FROM "t" WHERE ("d" >= @param1 OR "d" IS NULL)"#
        );
        assert_eq!(sql.params.len(), 1);
    }

    #[test]
    fn read_with_filter() {
        let read = read(
            &Dialect::sql_server(),
            &"t".into(),
            &read_params(vec![Clause::equal("name", "x")]),
        )
        .unwrap();
        assert_eq!(
            read.page.sql,
            "SELECT [id],[name] FROM [t] WHERE [name]=@param1 ORDER BY [id] \
             OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
        );
        assert_eq!(read.count.sql, "SELECT count(*) FROM [t] WHERE [name]=@param1");
        assert_eq!(read.page.params, read.count.params);
    }

    #[test]
    fn read_without_filter() {
        let read = read(&Dialect::postgres(), &"t".into(), &read_params(vec![])).unwrap();
        assert_eq!(
            read.page.sql,
            r#"SELECT "id","name" FROM "t" ORDER BY "id" LIMIT 10 OFFSET 20"#
        );
        assert_eq!(read.count.sql, r#"SELECT count(*) FROM "t""#);
        assert!(read.page.params.is_empty());
    }

    #[test]
    fn read_validates_paging() {
        let d = Dialect::ansi();
        let t = TableRef::new("t");

        let mut p = read_params(vec![]);
        p.fields.clear();
        assert!(read(&d, &t, &p).is_err());

        let mut p = read_params(vec![]);
        p.order_by.clear();
        assert!(read(&d, &t, &p).is_err());

        let mut p = read_params(vec![]);
        p.page = 0;
        assert!(read(&d, &t, &p).is_err());

        let mut p = read_params(vec![]);
        p.page_size = 0;
        assert!(read(&d, &t, &p).is_err());
    }

    #[test]
    fn probe_statement() {
        let sql = test_connection(&Dialect::sql_server(), &TableRef::new("t").schema("s"));
        assert_eq!(sql.sql, "SELECT TOP 0 * FROM [s].[t]");
        assert!(sql.params.is_empty());
    }
}
