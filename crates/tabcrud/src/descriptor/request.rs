//! Whole-request parameter parsing for the CRUD operations.
//!
//! These read the keys a client sends for each operation (`values`, `where`,
//! `updates`, `fields`, `orderBy`, `pageSize`, `page`) out of the request
//! object and hand the descriptor parts to [`parse_where`] / [`parse_update`].

use super::{json_type, parse_update, parse_where};
use crate::clause::Clause;
use crate::error::{CrudError, CrudResult};
use serde_json::{Map, Value};

/// Parsed parameters of a read request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadParams {
    pub fields: Vec<String>,
    pub where_clauses: Vec<Clause>,
    pub order_by: Vec<String>,
    pub page_size: u64,
    pub page: u64,
}

/// Parsed parameters of an update request.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateParams {
    pub where_clauses: Vec<Clause>,
    pub updates: Vec<Clause>,
}

fn as_object(raw: &Value) -> CrudResult<&Map<String, Value>> {
    raw.as_object().ok_or_else(|| {
        CrudError::structural(format!(
            "expected request to be an object but got {}",
            json_type(raw)
        ))
    })
}

fn param<'a>(obj: &'a Map<String, Value>, key: &str) -> CrudResult<&'a Value> {
    obj.get(key)
        .ok_or_else(|| CrudError::structural(format!("missing '{key}' parameter")))
}

/// Read a list of strings stored under `key` (e.g. `fields`, `orderBy`).
pub fn parse_fields(raw: &Value, key: &str) -> CrudResult<Vec<String>> {
    let obj = as_object(raw)?;
    string_list(param(obj, key)?, key)
}

fn string_list(value: &Value, key: &str) -> CrudResult<Vec<String>> {
    let not_list = || CrudError::structural(format!("'{key}' is not a list of strings"));
    value
        .as_array()
        .ok_or_else(not_list)?
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or_else(not_list))
        .collect()
}

fn integer(value: &Value, key: &str) -> CrudResult<u64> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    // JSON clients frequently serialize integers as `2.0`.
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
        _ => Err(CrudError::structural(format!(
            "'{key}' is not a non-negative integer"
        ))),
    }
}

/// Parse an insert request: `{"values": {field: value, ...}}`.
pub fn parse_insert(raw: &Value) -> CrudResult<Map<String, Value>> {
    let obj = as_object(raw)?;
    match param(obj, "values")? {
        Value::Object(values) => Ok(values.clone()),
        other => Err(CrudError::structural(format!(
            "expected values to be an object but got {}",
            json_type(other)
        ))),
    }
}

/// Parse a delete request: `{"where": [...]}`.
pub fn parse_delete(raw: &Value) -> CrudResult<Vec<Clause>> {
    let obj = as_object(raw)?;
    parse_where(param(obj, "where")?)
}

/// Parse an update request: `{"where": [...], "updates": {...}}`.
pub fn parse_update_request(raw: &Value) -> CrudResult<UpdateParams> {
    let obj = as_object(raw)?;
    let where_clauses = parse_where(param(obj, "where")?)?;
    let updates = parse_update(param(obj, "updates")?)?;
    Ok(UpdateParams {
        where_clauses,
        updates,
    })
}

/// Parse a read request:
/// `{"fields": [...], "where": [...], "orderBy": [...], "pageSize": n, "page": n}`.
pub fn parse_read(raw: &Value) -> CrudResult<ReadParams> {
    let obj = as_object(raw)?;
    Ok(ReadParams {
        fields: string_list(param(obj, "fields")?, "fields")?,
        where_clauses: parse_where(param(obj, "where")?)?,
        order_by: string_list(param(obj, "orderBy")?, "orderBy")?,
        page_size: integer(param(obj, "pageSize")?, "pageSize")?,
        page: integer(param(obj, "page")?, "page")?,
    })
}
