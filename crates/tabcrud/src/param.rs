//! Bound parameters and parameter-name safety.

use crate::error::{CrudError, CrudResult};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;

static PARAM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").expect("valid regex"));

/// Prefix of every generated parameter name.
pub const PARAM_PREFIX: &str = "param";

/// Check that `name` can be expressed by every supported driver's parameter
/// syntax: a letter followed by letters or digits.
pub fn validate_param_name(name: &str) -> CrudResult<()> {
    if PARAM_NAME.is_match(name) {
        Ok(())
    } else {
        Err(CrudError::InvalidParamName(name.to_string()))
    }
}

/// Generated name for parameter number `n` (`param1`, `param2`, ...).
pub fn param_name(n: usize) -> String {
    format!("{PARAM_PREFIX}{n}")
}

/// A single bound value tied to a placeholder name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    pub value: Value,
}

impl Param {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<N: Into<String>, V: Into<Value>> From<(N, V)> for Param {
    fn from((name, value): (N, V)) -> Self {
        Param::new(name, value)
    }
}
