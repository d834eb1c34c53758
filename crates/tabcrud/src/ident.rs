//! Identifier quoting.
//!
//! Every table, schema, and column name that reaches statement text goes
//! through here. Names are never validated: any string is accepted, because
//! it is always fully delimited and embedded closing delimiters are doubled.
//!
//! - `"` style: `my"col` → `"my""col"`
//! - `[]` style: `my]col` → `[my]]col]`
//!
//! # Example
//! ```ignore
//! use tabcrud::{Dialect, TableRef};
//!
//! let d = Dialect::sql_server();
//! assert_eq!(d.quote_list(["a", "b"]), "[a],[b]");
//!
//! let t = TableRef::new("orders").schema("dbo").database("sales");
//! assert_eq!(t.to_sql(&d), "[sales].[dbo].[orders]");
//! ```

use crate::dialect::{Dialect, QuoteStyle};
use serde::{Deserialize, Serialize};

pub(crate) fn write_quoted(out: &mut String, style: QuoteStyle, name: &str) {
    let (open, close) = style.delimiters();
    out.push(open);
    for ch in name.chars() {
        if ch == close {
            out.push(close);
            out.push(close);
        } else {
            out.push(ch);
        }
    }
    out.push(close);
}

impl Dialect {
    /// Quote a single identifier.
    pub fn quote(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        write_quoted(&mut out, self.quote, name);
        out
    }

    /// Quote identifiers and join them with `,`, preserving input order.
    pub fn quote_list<I, S>(&self, names: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = String::new();
        for (i, name) in names.into_iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            write_quoted(&mut out, self.quote, name.as_ref());
        }
        out
    }

    /// Quote each part and join with `.`; empty parts are skipped.
    pub fn quote_qualified<I, S>(&self, parts: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = String::new();
        for part in parts {
            let part = part.as_ref();
            if part.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push('.');
            }
            write_quoted(&mut out, self.quote, part);
        }
        out
    }
}

/// A possibly-qualified table name: `[database.][schema.]table`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableRef {
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    pub table: String,
}

impl TableRef {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            database: None,
            schema: None,
            table: table.into(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Render the quoted, dotted name for the given dialect.
    pub fn to_sql(&self, dialect: &Dialect) -> String {
        dialect.quote_qualified(
            [
                self.database.as_deref(),
                self.schema.as_deref(),
                Some(self.table.as_str()),
            ]
            .into_iter()
            .flatten(),
        )
    }
}

impl From<&str> for TableRef {
    fn from(table: &str) -> Self {
        TableRef::new(table)
    }
}

impl From<String> for TableRef {
    fn from(table: String) -> Self {
        TableRef::new(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_double() {
        let d = Dialect::ansi();
        assert_eq!(d.quote("category"), r#""category""#);
        assert_eq!(d.quote(r#"has"quote"#), r#""has""quote""#);
    }

    #[test]
    fn quote_bracket() {
        let d = Dialect::sql_server();
        assert_eq!(d.quote("amount"), "[amount]");
        assert_eq!(d.quote("a]b"), "[a]]b]");
        // opening delimiter is left alone
        assert_eq!(d.quote("a[b"), "[a[b]");
    }

    #[test]
    fn quote_accepts_anything() {
        let d = Dialect::ansi();
        assert_eq!(d.quote(""), r#""""#);
        assert_eq!(d.quote("select"), r#""select""#);
        assert_eq!(d.quote("x; DROP TABLE t"), r#""x; DROP TABLE t""#);
        assert_eq!(d.quote(r#"a" OR "1"="1"#), r#""a"" OR ""1""=""1""#);
    }

    #[test]
    fn quote_list_preserves_order() {
        let d = Dialect::ansi();
        assert_eq!(d.quote_list(["b", "a", "c"]), r#""b","a","c""#);
        assert_eq!(d.quote_list(Vec::<String>::new()), "");
    }

    #[test]
    fn table_ref_qualified() {
        let d = Dialect::sql_server();
        let t = TableRef::new("orders").schema("dbo").database("sales");
        assert_eq!(t.to_sql(&d), "[sales].[dbo].[orders]");

        let t = TableRef::new("orders").schema("");
        assert_eq!(t.to_sql(&d), "[orders]");

        let t = TableRef::new("my.table");
        assert_eq!(t.to_sql(&Dialect::postgres()), r#""my.table""#);
    }
}
