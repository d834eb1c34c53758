//! SQL dialect parameters.
//!
//! A [`Dialect`] bundles the three things that differ between the backends
//! tabcrud compiles for: how identifiers are delimited, how bound parameters
//! are written into the statement text, and how a page of rows is selected.
//!
//! ```ignore
//! use tabcrud::{Dialect, DialectKind};
//!
//! let d = Dialect::sql_server();
//! assert_eq!(d.quote("my]col"), "[my]]col]");
//!
//! let d: Dialect = "postgres".parse::<DialectKind>()?.into();
//! ```

use crate::error::{CrudError, CrudResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier delimiter pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// `"name"`, embedded `"` doubled.
    DoubleQuote,
    /// `[name]`, embedded `]` doubled.
    Bracket,
    /// `` `name` ``, embedded `` ` `` doubled.
    Backtick,
}

impl QuoteStyle {
    pub(crate) fn delimiters(self) -> (char, char) {
        match self {
            QuoteStyle::DoubleQuote => ('"', '"'),
            QuoteStyle::Bracket => ('[', ']'),
            QuoteStyle::Backtick => ('`', '`'),
        }
    }
}

/// How a bound parameter is written into statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// Named: `@param1`
    At,
    /// Named: `:param1`
    Colon,
    /// Positional: `?` (the name is dropped, bindings are matched by order)
    Question,
    /// Numbered: `$1`, taken from the trailing digits of the parameter name
    Dollar,
}

/// How a page of rows is selected after `ORDER BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStyle {
    /// `OFFSET o ROWS FETCH NEXT n ROWS ONLY`
    OffsetFetch,
    /// `LIMIT n OFFSET o`
    LimitOffset,
}

/// Named dialect presets, as they appear in configuration files and on the
/// command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialectKind {
    #[default]
    Ansi,
    SqlServer,
    Snowflake,
    Postgres,
}

impl DialectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DialectKind::Ansi => "ansi",
            DialectKind::SqlServer => "sql_server",
            DialectKind::Snowflake => "snowflake",
            DialectKind::Postgres => "postgres",
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = CrudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ansi" => Ok(DialectKind::Ansi),
            "sql_server" | "sqlserver" | "mssql" => Ok(DialectKind::SqlServer),
            "snowflake" => Ok(DialectKind::Snowflake),
            "postgres" | "postgresql" => Ok(DialectKind::Postgres),
            other => Err(CrudError::Other(format!(
                "unknown dialect '{other}' (expected ansi, sql_server, snowflake, or postgres)"
            ))),
        }
    }
}

/// A concrete set of dialect parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub kind: DialectKind,
    pub quote: QuoteStyle,
    pub placeholder: PlaceholderStyle,
    pub pagination: PaginationStyle,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::ansi()
    }
}

impl From<DialectKind> for Dialect {
    fn from(kind: DialectKind) -> Self {
        match kind {
            DialectKind::Ansi => Self::ansi(),
            DialectKind::SqlServer => Self::sql_server(),
            DialectKind::Snowflake => Self::snowflake(),
            DialectKind::Postgres => Self::postgres(),
        }
    }
}

impl Dialect {
    /// Double-quoted identifiers with `@name` placeholders.
    pub const fn ansi() -> Self {
        Self {
            kind: DialectKind::Ansi,
            quote: QuoteStyle::DoubleQuote,
            placeholder: PlaceholderStyle::At,
            pagination: PaginationStyle::OffsetFetch,
        }
    }

    /// Bracketed identifiers with `@name` placeholders.
    pub const fn sql_server() -> Self {
        Self {
            kind: DialectKind::SqlServer,
            quote: QuoteStyle::Bracket,
            placeholder: PlaceholderStyle::At,
            pagination: PaginationStyle::OffsetFetch,
        }
    }

    /// Double-quoted identifiers with positional `?` placeholders.
    pub const fn snowflake() -> Self {
        Self {
            kind: DialectKind::Snowflake,
            quote: QuoteStyle::DoubleQuote,
            placeholder: PlaceholderStyle::Question,
            pagination: PaginationStyle::LimitOffset,
        }
    }

    /// Double-quoted identifiers with `$N` placeholders.
    pub const fn postgres() -> Self {
        Self {
            kind: DialectKind::Postgres,
            quote: QuoteStyle::DoubleQuote,
            placeholder: PlaceholderStyle::Dollar,
            pagination: PaginationStyle::LimitOffset,
        }
    }

    /// Override the placeholder style.
    pub const fn with_placeholder(mut self, placeholder: PlaceholderStyle) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Append the placeholder for a bound parameter.
    ///
    /// The name must already have passed [`crate::param::validate_param_name`].
    pub(crate) fn write_placeholder(&self, out: &mut String, name: &str) -> CrudResult<()> {
        match self.placeholder {
            PlaceholderStyle::At => {
                out.push('@');
                out.push_str(name);
            }
            PlaceholderStyle::Colon => {
                out.push(':');
                out.push_str(name);
            }
            PlaceholderStyle::Question => out.push('?'),
            PlaceholderStyle::Dollar => {
                // Postgres numbers parameters from $1.
                let digits = name.trim_start_matches(|c: char| !c.is_ascii_digit());
                let number = digits.trim_start_matches('0');
                if number.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(CrudError::InvalidParamName(name.to_string()));
                }
                out.push('$');
                out.push_str(number);
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn placeholder(&self, name: &str) -> CrudResult<String> {
        let mut out = String::with_capacity(name.len() + 1);
        self.write_placeholder(&mut out, name)?;
        Ok(out)
    }

    /// Render the pagination tail that follows an `ORDER BY` list.
    pub(crate) fn pagination_sql(&self, offset: u64, limit: u64) -> String {
        match self.pagination {
            PaginationStyle::OffsetFetch => {
                format!("OFFSET {offset} ROWS FETCH NEXT {limit} ROWS ONLY")
            }
            PaginationStyle::LimitOffset => format!("LIMIT {limit} OFFSET {offset}"),
        }
    }

    /// Statement that returns a table's columns without any rows.
    pub(crate) fn probe_sql(&self, table: &str) -> String {
        match self.kind {
            DialectKind::SqlServer => format!("SELECT TOP 0 * FROM {table}"),
            _ => format!("SELECT * FROM {table} WHERE 1=2"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_styles() {
        assert_eq!(Dialect::ansi().placeholder("param1").unwrap(), "@param1");
        assert_eq!(
            Dialect::ansi()
                .with_placeholder(PlaceholderStyle::Colon)
                .placeholder("param7")
                .unwrap(),
            ":param7"
        );
        assert_eq!(Dialect::snowflake().placeholder("param3").unwrap(), "?");
        assert_eq!(Dialect::postgres().placeholder("param12").unwrap(), "$12");
    }

    #[test]
    fn dollar_requires_trailing_digits() {
        let err = Dialect::postgres().placeholder("abc").unwrap_err();
        assert!(matches!(err, CrudError::InvalidParamName(_)));

        let err = Dialect::postgres().placeholder("p1x2").unwrap_err();
        assert!(matches!(err, CrudError::InvalidParamName(_)));
    }

    #[test]
    fn dollar_numbers_start_at_one() {
        for name in ["param0", "param00"] {
            let err = Dialect::postgres().placeholder(name).unwrap_err();
            assert!(matches!(err, CrudError::InvalidParamName(ref n) if n == name));
        }
        assert_eq!(Dialect::postgres().placeholder("param07").unwrap(), "$7");
        assert_eq!(Dialect::postgres().placeholder("param10").unwrap(), "$10");
    }

    #[test]
    fn pagination_styles() {
        assert_eq!(
            Dialect::sql_server().pagination_sql(20, 10),
            "OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
        );
        assert_eq!(Dialect::postgres().pagination_sql(0, 5), "LIMIT 5 OFFSET 0");
    }

    #[test]
    fn kind_parses_aliases() {
        assert_eq!("mssql".parse::<DialectKind>().unwrap(), DialectKind::SqlServer);
        assert_eq!("postgresql".parse::<DialectKind>().unwrap(), DialectKind::Postgres);
        assert!("oracle".parse::<DialectKind>().is_err());
        assert_eq!(Dialect::from(DialectKind::Snowflake), Dialect::snowflake());
    }

    #[test]
    fn probe_per_dialect() {
        assert_eq!(Dialect::sql_server().probe_sql("[t]"), "SELECT TOP 0 * FROM [t]");
        assert_eq!(Dialect::ansi().probe_sql("\"t\""), "SELECT * FROM \"t\" WHERE 1=2");
    }
}
