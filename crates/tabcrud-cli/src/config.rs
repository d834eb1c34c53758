use serde::Deserialize;
use std::path::PathBuf;
use tabcrud::{DialectKind, TableRef};

pub const DEFAULT_CONFIG: &str = "tabcrud.toml";

#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub file: ConfigFile,
}

impl Settings {
    pub fn load(config_path: PathBuf) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(&config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;

        let file = ConfigFile::parse(&raw).map_err(|e| {
            anyhow::anyhow!("invalid config file {}: {e:#}", config_path.display())
        })?;

        Ok(Self { config_path, file })
    }

    pub fn connection(&self, name: &str) -> anyhow::Result<&ConnectionConfig> {
        self.file
            .connections
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| {
                let known: Vec<&str> = self.file.connections.iter().map(|c| c.name.as_str()).collect();
                anyhow::anyhow!(
                    "unknown connection: {name} (configured: {})",
                    known.join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,

    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    pub name: String,
    #[serde(default)]
    pub dialect: DialectKind,
    pub url: String,
    pub database: Option<String>,
    pub schema: Option<String>,
    #[serde(default = "default_pool_size")]
    pub max_pool_size: usize,
    /// Per-statement timeout in seconds.
    pub statement_timeout: Option<u64>,
}

fn default_pool_size() -> usize {
    tabcrud::pool::DEFAULT_POOL_SIZE
}

impl ConnectionConfig {
    /// Qualify `table` with this connection's database and schema.
    pub fn table_ref(&self, table: &str) -> TableRef {
        TableRef {
            database: self.database.clone(),
            schema: self.schema.clone(),
            table: table.to_string(),
        }
    }
}

impl ConfigFile {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut file: ConfigFile = toml::from_str(raw)?;
        file.expand_env()?;
        file.validate()?;
        Ok(file)
    }

    fn expand_env(&mut self) -> anyhow::Result<()> {
        for c in &mut self.connections {
            c.url = expand_env_vars(&c.url)?;
            if let Some(db) = c.database.as_mut() {
                *db = expand_env_vars(db)?;
            }
            if let Some(schema) = c.schema.as_mut() {
                *schema = expand_env_vars(schema)?;
            }
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }

        if self.connections.is_empty() {
            anyhow::bail!("at least one [[connections]] entry is required");
        }

        let mut seen = std::collections::HashSet::<&str>::new();
        for c in &self.connections {
            if c.name.trim().is_empty() {
                anyhow::bail!("connections.name must not be empty");
            }
            if !seen.insert(c.name.as_str()) {
                anyhow::bail!("duplicate connections.name: {}", c.name);
            }
            if c.url.trim().is_empty() {
                anyhow::bail!("connections.url must not be empty (connection: {})", c.name);
            }
            if c.max_pool_size == 0 {
                anyhow::bail!(
                    "connections.max_pool_size must be at least 1 (connection: {})",
                    c.name
                );
            }
        }

        Ok(())
    }
}

fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            anyhow::bail!("unterminated env var reference: ${{{after}");
        };
        let key = &after[..end];
        if key.is_empty() {
            anyhow::bail!("invalid env var reference: ${{}}");
        }
        let v = std::env::var(key)
            .map_err(|_| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
        out.push_str(&v);
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
version = "1"

[[connections]]
name = "local"
url = "postgres://localhost/shop"
"#;

    #[test]
    fn parse_minimal_with_defaults() {
        let file = ConfigFile::parse(MINIMAL).unwrap();
        let c = &file.connections[0];
        assert_eq!(c.dialect, DialectKind::Ansi);
        assert_eq!(c.max_pool_size, 16);
        assert_eq!(c.statement_timeout, None);
        assert_eq!(c.table_ref("orders"), TableRef::new("orders"));
    }

    #[test]
    fn parse_full_connection() {
        let file = ConfigFile::parse(
            r#"
version = "1"

[[connections]]
name = "warehouse"
dialect = "sql_server"
url = "sqlserver://db:1433"
database = "sales"
schema = "dbo"
max_pool_size = 4
statement_timeout = 30
"#,
        )
        .unwrap();
        let c = &file.connections[0];
        assert_eq!(c.dialect, DialectKind::SqlServer);
        assert_eq!(c.max_pool_size, 4);
        assert_eq!(c.statement_timeout, Some(30));
        assert_eq!(
            c.table_ref("orders"),
            TableRef::new("orders").schema("dbo").database("sales")
        );
    }

    #[test]
    fn expands_env_vars() {
        // SAFETY: test-only, unique variable name.
        unsafe { std::env::set_var("TABCRUD_TEST_HOST", "db.internal") };
        assert_eq!(
            expand_env_vars("postgres://${TABCRUD_TEST_HOST}:5432/x").unwrap(),
            "postgres://db.internal:5432/x"
        );
        assert_eq!(expand_env_vars("no refs $HOME").unwrap(), "no refs $HOME");
        assert!(expand_env_vars("${TABCRUD_TEST_UNSET_VAR}").is_err());
        assert!(expand_env_vars("${}").is_err());
        assert!(expand_env_vars("${OPEN").is_err());
    }

    #[test]
    fn rejects_invalid_files() {
        let cases = [
            r#"version = "2"
[[connections]]
name = "a"
url = "u""#,
            r#"version = "1""#,
            r#"version = "1"
[[connections]]
name = " "
url = "u""#,
            r#"version = "1"
[[connections]]
name = "a"
url = """#,
            r#"version = "1"
[[connections]]
name = "a"
url = "u"
[[connections]]
name = "a"
url = "v""#,
            r#"version = "1"
[[connections]]
name = "a"
url = "u"
max_pool_size = 0"#,
            r#"version = "1"
[[connections]]
name = "a"
url = "u"
dialect = "oracle""#,
        ];
        for raw in cases {
            assert!(ConfigFile::parse(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn unknown_connection_lists_known_names() {
        let settings = Settings {
            config_path: PathBuf::from(DEFAULT_CONFIG),
            file: ConfigFile::parse(MINIMAL).unwrap(),
        };
        assert!(settings.connection("local").is_ok());
        let err = settings.connection("prod").unwrap_err();
        assert!(err.to_string().contains("configured: local"), "{err}");
    }
}
