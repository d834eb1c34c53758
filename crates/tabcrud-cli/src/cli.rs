use std::path::PathBuf;
use std::str::FromStr;
use tabcrud::DialectKind;

use crate::config::DEFAULT_CONFIG;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Compile,
    Run,
    Connections,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Update,
    Delete,
    Read,
    Test,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Read => "read",
            Self::Test => "test",
        }
    }

    /// Whether the operation reads a JSON request body.
    pub fn takes_request(self) -> bool {
        !matches!(self, Self::Test)
    }
}

impl FromStr for Operation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "insert" => Ok(Self::Insert),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "read" => Ok(Self::Read),
            "test" => Ok(Self::Test),
            other => anyhow::bail!("unknown operation: {other} (expected insert|update|delete|read|test)"),
        }
    }
}

/// Where a request body comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestSource {
    Stdin,
    File(PathBuf),
}

impl RequestSource {
    fn from_arg(v: &str) -> Self {
        if v == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(v))
        }
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Compile(CompileArgs),
    Run(RunArgs),
    Connections(ConnectionsArgs),
}

#[derive(Debug, Clone)]
pub struct CompileArgs {
    pub op: Operation,
    pub table: String,
    pub schema: Option<String>,
    pub database: Option<String>,
    pub dialect: DialectKind,
    pub request: RequestSource,
}

#[derive(Debug, Clone)]
pub struct RunArgs {
    pub op: Operation,
    pub table: String,
    pub connection: String,
    pub config: PathBuf,
    pub request: RequestSource,
}

#[derive(Debug, Clone)]
pub struct ConnectionsArgs {
    pub config: PathBuf,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" => Ok(Command::Help(HelpTopic::Root)),
        "compile" => parse_compile(it.map(|s| s.as_str())),
        "run" => parse_run(it.map(|s| s.as_str())),
        "connections" => parse_connections(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

/// Match `--flag <v>` and `--flag=<v>`.
fn flag_value<'a>(
    token: &'a str,
    flag: &str,
    it: &mut impl Iterator<Item = &'a str>,
) -> anyhow::Result<Option<&'a str>> {
    if token == flag {
        let Some(v) = it.next() else {
            anyhow::bail!("{flag} requires a value");
        };
        return Ok(Some(v));
    }
    Ok(token
        .strip_prefix(flag)
        .and_then(|rest| rest.strip_prefix('=')))
}

fn parse_operation(op: Option<&str>, topic: HelpTopic) -> anyhow::Result<Operation> {
    let Some(op) = op else {
        anyhow::bail!(
            "missing operation; run `tabcrud {} --help`",
            match topic {
                HelpTopic::Run => "run",
                _ => "compile",
            }
        );
    };
    op.parse()
}

fn parse_compile<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut op: Option<&str> = None;
    let mut table: Option<String> = None;
    let mut schema: Option<String> = None;
    let mut database: Option<String> = None;
    let mut dialect = DialectKind::default();
    let mut request = RequestSource::Stdin;

    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Compile));
        }
        if let Some(v) = flag_value(token, "--table", &mut it)? {
            table = Some(v.to_string());
        } else if let Some(v) = flag_value(token, "--schema", &mut it)? {
            schema = Some(v.to_string());
        } else if let Some(v) = flag_value(token, "--database", &mut it)? {
            database = Some(v.to_string());
        } else if let Some(v) = flag_value(token, "--dialect", &mut it)? {
            dialect = v.parse()?;
        } else if let Some(v) = flag_value(token, "--request", &mut it)? {
            request = RequestSource::from_arg(v);
        } else if op.is_none() && !token.starts_with('-') {
            op = Some(token);
        } else {
            anyhow::bail!("unknown argument: {token}");
        }
    }

    let op = parse_operation(op, HelpTopic::Compile)?;
    let Some(table) = table else {
        anyhow::bail!("--table is required");
    };

    Ok(Command::Compile(CompileArgs {
        op,
        table,
        schema,
        database,
        dialect,
        request,
    }))
}

fn parse_run<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut op: Option<&str> = None;
    let mut table: Option<String> = None;
    let mut connection: Option<String> = None;
    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut request = RequestSource::Stdin;

    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Run));
        }
        if let Some(v) = flag_value(token, "--table", &mut it)? {
            table = Some(v.to_string());
        } else if let Some(v) = flag_value(token, "--connection", &mut it)? {
            connection = Some(v.to_string());
        } else if let Some(v) = flag_value(token, "--config", &mut it)? {
            config = PathBuf::from(v);
        } else if let Some(v) = flag_value(token, "--request", &mut it)? {
            request = RequestSource::from_arg(v);
        } else if op.is_none() && !token.starts_with('-') {
            op = Some(token);
        } else {
            anyhow::bail!("unknown argument: {token}");
        }
    }

    let op = parse_operation(op, HelpTopic::Run)?;
    let Some(table) = table else {
        anyhow::bail!("--table is required");
    };
    let Some(connection) = connection else {
        anyhow::bail!("--connection is required");
    };

    Ok(Command::Run(RunArgs {
        op,
        table,
        connection,
        config,
        request,
    }))
}

fn parse_connections<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);

    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Connections));
        }
        if let Some(v) = flag_value(token, "--config", &mut it)? {
            config = PathBuf::from(v);
        } else {
            anyhow::bail!("unknown argument: {token}");
        }
    }

    Ok(Command::Connections(ConnectionsArgs { config }))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
tabcrud - compile and run JSON CRUD requests against a single table

USAGE:
  tabcrud <COMMAND> [OPTIONS]

COMMANDS:
  compile       Print the SQL and bindings a request compiles to
  run           Execute a request against a configured connection
  connections   List configured connections

Run `tabcrud <command> --help` for more.

Set RUST_LOG (e.g. RUST_LOG=tabcrud=debug) to log compiled statements."
            );
        }
        HelpTopic::Compile => {
            println!(
                "\
USAGE:
  tabcrud compile <insert|update|delete|read|test> --table <NAME> [OPTIONS]

OPTIONS:
  --table <NAME>        Target table
  --schema <NAME>       Schema qualifier
  --database <NAME>     Database qualifier
  --dialect <NAME>      ansi | sql_server | snowflake | postgres (default: ansi)
  --request <FILE|->    JSON request body (default: stdin)
  -h, --help            Print help"
            );
        }
        HelpTopic::Run => {
            println!(
                "\
USAGE:
  tabcrud run <insert|update|delete|read|test> --connection <NAME> --table <NAME> [OPTIONS]

OPTIONS:
  --connection <NAME>   Connection name from the config file
  --table <NAME>        Target table
  --config <FILE>       Config file path (default: {DEFAULT_CONFIG})
  --request <FILE|->    JSON request body (default: stdin)
  -h, --help            Print help

NOTES:
  Only postgres connections can be executed."
            );
        }
        HelpTopic::Connections => {
            println!(
                "\
USAGE:
  tabcrud connections [OPTIONS]

OPTIONS:
  --config <FILE>       Config file path (default: {DEFAULT_CONFIG})
  -h, --help            Print help"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("tabcrud")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn no_args_prints_root_help() {
        let cmd = parse_args(&args(&[])).unwrap();
        assert!(matches!(cmd, Command::Help(HelpTopic::Root)));
    }

    #[test]
    fn parse_compile_with_all_options() {
        let cmd = parse_args(&args(&[
            "compile",
            "update",
            "--table",
            "orders",
            "--schema=sales",
            "--dialect",
            "sql_server",
            "--request",
            "req.json",
        ]))
        .unwrap();
        let Command::Compile(c) = cmd else {
            panic!("expected compile");
        };

        assert_eq!(c.op, Operation::Update);
        assert_eq!(c.table, "orders");
        assert_eq!(c.schema.as_deref(), Some("sales"));
        assert_eq!(c.database, None);
        assert_eq!(c.dialect, DialectKind::SqlServer);
        assert_eq!(c.request, RequestSource::File(PathBuf::from("req.json")));
    }

    #[test]
    fn parse_compile_defaults() {
        let cmd = parse_args(&args(&["compile", "read", "--table=t"])).unwrap();
        let Command::Compile(c) = cmd else {
            panic!("expected compile");
        };
        assert_eq!(c.dialect, DialectKind::Ansi);
        assert_eq!(c.request, RequestSource::Stdin);
    }

    #[test]
    fn parse_run() {
        let cmd = parse_args(&args(&[
            "run",
            "read",
            "--connection",
            "sales",
            "--table",
            "orders",
            "--request",
            "-",
        ]))
        .unwrap();
        let Command::Run(r) = cmd else {
            panic!("expected run");
        };
        assert_eq!(r.op, Operation::Read);
        assert_eq!(r.connection, "sales");
        assert_eq!(r.config, PathBuf::from(DEFAULT_CONFIG));
        assert_eq!(r.request, RequestSource::Stdin);
    }

    #[test]
    fn run_requires_connection_and_table() {
        let err = parse_args(&args(&["run", "read", "--table", "t"])).unwrap_err();
        assert!(err.to_string().contains("--connection"));

        let err = parse_args(&args(&["run", "read", "--connection", "c"])).unwrap_err();
        assert!(err.to_string().contains("--table"));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(&args(&["frobnicate"])).is_err());
        assert!(parse_args(&args(&["compile", "upsert", "--table", "t"])).is_err());
        assert!(parse_args(&args(&["compile", "--table", "t"])).is_err());
        assert!(parse_args(&args(&["compile", "read", "--table"])).is_err());
        assert!(parse_args(&args(&["compile", "read", "--table", "t", "--dialect", "oracle"])).is_err());
        assert!(parse_args(&args(&["connections", "--verbose"])).is_err());
    }

    #[test]
    fn help_per_command() {
        for (cmd, topic) in [
            ("compile", HelpTopic::Compile),
            ("run", HelpTopic::Run),
            ("connections", HelpTopic::Connections),
        ] {
            let parsed = parse_args(&args(&[cmd, "--help"])).unwrap();
            assert!(matches!(parsed, Command::Help(t) if t == topic));
        }
    }
}
