mod cli;
mod compile;
mod config;
mod connections;
mod exec;
mod render;
mod request;

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "tabcrud=info";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // Logs go to stderr; stdout carries command output.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Compile(args) => compile::run(args),
        cli::Command::Run(args) => exec::run(args).await,
        cli::Command::Connections(args) => connections::run(args),
    }
}
