//! azsql-deploy - Azure SQL deployment step with a temporary firewall rule

use std::process::ExitCode;

use azsql_deploy::cli::Cli;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = cli.output();
    match cli.run(&ctx).await {
        Ok(code) => code,
        Err(e) => {
            ctx.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
