//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::commands;
use crate::output::OutputContext;

/// Deploy a DACPAC package or SQL script to Azure SQL through a temporary firewall rule
#[derive(Parser, Debug)]
#[command(name = "azsql-deploy", version)]
pub struct Cli {
    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(flatten)]
    pub deploy: commands::deploy::DeployArgs,
}

impl Cli {
    /// Build the output context for this invocation.
    #[must_use]
    pub fn output(&self) -> OutputContext {
        OutputContext::new(self.no_color, self.quiet)
    }

    /// Execute the deployment.
    ///
    /// # Errors
    ///
    /// Returns an error if any step of the deployment fails.
    pub async fn run(&self, ctx: &OutputContext) -> Result<ExitCode> {
        commands::deploy::run(ctx, &self.deploy).await
    }
}
