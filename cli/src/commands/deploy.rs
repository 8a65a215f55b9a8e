//! `azsql-deploy`: open the firewall, deploy, close the firewall.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use crate::application::ports::AccessTokenProvider;
use crate::application::services::deploy::{DeploymentPlan, run_deployment};
use crate::domain::request::split_arguments;
use crate::domain::{ConnectionDescriptor, DeploymentTarget, InputError, ServerIdentity};
use crate::infra::azure_cli::Authorizer;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::load_tool_config;
use crate::infra::fs::resolve_file_path;
use crate::infra::resource_manager::ArmClient;
use crate::infra::shutdown::ShutdownSignal;
use crate::infra::sqlcmd::SqlCmdProbe;
use crate::infra::tools::SqlToolRunner;
use crate::output::{OutputContext, TerminalReporter};

/// Step inputs. Each one falls back to the `INPUT_*` variable GitHub Actions
/// sets for the matching action input; blank values count as absent.
#[derive(Args, Debug, Default)]
pub struct DeployArgs {
    /// Fully-qualified Azure SQL server name, e.g. myserver.database.windows.net
    #[arg(long, env = "INPUT_SERVER-NAME")]
    pub server_name: Option<String>,

    /// ADO.NET connection string of the target database
    #[arg(long, env = "INPUT_CONNECTION-STRING", hide_env_values = true)]
    pub connection_string: Option<String>,

    /// Path to a .dacpac package to publish
    #[arg(long, env = "INPUT_DACPAC-PACKAGE")]
    pub dacpac_package: Option<String>,

    /// Path to a .sql script to execute
    #[arg(long, env = "INPUT_SQL-FILE")]
    pub sql_file: Option<String>,

    /// Extra arguments appended to the sqlpackage/sqlcmd invocation
    #[arg(long, env = "INPUT_ARGUMENTS", allow_hyphen_values = true)]
    pub arguments: Option<String>,
}

/// Validate the inputs into a plan. Performs no remote calls.
///
/// # Errors
///
/// Returns an error for missing inputs, an unparsable connection string,
/// a missing file, or a wrong file extension.
pub fn build_plan(args: &DeployArgs) -> Result<DeploymentPlan> {
    let server_name = required(args.server_name.as_deref(), "server-name")?;
    let connection_string = required(args.connection_string.as_deref(), "connection-string")?;

    let server = ServerIdentity::new(server_name)?;
    let connection = ConnectionDescriptor::parse(connection_string)?;

    let target =
        DeploymentTarget::from_inputs(args.dacpac_package.as_deref(), args.sql_file.as_deref())?;
    let resolved = resolve_file_path(target.path())?;
    let request = target.with_path(resolved).into_request(
        connection_string,
        &connection,
        split_arguments(args.arguments.as_deref()),
    );

    Ok(DeploymentPlan {
        server,
        connection,
        request,
    })
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, InputError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(InputError::Missing(name))
}

/// Run the deployment.
///
/// # Errors
///
/// Returns an error if validation, authorization, firewall setup, or the
/// deployment tool fails.
pub async fn run(ctx: &OutputContext, args: &DeployArgs) -> Result<ExitCode> {
    let plan = build_plan(args)?;
    let config = load_tool_config()?;
    tracing::debug!(?config, server = %plan.server, "inputs validated");

    let mut shutdown = ShutdownSignal::install()?;

    let reporter = TerminalReporter::new(ctx);
    ctx.info("authorizing with Azure...");
    let token = Authorizer::from_env(TokioCommandRunner::default())
        .access_token()
        .await
        .context("Azure authorization failed")?;

    let arm = ArmClient::new(&config.arm_endpoint, token)?;
    let probe = SqlCmdProbe::new(
        TokioCommandRunner::default(),
        config.sqlcmd_path.clone(),
        Duration::from_secs(config.probe_timeout_secs),
    );
    let tools = SqlToolRunner::new(TokioCommandRunner::default(), config);

    run_deployment(&arm, &probe, &tools, &reporter, &plan, shutdown.recv()).await?;

    ctx.success("Successfully deployed to the target database.");
    Ok(ExitCode::SUCCESS)
}
