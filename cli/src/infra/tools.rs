//! Deployment tool execution: implements `DeploymentRunner`.

use anyhow::Result;

use crate::application::ports::{CommandRunner, DeploymentRunner};
use crate::domain::{DeployError, DeploymentRequest, DeploymentTool, ToolConfig};

/// Runs `sqlpackage` or `sqlcmd` with output streamed to the CI log.
pub struct SqlToolRunner<R: CommandRunner> {
    runner: R,
    config: ToolConfig,
}

impl<R: CommandRunner> SqlToolRunner<R> {
    pub fn new(runner: R, config: ToolConfig) -> Self {
        Self { runner, config }
    }

    fn program(&self, tool: DeploymentTool) -> &str {
        match tool {
            DeploymentTool::SqlPackage => &self.config.sqlpackage_path,
            DeploymentTool::SqlCmd => &self.config.sqlcmd_path,
        }
    }
}

impl<R: CommandRunner> DeploymentRunner for SqlToolRunner<R> {
    async fn deploy(&self, request: &DeploymentRequest) -> Result<()> {
        let tool = request.tool();
        let program = self.program(tool);
        let args = request.arguments();
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        tracing::info!(
            program,
            args = %request.redacted_arguments().join(" "),
            "starting deployment tool"
        );

        let status = self.runner.run_status(program, &arg_refs).await?;
        if !status.success() {
            return Err(DeployError::ToolFailed {
                tool: tool.name().to_owned(),
                code: status
                    .code()
                    .map_or_else(|| "a signal".to_owned(), |c| format!("exit code {c}")),
            }
            .into());
        }
        Ok(())
    }
}
