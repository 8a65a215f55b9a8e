//! Application service: deploy use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::future::Future;

use anyhow::{Context, Result};

use crate::application::ports::{
    ClientIpProbe, DeploymentRunner, ProgressReporter, SqlResourceManager,
};
use crate::application::services::firewall::FirewallManager;
use crate::domain::{ConnectionDescriptor, DeployError, DeploymentRequest, ServerIdentity};

/// Validated inputs for one deployment run.
#[derive(Debug, Clone)]
pub struct DeploymentPlan {
    pub server: ServerIdentity,
    pub connection: ConnectionDescriptor,
    pub request: DeploymentRequest,
}

/// Resolve the server, open the firewall, deploy, and close the firewall.
///
/// `cancel` resolves when the run should be aborted (e.g. Ctrl-C); the
/// firewall rule is still removed in that case.
///
/// # Errors
///
/// Returns the first error of resolution, rule creation, or deployment.
/// A failure to remove the rule is reported as a warning and never replaces
/// the deployment outcome.
pub async fn run_deployment(
    resources: &impl SqlResourceManager,
    probe: &impl ClientIpProbe,
    runner: &impl DeploymentRunner,
    reporter: &impl ProgressReporter,
    plan: &DeploymentPlan,
    cancel: impl Future<Output = ()>,
) -> Result<()> {
    reporter.step(&format!("resolving server '{}'...", plan.server));
    let server = resources
        .resolve_server(&plan.server)
        .await
        .with_context(|| format!("Unable to get details of SQL server {}", plan.server))?;

    let mut firewall = FirewallManager::new(resources, probe, server);
    let tool = plan.request.tool().name();

    with_firewall_access(
        &mut firewall,
        &plan.server,
        &plan.connection,
        reporter,
        async {
            reporter.step(&format!("running {tool}..."));
            runner.deploy(&plan.request).await?;
            reporter.success(&format!("{tool} completed against '{}'", plan.connection.database));
            anyhow::Ok(())
        },
        cancel,
    )
    .await
}

/// Run `action` with the firewall opened for this client, then always close it.
///
/// The rule is added before `action` is first polled. `cancel` is polled
/// first, so an already pending cancellation skips `action` entirely. Removal
/// runs after `action` returns `Ok`, returns `Err`, or loses the race against
/// `cancel`.
///
/// # Errors
///
/// Returns the add error, the action error, or `DeployError::Cancelled`.
pub async fn with_firewall_access<T, M, P>(
    firewall: &mut FirewallManager<'_, M, P>,
    identity: &ServerIdentity,
    connection: &ConnectionDescriptor,
    reporter: &impl ProgressReporter,
    action: impl Future<Output = Result<T>>,
    cancel: impl Future<Output = ()>,
) -> Result<T>
where
    M: SqlResourceManager,
    P: ClientIpProbe,
{
    let outcome: Result<T> = async {
        reporter.step("checking firewall access...");
        firewall.add_firewall_rule(identity, connection).await?;
        if let Some(rule) = firewall.state().owned_rule() {
            reporter.success(&format!(
                "added firewall rule '{}' for {}",
                rule.name, rule.start_ip
            ));
        }

        // A cancellation that arrived during the add step wins over the action.
        tokio::select! {
            biased;
            () = cancel => Err(DeployError::Cancelled.into()),
            result = action => result,
        }
    }
    .await;

    let owned = firewall.state().owned_rule().map(|r| r.name.clone());
    match firewall.remove_firewall_rule().await {
        Ok(()) => {
            if let Some(name) = owned {
                reporter.success(&format!("removed firewall rule '{name}'"));
            }
        }
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "firewall rule cleanup failed");
            reporter.warn(&format!("{e:#}"));
        }
    }

    outcome
}
