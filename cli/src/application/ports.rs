//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::fmt;
use std::process::Output;

use anyhow::Result;

use crate::domain::{
    ConnectionDescriptor, DeploymentRequest, FirewallRule, ProbeResult, ServerIdentity,
};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Bearer credential for the Azure Resource Manager API.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Raw bearer token.
    pub token: String,
    /// Subscription the token is scoped to.
    pub subscription_id: String,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"***")
            .field("subscription_id", &self.subscription_id)
            .finish()
    }
}

/// A SQL server resource as known to the resource manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlServer {
    /// ARM resource id, e.g. `/subscriptions/…/servers/test1`.
    pub id: String,
    /// Logical server name.
    pub name: String,
    /// Fully-qualified domain name.
    pub fqdn: String,
}

// ── Authorization Port ────────────────────────────────────────────────────────

/// Supplies a credential for the resource-management API.
#[allow(async_fn_in_trait)]
pub trait AccessTokenProvider {
    /// Acquire a bearer token and the subscription it applies to.
    async fn access_token(&self) -> Result<AccessToken>;
}

// ── Resource Manager Port ─────────────────────────────────────────────────────

/// Control-plane operations on a SQL server's firewall.
#[allow(async_fn_in_trait)]
pub trait SqlResourceManager {
    /// Find the server resource matching `identity` in the subscription.
    async fn resolve_server(&self, identity: &ServerIdentity) -> Result<SqlServer>;
    /// List the server's firewall rules.
    async fn list_firewall_rules(&self, server: &SqlServer) -> Result<Vec<FirewallRule>>;
    /// Create (or overwrite) `rule` on the server and return the persisted rule.
    async fn create_firewall_rule(
        &self,
        server: &SqlServer,
        rule: &FirewallRule,
    ) -> Result<FirewallRule>;
    /// Delete the rule named `rule_name` from the server.
    async fn delete_firewall_rule(&self, server: &SqlServer, rule_name: &str) -> Result<()>;
}

// ── Network Probe Port ────────────────────────────────────────────────────────

/// Detects whether the current network location may reach the server.
#[allow(async_fn_in_trait)]
pub trait ClientIpProbe {
    /// Attempt a benign query and report the outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe fails without revealing a client address.
    async fn probe(
        &self,
        server: &ServerIdentity,
        connection: &ConnectionDescriptor,
    ) -> Result<ProbeResult>;
}

// ── Deployment Port ───────────────────────────────────────────────────────────

/// Executes a deployment request with the matching external tool.
#[allow(async_fn_in_trait)]
pub trait DeploymentRunner {
    /// Run the request to completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool cannot be started or exits non-zero.
    async fn deploy(&self, request: &DeploymentRequest) -> Result<()>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
    /// Run a program with inherited stdio and return only its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<std::process::ExitStatus>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
