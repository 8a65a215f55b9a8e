//! Application service: temporary firewall rule lifecycle.
//!
//! `FirewallManager` opens the server firewall for the current network
//! location only when it is not already permitted, remembers whether it did
//! so, and removes only the rule it created.

use anyhow::{Context, Result};
use chrono::Utc;

use crate::application::ports::{ClientIpProbe, SqlResourceManager, SqlServer};
use crate::domain::firewall::rule_name;
use crate::domain::{
    ConnectionDescriptor, FirewallError, FirewallRule, ProbeResult, RuleState, ServerIdentity,
};

/// Manages the one ephemeral firewall rule of a deployment run.
///
/// State transitions:
///
/// ```text
/// Uninitialized --add--> NotOwned | Owned(rule)
/// any           --remove (ok)--> Removed
/// ```
///
/// A failed removal leaves the state `Owned` so the caller may retry.
pub struct FirewallManager<'a, M: SqlResourceManager, P: ClientIpProbe> {
    resources: &'a M,
    probe: &'a P,
    server: SqlServer,
    state: RuleState,
}

impl<'a, M: SqlResourceManager, P: ClientIpProbe> FirewallManager<'a, M, P> {
    /// Create a manager scoped to an already-resolved server resource.
    pub fn new(resources: &'a M, probe: &'a P, server: SqlServer) -> Self {
        Self {
            resources,
            probe,
            server,
            state: RuleState::Uninitialized,
        }
    }

    #[must_use]
    pub fn state(&self) -> &RuleState {
        &self.state
    }

    /// Ensure the current network location can reach the server.
    ///
    /// Probes the server; when blocked, reuses an existing rule covering the
    /// detected address or creates a single-address rule owned by this run.
    ///
    /// # Errors
    ///
    /// Returns an error if the client address cannot be detected, the rules
    /// cannot be listed, or the rule creation is rejected. The state is left
    /// non-owned in every error case.
    pub async fn add_firewall_rule(
        &mut self,
        identity: &ServerIdentity,
        connection: &ConnectionDescriptor,
    ) -> Result<()> {
        anyhow::ensure!(
            self.state == RuleState::Uninitialized,
            "firewall rule for server '{}' was already configured by this run",
            self.server.name
        );

        let ip = match self.probe.probe(identity, connection).await? {
            ProbeResult::Permitted => {
                tracing::info!(server = %identity, "client already permitted by server firewall");
                self.state = RuleState::NotOwned;
                return Ok(());
            }
            ProbeResult::Blocked(ip) => ip,
        };

        let existing = self
            .resources
            .list_firewall_rules(&self.server)
            .await
            .with_context(|| format!("listing firewall rules of server '{}'", self.server.name))?;
        if let Some(rule) = existing.iter().find(|r| r.covers(ip)) {
            tracing::info!(rule = %rule.name, %ip, "existing firewall rule covers client address");
            self.state = RuleState::NotOwned;
            return Ok(());
        }

        let rule = FirewallRule::single(rule_name(Utc::now().timestamp_millis()), ip);
        let created = self
            .resources
            .create_firewall_rule(&self.server, &rule)
            .await
            .map_err(|e| FirewallError::CreateRejected {
                server: self.server.name.clone(),
                ip: ip.to_string(),
                reason: format!("{e:#}"),
            })?;

        tracing::info!(rule = %created.name, %ip, server = %self.server.name, "firewall rule created");
        self.state = RuleState::Owned(created);
        Ok(())
    }

    /// Remove the rule this run created, if any.
    ///
    /// Makes no remote call unless the state is `Owned`, so it is safe to call
    /// before `add_firewall_rule`, after a failed add, or more than once.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote delete fails; the rule stays owned.
    pub async fn remove_firewall_rule(&mut self) -> Result<()> {
        let Some(rule) = self.state.owned_rule() else {
            self.state = RuleState::Removed;
            return Ok(());
        };
        let name = rule.name.clone();

        self.resources
            .delete_firewall_rule(&self.server, &name)
            .await
            .map_err(|e| FirewallError::RemoveFailed {
                server: self.server.name.clone(),
                rule: name.clone(),
                reason: format!("{e:#}"),
            })?;

        tracing::info!(rule = %name, server = %self.server.name, "firewall rule removed");
        self.state = RuleState::Removed;
        Ok(())
    }
}
