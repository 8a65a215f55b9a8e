//! Firewall rule types, naming and client-IP extraction.
//!
//! Pure functions only; no I/O, no async.

use std::net::Ipv4Addr;
use std::sync::LazyLock;

use regex::Regex;

/// Prefix for rules created by this tool.
pub const RULE_NAME_PREFIX: &str = "AzureSqlAction";

/// Matches the denial message SQL Server returns to blocked clients, e.g.
/// `Client with IP address '10.0.0.5' is not allowed to access the server.`
static BLOCKED_IP_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"Client with IP address '(\d{1,3}(?:\.\d{1,3}){3})' is not allowed")
        .expect("valid regex")
});

/// A named IP-range allow-entry on a SQL server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallRule {
    pub name: String,
    pub start_ip: Ipv4Addr,
    pub end_ip: Ipv4Addr,
}

impl FirewallRule {
    /// A rule admitting exactly one address.
    #[must_use]
    pub fn single(name: impl Into<String>, ip: Ipv4Addr) -> Self {
        Self {
            name: name.into(),
            start_ip: ip,
            end_ip: ip,
        }
    }

    /// Whether `ip` falls inside this rule's inclusive range.
    #[must_use]
    pub fn covers(&self, ip: Ipv4Addr) -> bool {
        self.start_ip <= ip && ip <= self.end_ip
    }
}

/// Rule name for a run started at `unix_millis`.
#[must_use]
pub fn rule_name(unix_millis: i64) -> String {
    format!("{RULE_NAME_PREFIX}{unix_millis}")
}

/// Extract the denied client address from SQL tool output.
#[must_use]
pub fn extract_blocked_ip(output: &str) -> Option<Ipv4Addr> {
    BLOCKED_IP_RE
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Outcome of probing the server from the current network location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    /// The probe connected; no rule is needed.
    Permitted,
    /// The server refused this address.
    Blocked(Ipv4Addr),
}

/// Ownership bookkeeping for the one rule a run may create.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RuleState {
    /// `add` has not completed.
    #[default]
    Uninitialized,
    /// Access was already permitted; nothing to remove.
    NotOwned,
    /// This run created `FirewallRule` and must remove it.
    Owned(FirewallRule),
    /// Teardown done. Terminal.
    Removed,
}

impl RuleState {
    #[must_use]
    pub fn owned_rule(&self) -> Option<&FirewallRule> {
        match self {
            Self::Owned(rule) => Some(rule),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }
}
