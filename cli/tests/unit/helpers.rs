//! Shared mock infrastructure for unit tests.
//!
//! Recording implementations of the port traits. Every call is appended to a
//! shared [`EventLog`] so tests can assert on ordering across collaborators.

#![allow(dead_code, clippy::expect_used)]

use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::sync::Notify;
use azsql_deploy::application::ports::{
    ClientIpProbe, DeploymentRunner, ProgressReporter, SqlResourceManager, SqlServer,
};
use azsql_deploy::domain::{
    ConnectionDescriptor, DeploymentRequest, DeploymentTarget, FirewallRule, ProbeResult,
    ServerIdentity,
};

pub const SERVER_FQDN: &str = "test1.database.windows.net";
pub const CLIENT_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 5);

// ── Event log ─────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().expect("lock").push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().expect("lock").clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

// ── Fixtures ──────────────────────────────────────────────────────────────────

pub fn identity() -> ServerIdentity {
    ServerIdentity::new(SERVER_FQDN).expect("valid server")
}

pub fn connection() -> ConnectionDescriptor {
    ConnectionDescriptor::parse(
        "Server=tcp:test1.database.windows.net,1433;Initial Catalog=testDB;User Id=testUser;Password=testPassword;",
    )
    .expect("valid connection string")
}

pub fn sql_server() -> SqlServer {
    SqlServer {
        id: "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Sql/servers/test1".into(),
        name: "test1".into(),
        fqdn: SERVER_FQDN.into(),
    }
}

pub fn script_request() -> DeploymentRequest {
    DeploymentTarget::Script("TestSqlFile.sql".into()).into_request(
        "unused",
        &connection(),
        Vec::new(),
    )
}

// ── Mock: resource manager ────────────────────────────────────────────────────

/// In-memory ARM double. Failure switches are checked before recording.
pub struct FakeResources {
    pub log: EventLog,
    pub existing: Vec<FirewallRule>,
    pub server_missing: bool,
    pub fail_list: bool,
    pub fail_create: bool,
    /// Notified after a rule is created, before the call returns.
    pub on_create: Option<Arc<Notify>>,
    /// Number of delete calls that fail before one succeeds.
    pub delete_failures: Mutex<u32>,
    pub created: Mutex<Vec<FirewallRule>>,
    pub deleted: Mutex<Vec<String>>,
}

impl FakeResources {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            existing: Vec::new(),
            server_missing: false,
            fail_list: false,
            fail_create: false,
            on_create: None,
            delete_failures: Mutex::new(0),
            created: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn created(&self) -> Vec<FirewallRule> {
        self.created.lock().expect("lock").clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().expect("lock").clone()
    }
}

impl SqlResourceManager for FakeResources {
    async fn resolve_server(&self, identity: &ServerIdentity) -> Result<SqlServer> {
        self.log.push(format!("resolve {}", identity.logical_name()));
        if self.server_missing {
            anyhow::bail!(
                "Sql server '{}' was not found in the subscription.",
                identity.logical_name()
            );
        }
        Ok(sql_server())
    }

    async fn list_firewall_rules(&self, _: &SqlServer) -> Result<Vec<FirewallRule>> {
        self.log.push("list");
        if self.fail_list {
            anyhow::bail!("403 Forbidden: AuthorizationFailed");
        }
        Ok(self.existing.clone())
    }

    async fn create_firewall_rule(
        &self,
        _: &SqlServer,
        rule: &FirewallRule,
    ) -> Result<FirewallRule> {
        self.log.push(format!("create {}", rule.name));
        if self.fail_create {
            anyhow::bail!("400 Bad Request: invalid IP range");
        }
        self.created.lock().expect("lock").push(rule.clone());
        if let Some(notify) = &self.on_create {
            notify.notify_one();
        }
        Ok(rule.clone())
    }

    async fn delete_firewall_rule(&self, _: &SqlServer, rule_name: &str) -> Result<()> {
        self.log.push(format!("delete {rule_name}"));
        let mut failures = self.delete_failures.lock().expect("lock");
        if *failures > 0 {
            *failures -= 1;
            anyhow::bail!("503 Service Unavailable");
        }
        self.deleted.lock().expect("lock").push(rule_name.to_owned());
        Ok(())
    }
}

// ── Mock: client IP probe ─────────────────────────────────────────────────────

pub enum ProbeBehaviour {
    Permitted,
    Blocked(Ipv4Addr),
    Fails,
}

pub struct FakeProbe {
    pub log: EventLog,
    pub behaviour: ProbeBehaviour,
}

impl FakeProbe {
    pub fn new(log: &EventLog, behaviour: ProbeBehaviour) -> Self {
        Self {
            log: log.clone(),
            behaviour,
        }
    }
}

impl ClientIpProbe for FakeProbe {
    async fn probe(&self, server: &ServerIdentity, _: &ConnectionDescriptor) -> Result<ProbeResult> {
        self.log.push(format!("probe {}", server.fqdn()));
        match self.behaviour {
            ProbeBehaviour::Permitted => Ok(ProbeResult::Permitted),
            ProbeBehaviour::Blocked(ip) => Ok(ProbeResult::Blocked(ip)),
            ProbeBehaviour::Fails => anyhow::bail!("Unable to detect client IP address"),
        }
    }
}

// ── Mock: deployment runner ───────────────────────────────────────────────────

pub enum RunnerBehaviour {
    Succeeds,
    Fails,
    /// Never completes; used to exercise cancellation.
    Hangs,
}

pub struct FakeRunner {
    pub log: EventLog,
    pub behaviour: RunnerBehaviour,
}

impl FakeRunner {
    pub fn new(log: &EventLog, behaviour: RunnerBehaviour) -> Self {
        Self {
            log: log.clone(),
            behaviour,
        }
    }
}

impl DeploymentRunner for FakeRunner {
    async fn deploy(&self, request: &DeploymentRequest) -> Result<()> {
        self.log.push(format!("deploy {}", request.tool().name()));
        match self.behaviour {
            RunnerBehaviour::Succeeds => Ok(()),
            RunnerBehaviour::Fails => anyhow::bail!("sqlcmd exited with exit code 1"),
            RunnerBehaviour::Hangs => std::future::pending().await,
        }
    }
}

// ── Mock: progress reporter ───────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingReporter {
    pub steps: Mutex<Vec<String>>,
    pub successes: Mutex<Vec<String>>,
    pub warnings: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().expect("lock").clone()
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().expect("lock").clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.steps.lock().expect("lock").push(message.to_owned());
    }
    fn success(&self, message: &str) {
        self.successes.lock().expect("lock").push(message.to_owned());
    }
    fn warn(&self, message: &str) {
        self.warnings.lock().expect("lock").push(message.to_owned());
    }
}
