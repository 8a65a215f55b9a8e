//! Client IP detection through `sqlcmd`: implements `ClientIpProbe`.
//!
//! Azure SQL rejects logins from addresses without a firewall rule and names
//! the rejected address in the error text. A trivial query is enough to learn
//! whether we are blocked and from which address.

use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{ClientIpProbe, CommandRunner};
use crate::domain::firewall::extract_blocked_ip;
use crate::domain::{ConnectionDescriptor, FirewallError, ProbeResult, ServerIdentity};

const PROBE_QUERY: &str = "select getdate()";

pub struct SqlCmdProbe<R: CommandRunner> {
    runner: R,
    program: String,
    timeout: Duration,
}

impl<R: CommandRunner> SqlCmdProbe<R> {
    pub fn new(runner: R, program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            runner,
            program: program.into(),
            timeout,
        }
    }
}

impl<R: CommandRunner> ClientIpProbe for SqlCmdProbe<R> {
    async fn probe(
        &self,
        server: &ServerIdentity,
        connection: &ConnectionDescriptor,
    ) -> Result<ProbeResult> {
        let output = self
            .runner
            .run_with_timeout(
                &self.program,
                &[
                    "-S",
                    server.fqdn(),
                    "-d",
                    &connection.database,
                    "-U",
                    &connection.user,
                    "-P",
                    &connection.password,
                    "-Q",
                    PROBE_QUERY,
                ],
                self.timeout,
            )
            .await?;

        interpret(server, &output)
    }
}

fn interpret(server: &ServerIdentity, output: &std::process::Output) -> Result<ProbeResult> {
    if output.status.success() {
        return Ok(ProbeResult::Permitted);
    }

    let text = format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    match extract_blocked_ip(&text) {
        Some(ip) => {
            tracing::debug!(%ip, "server rejected client address");
            Ok(ProbeResult::Blocked(ip))
        }
        None => Err(FirewallError::IpNotDetected {
            server: server.to_string(),
            output: text.trim().to_owned(),
        }
        .into()),
    }
}
