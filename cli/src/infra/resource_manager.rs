//! Azure Resource Manager client: implements `SqlResourceManager`.

use std::net::Ipv4Addr;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::ports::{AccessToken, SqlResourceManager, SqlServer};
use crate::domain::{FirewallRule, ServerIdentity};

/// API version for `Microsoft.Sql/servers` and its firewall rules.
pub const SQL_API_VERSION: &str = "2014-04-01";

#[derive(Deserialize)]
struct Page<T> {
    value: Vec<T>,
    #[serde(rename = "nextLink")]
    next_link: Option<String>,
}

#[derive(Deserialize)]
struct ServerResource {
    id: String,
    name: String,
    #[serde(default)]
    properties: ServerProperties,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ServerProperties {
    fully_qualified_domain_name: Option<String>,
}

#[derive(Deserialize)]
struct RuleResource {
    name: String,
    properties: RuleProperties,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleProperties {
    start_ip_address: String,
    end_ip_address: String,
}

#[derive(Serialize)]
struct RuleBody<'a> {
    properties: &'a RuleProperties,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl RuleResource {
    fn into_rule(self) -> Option<FirewallRule> {
        let start = self.properties.start_ip_address.parse::<Ipv4Addr>().ok()?;
        let end = self.properties.end_ip_address.parse::<Ipv4Addr>().ok()?;
        Some(FirewallRule {
            name: self.name,
            start_ip: start,
            end_ip: end,
        })
    }
}

/// HTTP client for the ARM control plane, scoped to one subscription.
#[derive(Debug, Clone)]
pub struct ArmClient {
    client: Client,
    base_url: String,
    token: AccessToken,
}

impl ArmClient {
    /// Create a client for `endpoint` (normally `https://management.azure.com`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: &str, token: AccessToken) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("azsql-deploy/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_owned(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}?api-version={SQL_API_VERSION}", self.base_url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(&self.token.token)
    }

    async fn get_all<T: serde::de::DeserializeOwned>(&self, first: String) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first);
        while let Some(url) = next {
            let response = self
                .authorized(self.client.get(&url))
                .send()
                .await
                .with_context(|| format!("GET {url}"))?;
            let page: Page<T> = ensure_success(response)
                .await?
                .json()
                .await
                .context("decoding ARM list response")?;
            items.extend(page.value);
            next = page.next_link;
        }
        Ok(items)
    }
}

/// Turn a non-2xx ARM response into an error carrying its code and message.
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    anyhow::bail!(describe_failure(status, &body))
}

fn describe_failure(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => format!(
            "{status}: {} ({})",
            envelope.error.message, envelope.error.code
        ),
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => format!("{status}: {}", body.trim()),
    }
}

impl SqlResourceManager for ArmClient {
    async fn resolve_server(&self, identity: &ServerIdentity) -> Result<SqlServer> {
        let url = self.url(&format!(
            "/subscriptions/{}/providers/Microsoft.Sql/servers",
            self.token.subscription_id
        ));
        let servers: Vec<ServerResource> = self.get_all(url).await.context("listing SQL servers")?;
        tracing::debug!(count = servers.len(), "listed SQL servers");

        servers
            .into_iter()
            .find(|s| {
                s.name.eq_ignore_ascii_case(identity.logical_name())
                    || s.properties
                        .fully_qualified_domain_name
                        .as_deref()
                        .is_some_and(|fqdn| fqdn.eq_ignore_ascii_case(identity.fqdn()))
            })
            .map(|s| SqlServer {
                fqdn: s
                    .properties
                    .fully_qualified_domain_name
                    .unwrap_or_else(|| identity.fqdn().to_owned()),
                id: s.id,
                name: s.name,
            })
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Sql server '{}' was not found in the subscription.",
                    identity.logical_name()
                )
            })
    }

    async fn list_firewall_rules(&self, server: &SqlServer) -> Result<Vec<FirewallRule>> {
        let url = self.url(&format!("{}/firewallRules", server.id));
        let rules: Vec<RuleResource> = self.get_all(url).await?;
        Ok(rules.into_iter().filter_map(RuleResource::into_rule).collect())
    }

    async fn create_firewall_rule(
        &self,
        server: &SqlServer,
        rule: &FirewallRule,
    ) -> Result<FirewallRule> {
        let url = self.url(&format!("{}/firewallRules/{}", server.id, rule.name));
        let properties = RuleProperties {
            start_ip_address: rule.start_ip.to_string(),
            end_ip_address: rule.end_ip.to_string(),
        };
        let response = self
            .authorized(self.client.put(&url))
            .json(&RuleBody {
                properties: &properties,
            })
            .send()
            .await
            .with_context(|| format!("PUT {url}"))?;

        // The rule exists once ARM accepted the PUT, whatever the body holds.
        let response = ensure_success(response).await?;
        match response.json::<RuleResource>().await {
            Ok(created) => Ok(created.into_rule().unwrap_or_else(|| rule.clone())),
            Err(e) => {
                tracing::warn!(rule = %rule.name, error = %e, "unreadable firewall rule response");
                Ok(rule.clone())
            }
        }
    }

    async fn delete_firewall_rule(&self, server: &SqlServer, rule_name: &str) -> Result<()> {
        let url = self.url(&format!("{}/firewallRules/{rule_name}", server.id));
        let response = self
            .authorized(self.client.delete(&url))
            .send()
            .await
            .with_context(|| format!("DELETE {url}"))?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(rule = rule_name, "firewall rule already absent");
            return Ok(());
        }
        ensure_success(response).await?;
        Ok(())
    }
}
