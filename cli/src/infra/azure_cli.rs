//! Infrastructure implementations of the `AccessTokenProvider` port.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::application::ports::{AccessToken, AccessTokenProvider, CommandRunner};

/// Resource the ARM bearer token is requested for.
pub const ARM_RESOURCE: &str = "https://management.azure.com/";

/// Environment variables that bypass the Azure CLI when both are set.
pub const TOKEN_ENV: &str = "AZURE_ACCESS_TOKEN";
pub const SUBSCRIPTION_ENV: &str = "AZURE_SUBSCRIPTION_ID";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzTokenResponse {
    access_token: String,
    subscription: String,
}

/// Obtains a token from the logged-in Azure CLI session (`azure/login`).
pub struct AzCliTokenProvider<R: CommandRunner> {
    runner: R,
    program: String,
}

impl<R: CommandRunner> AzCliTokenProvider<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            program: "az".to_string(),
        }
    }
}

impl<R: CommandRunner> AccessTokenProvider for AzCliTokenProvider<R> {
    async fn access_token(&self) -> Result<AccessToken> {
        let output = self
            .runner
            .run(
                &self.program,
                &["account", "get-access-token", "--resource", ARM_RESOURCE, "-o", "json"],
            )
            .await
            .context("running 'az account get-access-token'")?;

        anyhow::ensure!(
            output.status.success(),
            "Azure CLI could not provide an access token. Run 'az login' first: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );

        parse_token_response(&output.stdout)
    }
}

fn parse_token_response(stdout: &[u8]) -> Result<AccessToken> {
    let parsed: AzTokenResponse =
        serde_json::from_slice(stdout).context("parsing 'az account get-access-token' output")?;
    Ok(AccessToken {
        token: parsed.access_token,
        subscription_id: parsed.subscription,
    })
}

/// Token provider selected at startup.
pub enum Authorizer<R: CommandRunner> {
    /// Token and subscription supplied through the environment.
    Static(AccessToken),
    AzCli(AzCliTokenProvider<R>),
}

impl<R: CommandRunner> Authorizer<R> {
    /// Prefer `AZURE_ACCESS_TOKEN` + `AZURE_SUBSCRIPTION_ID`, else the Azure CLI.
    pub fn from_env(runner: R) -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        match (non_empty(TOKEN_ENV), non_empty(SUBSCRIPTION_ENV)) {
            (Some(token), Some(subscription_id)) => Self::Static(AccessToken {
                token,
                subscription_id,
            }),
            _ => Self::AzCli(AzCliTokenProvider::new(runner)),
        }
    }
}

impl<R: CommandRunner> AccessTokenProvider for Authorizer<R> {
    async fn access_token(&self) -> Result<AccessToken> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::AzCli(provider) => provider.access_token().await,
        }
    }
}
