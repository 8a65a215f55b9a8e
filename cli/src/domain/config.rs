//! Tool and endpoint settings.
//!
//! Pure types only; loading from the environment lives in `crate::infra::config`.

use serde::Deserialize;

/// Settings read from `AZSQL_*` environment variables.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ToolConfig {
    /// `sqlpackage` binary (`AZSQL_SQLPACKAGE_PATH`).
    #[serde(default = "default_sqlpackage_path")]
    pub sqlpackage_path: String,
    /// `sqlcmd` binary (`AZSQL_SQLCMD_PATH`).
    #[serde(default = "default_sqlcmd_path")]
    pub sqlcmd_path: String,
    /// Azure Resource Manager base URL (`AZSQL_ARM_ENDPOINT`).
    #[serde(default = "default_arm_endpoint")]
    pub arm_endpoint: String,
    /// Timeout for the client-IP probe (`AZSQL_PROBE_TIMEOUT_SECS`).
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            sqlpackage_path: default_sqlpackage_path(),
            sqlcmd_path: default_sqlcmd_path(),
            arm_endpoint: default_arm_endpoint(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

fn default_sqlpackage_path() -> String {
    "sqlpackage".to_string()
}

fn default_sqlcmd_path() -> String {
    "sqlcmd".to_string()
}

fn default_arm_endpoint() -> String {
    "https://management.azure.com".to_string()
}

fn default_probe_timeout_secs() -> u64 {
    30
}
