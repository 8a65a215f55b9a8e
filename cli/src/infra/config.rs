//! Loads `ToolConfig` from `AZSQL_*` environment variables.

use anyhow::{Context, Result};

use crate::domain::ToolConfig;

/// Prefix shared by every tool setting.
pub const ENV_PREFIX: &str = "AZSQL_";

/// Read tool settings from the process environment, falling back to defaults.
///
/// # Errors
///
/// Returns an error if a variable is present but cannot be parsed
/// (e.g. a non-numeric `AZSQL_PROBE_TIMEOUT_SECS`).
pub fn load_tool_config() -> Result<ToolConfig> {
    envy::prefixed(ENV_PREFIX)
        .from_env::<ToolConfig>()
        .context("failed to load tool settings from AZSQL_* env vars")
}
