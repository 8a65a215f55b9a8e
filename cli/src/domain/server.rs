//! Server identity: the fully-qualified host the step was pointed at.

use crate::domain::error::InputError;

/// Fully-qualified SQL server hostname, e.g. `test1.database.windows.net`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    fqdn: String,
}

impl ServerIdentity {
    /// Build an identity from the `server-name` input.
    ///
    /// An optional `tcp:` prefix and `,port` suffix are stripped so the same
    /// value can be pasted from a connection string.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty.
    pub fn new(server_name: &str) -> Result<Self, InputError> {
        let trimmed = server_name.trim();
        let trimmed = match trimmed.get(..4) {
            Some(prefix) if prefix.eq_ignore_ascii_case("tcp:") => &trimmed[4..],
            _ => trimmed,
        };
        let host = trimmed.split(',').next().unwrap_or_default().trim();
        if host.is_empty() {
            return Err(InputError::Missing("server-name"));
        }
        Ok(Self {
            fqdn: host.to_ascii_lowercase(),
        })
    }

    #[must_use]
    pub fn fqdn(&self) -> &str {
        &self.fqdn
    }

    /// Logical server name used by the resource manager: the first DNS label.
    #[must_use]
    pub fn logical_name(&self) -> &str {
        self.fqdn.split('.').next().unwrap_or(&self.fqdn)
    }
}

impl std::fmt::Display for ServerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.fqdn)
    }
}
