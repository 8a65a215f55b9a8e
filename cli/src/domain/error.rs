//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Input errors ──────────────────────────────────────────────────────────────

/// Errors raised while validating the step inputs, before any remote call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Input required and not supplied: {0}")]
    Missing(&'static str),

    #[error("Required SQL file or DACPAC package to execute action.")]
    NoDeploymentTarget,

    #[error("Both a DACPAC package and a SQL file were supplied; provide only one.")]
    ConflictingTargets,

    #[error("Unable to find file at location: {0}")]
    FileNotFound(String),

    #[error("Invalid dacpac file path provided as input {0}")]
    InvalidPackagePath(String),

    #[error("Invalid sql file path provided as input {0}")]
    InvalidScriptPath(String),
}

// ── Connection string errors ──────────────────────────────────────────────────

/// Errors raised while parsing an ADO.NET-style connection string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectionStringError {
    #[error("Invalid connection string: segment '{0}' is not a key=value pair.")]
    MalformedSegment(String),

    #[error("Invalid connection string: unterminated quoted value for '{0}'.")]
    UnterminatedQuote(String),

    #[error("Invalid connection string: missing required key '{0}'.")]
    MissingKey(&'static str),

    #[error("Invalid connection string: port '{0}' is not a number.")]
    InvalidPort(String),
}

// ── Firewall errors ───────────────────────────────────────────────────────────

/// Errors raised by the firewall rule lifecycle.
#[derive(Debug, Error)]
pub enum FirewallError {
    #[error("Unable to detect client IP address for server '{server}': {output}")]
    IpNotDetected { server: String, output: String },

    #[error("Failed to add firewall rule for {ip} on server '{server}': {reason}")]
    CreateRejected {
        server: String,
        ip: String,
        reason: String,
    },

    #[error("Failed to remove firewall rule '{rule}' from server '{server}': {reason}")]
    RemoveFailed {
        server: String,
        rule: String,
        reason: String,
    },
}

// ── Deployment errors ─────────────────────────────────────────────────────────

/// Errors raised by the deployment step itself.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("{tool} exited with {code}")]
    ToolFailed { tool: String, code: String },

    #[error("Deployment cancelled before completion.")]
    Cancelled,
}
