//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application` or `tokio`, and performs no I/O.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod connection;
pub mod error;
pub mod firewall;
pub mod request;
pub mod server;

pub use config::ToolConfig;
pub use connection::ConnectionDescriptor;
pub use error::{ConnectionStringError, DeployError, FirewallError, InputError};
pub use firewall::{FirewallRule, ProbeResult, RuleState};
pub use request::{DeploymentRequest, DeploymentTarget, DeploymentTool};
pub use server::ServerIdentity;
