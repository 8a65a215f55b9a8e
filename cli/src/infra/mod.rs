//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, the
//! Azure CLI, the ARM HTTP API, filesystem access and signal handling.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod azure_cli;
pub mod command_runner;
pub mod config;
pub mod fs;
pub mod resource_manager;
pub mod shutdown;
pub mod sqlcmd;
pub mod tools;
