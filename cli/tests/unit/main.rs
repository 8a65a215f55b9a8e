//! Unit tests for azsql-deploy
//!
//! These tests use mocked dependencies and run fast without external I/O.

mod deploy_service;
mod helpers;
