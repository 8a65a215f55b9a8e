//! Tests for the `deploy` application service.
//!
//! Verifies the strict ordering resolve → probe → rule → tool → cleanup and
//! that cleanup runs on success, failure, and cancellation.

#![allow(clippy::expect_used)]

use std::sync::Arc;

use azsql_deploy::application::services::deploy::{DeploymentPlan, run_deployment};
use azsql_deploy::domain::DeployError;
use tokio::sync::Notify;

use crate::helpers::{
    CLIENT_IP, EventLog, FakeProbe, FakeResources, FakeRunner, ProbeBehaviour, RecordingReporter,
    RunnerBehaviour, connection, identity, script_request,
};

fn plan() -> DeploymentPlan {
    DeploymentPlan {
        server: identity(),
        connection: connection(),
        request: script_request(),
    }
}

fn never() -> std::future::Pending<()> {
    std::future::pending()
}

#[tokio::test]
async fn blocked_script_deploy_runs_in_order_and_cleans_up() {
    let log = EventLog::default();
    let resources = FakeResources::new(&log);
    let probe = FakeProbe::new(&log, ProbeBehaviour::Blocked(CLIENT_IP));
    let runner = FakeRunner::new(&log, RunnerBehaviour::Succeeds);
    let reporter = RecordingReporter::default();

    run_deployment(&resources, &probe, &runner, &reporter, &plan(), never())
        .await
        .expect("deploy");

    let rule = resources.created().pop().expect("rule created");
    assert_eq!(
        log.events(),
        vec![
            "resolve test1".to_string(),
            "probe test1.database.windows.net".to_string(),
            "list".to_string(),
            format!("create {}", rule.name),
            "deploy sqlcmd".to_string(),
            format!("delete {}", rule.name),
        ]
    );
    assert!(reporter.warnings().is_empty());
    assert!(
        reporter
            .successes()
            .iter()
            .any(|m| m.contains(&format!("removed firewall rule '{}'", rule.name)))
    );
}

#[tokio::test]
async fn permitted_location_deploys_without_rule_calls() {
    let log = EventLog::default();
    let resources = FakeResources::new(&log);
    let probe = FakeProbe::new(&log, ProbeBehaviour::Permitted);
    let runner = FakeRunner::new(&log, RunnerBehaviour::Succeeds);
    let reporter = RecordingReporter::default();

    run_deployment(&resources, &probe, &runner, &reporter, &plan(), never())
        .await
        .expect("deploy");

    assert_eq!(log.count("create"), 0);
    assert_eq!(log.count("delete"), 0);
    assert_eq!(log.count("deploy"), 1);
}

#[tokio::test]
async fn failed_tool_still_removes_rule_once() {
    let log = EventLog::default();
    let resources = FakeResources::new(&log);
    let probe = FakeProbe::new(&log, ProbeBehaviour::Blocked(CLIENT_IP));
    let runner = FakeRunner::new(&log, RunnerBehaviour::Fails);
    let reporter = RecordingReporter::default();

    let err = run_deployment(&resources, &probe, &runner, &reporter, &plan(), never())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("sqlcmd exited with exit code 1"));
    assert_eq!(log.count("delete"), 1);
    assert_eq!(resources.deleted().len(), 1);
}

#[tokio::test]
async fn cancellation_still_removes_rule() {
    let log = EventLog::default();
    let resources = FakeResources::new(&log);
    let probe = FakeProbe::new(&log, ProbeBehaviour::Blocked(CLIENT_IP));
    let runner = FakeRunner::new(&log, RunnerBehaviour::Hangs);
    let reporter = RecordingReporter::default();

    let err = run_deployment(
        &resources,
        &probe,
        &runner,
        &reporter,
        &plan(),
        std::future::ready(()),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::Cancelled)
    ));
    assert_eq!(log.count("delete"), 1);
}

#[tokio::test]
async fn cancellation_during_rule_creation_skips_tool_and_removes_rule() {
    let log = EventLog::default();
    let signal = Arc::new(Notify::new());
    let mut resources = FakeResources::new(&log);
    resources.on_create = Some(Arc::clone(&signal));
    let probe = FakeProbe::new(&log, ProbeBehaviour::Blocked(CLIENT_IP));
    let runner = FakeRunner::new(&log, RunnerBehaviour::Succeeds);
    let reporter = RecordingReporter::default();

    let err = run_deployment(
        &resources,
        &probe,
        &runner,
        &reporter,
        &plan(),
        signal.notified(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::Cancelled)
    ));
    let rule = resources.created().pop().expect("rule created");
    assert_eq!(log.count("deploy"), 0);
    assert_eq!(resources.deleted(), vec![rule.name]);
}

#[tokio::test]
async fn cleanup_failure_does_not_mask_success() {
    let log = EventLog::default();
    let resources = FakeResources::new(&log);
    *resources.delete_failures.lock().expect("lock") = 1;
    let probe = FakeProbe::new(&log, ProbeBehaviour::Blocked(CLIENT_IP));
    let runner = FakeRunner::new(&log, RunnerBehaviour::Succeeds);
    let reporter = RecordingReporter::default();

    run_deployment(&resources, &probe, &runner, &reporter, &plan(), never())
        .await
        .expect("deployment outcome wins");

    let warnings = reporter.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Failed to remove firewall rule"));
}

#[tokio::test]
async fn cleanup_failure_does_not_mask_tool_failure() {
    let log = EventLog::default();
    let resources = FakeResources::new(&log);
    *resources.delete_failures.lock().expect("lock") = 1;
    let probe = FakeProbe::new(&log, ProbeBehaviour::Blocked(CLIENT_IP));
    let runner = FakeRunner::new(&log, RunnerBehaviour::Fails);
    let reporter = RecordingReporter::default();

    let err = run_deployment(&resources, &probe, &runner, &reporter, &plan(), never())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("sqlcmd exited"));
    assert_eq!(reporter.warnings().len(), 1);
}

#[tokio::test]
async fn unresolved_server_stops_before_probe() {
    let log = EventLog::default();
    let mut resources = FakeResources::new(&log);
    resources.server_missing = true;
    let probe = FakeProbe::new(&log, ProbeBehaviour::Blocked(CLIENT_IP));
    let runner = FakeRunner::new(&log, RunnerBehaviour::Succeeds);
    let reporter = RecordingReporter::default();

    let err = run_deployment(&resources, &probe, &runner, &reporter, &plan(), never())
        .await
        .unwrap_err();

    let msg = format!("{err:#}");
    assert!(msg.contains("Unable to get details of SQL server test1.database.windows.net"));
    assert!(msg.contains("was not found in the subscription"));
    assert_eq!(log.events(), vec!["resolve test1"]);
}

#[tokio::test]
async fn rejected_rule_prevents_deployment() {
    let log = EventLog::default();
    let mut resources = FakeResources::new(&log);
    resources.fail_create = true;
    let probe = FakeProbe::new(&log, ProbeBehaviour::Blocked(CLIENT_IP));
    let runner = FakeRunner::new(&log, RunnerBehaviour::Succeeds);
    let reporter = RecordingReporter::default();

    assert!(
        run_deployment(&resources, &probe, &runner, &reporter, &plan(), never())
            .await
            .is_err()
    );
    assert_eq!(log.count("deploy"), 0);
    assert_eq!(log.count("delete"), 0);
}
