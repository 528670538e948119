//! Scenario: Partial Failures
//!
//! Journey: a stage fails halfway through a deployment, or a host is
//! unreachable, and the user reruns once the problem is fixed.
//!
//! Success Criteria:
//! - Stages that succeeded stay recorded and are not repeated
//! - The failing stage and its output are reported
//! - One bad host never stops the others

use scd::domain::value_objects::Stage;
use scd::error::{DeployError, RemoteError};
use scd::HostOutcome;

use crate::common::*;

#[test]
fn scenario_failed_stage_resumes_where_it_stopped() {
    let ws = Workspace::new();
    let config = ws.dotfiles_config(&["10.0.0.5"]);
    let remote = FakeConnector::new(REMOTE_USER)
        .hostname("10.0.0.5", "web1")
        .fail_on("usermod", 6);

    // Step 1: the shell change fails after programs were installed
    let (summary, _) = ws.deploy(&remote, &config, false);
    assert_eq!(summary.failed_count(), 1);

    let failure = summary.failures().next().expect("one failure");
    assert_eq!(failure.address, "10.0.0.5");
    assert_eq!(failure.stage, Some(Stage::ChangeShell));
    assert!(matches!(
        failure.error,
        DeployError::Stage { exit_code: 6, .. }
    ));
    assert!(failure.output().iter().any(|line| line.contains("usermod")));

    {
        let log = remote.log();
        assert!(log.shipped_to("10.0.0.5").is_empty(), "files stage must not run");
        assert!(!log.ran("10.0.0.5", "touch ~/.initialized"));
    }

    let record = ws.status().record("web1");
    assert!(record.has_installed("git"));
    assert!(record.shell.is_none());
    assert!(record.deployed_files.is_empty());
    assert!(record.executed_scripts.is_empty());

    // Step 2: fixed host, rerun picks up at the shell change
    remote.heal();
    remote.reset_log();
    let (summary, _) = ws.deploy(&remote, &config, false);
    match &summary.outcomes[0] {
        HostOutcome::Deployed { report, .. } => assert_eq!(
            report.stages,
            vec![Stage::ChangeShell, Stage::DeployFiles, Stage::RunScripts]
        ),
        other => panic!("expected a deployment, got {:?}", other),
    }
    assert!(!remote.log().ran("10.0.0.5", "install"));
}

#[test]
fn scenario_unreachable_host_does_not_stop_the_others() {
    let ws = Workspace::new();
    let config = ws.dotfiles_config(&["10.0.0.5", "10.0.0.6"]);
    let remote = FakeConnector::new(REMOTE_USER)
        .unreachable("10.0.0.5")
        .hostname("10.0.0.6", "web2");

    let (summary, _) = ws.deploy(&remote, &config, false);
    assert_eq!(summary.outcomes.len(), 2);
    assert!(!summary.is_success());

    match &summary.outcomes[0] {
        HostOutcome::Failed(failure) => {
            assert_eq!(failure.stage, None);
            assert!(matches!(
                failure.error,
                DeployError::Remote(RemoteError::Timeout { .. })
            ));
        }
        other => panic!("expected a failure, got {:?}", other),
    }
    assert!(matches!(summary.outcomes[1], HostOutcome::Deployed { .. }));

    let status = ws.status();
    assert_eq!(status.resolved_name("10.0.0.5"), None);
    assert!(status.get("web2").is_some());
}

#[test]
fn scenario_system_destination_is_extracted_with_sudo() {
    let ws = Workspace::new();
    let mut config = ws.dotfiles_config(&["10.0.0.5"]);
    ws.file("motd", "welcome\n");
    config.files.push(scd::domain::value_objects::FileMapping::new(
        ws.path("motd").display().to_string(),
        "/etc/motd",
    ));
    let remote = FakeConnector::new(REMOTE_USER);

    let (summary, _) = ws.deploy(&remote, &config, false);
    assert!(summary.is_success());

    let log = remote.log();
    assert!(log.shipped_to("10.0.0.5").contains(&"etc/motd".to_string()));
    assert!(log.ran("10.0.0.5", "sudo tar -xzf /tmp/scd_conf.tar.gz -C / --exclude='home/deploy'"));
    let files_batch = log
        .batches
        .iter()
        .find(|(_, batch)| batch.lines.iter().any(|l| l.starts_with("sudo tar")))
        .map(|(_, batch)| batch)
        .expect("extraction batch");
    assert!(files_batch.elevate);
}
