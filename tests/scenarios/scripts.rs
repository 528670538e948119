//! Scenario: Setup Scripts
//!
//! Journey: some configured scripts are missing or broken.
//!
//! Success Criteria:
//! - Every script is attempted; one bad script does not stop the rest
//! - Only successful scripts are recorded
//! - The host is reported failed while earlier stages stay recorded

use scd::domain::value_objects::{ScriptSpec, Stage};
use scd::error::DeployError;
use scd::HostOutcome;

use crate::common::*;

#[test]
fn scenario_bad_scripts_fail_the_host_but_keep_progress() {
    let ws = Workspace::new();
    let mut config = ws.dotfiles_config(&["10.0.0.5"]);
    let missing = ws.path("missing.sh").display().to_string();
    let broken = ws.file("broken.sh", "echo start\nfalse # boom\n").display().to_string();
    let good = ws.path("init.sh").display().to_string();
    config.scripts = vec![
        ScriptSpec::new(missing.as_str(), false),
        ScriptSpec::new(broken.as_str(), false),
        ScriptSpec::new(good.as_str(), false),
    ];
    let remote = FakeConnector::new(REMOTE_USER)
        .hostname("10.0.0.5", "web1")
        .fail_on("boom", 3);

    // Step 1: all three attempted, one succeeds
    let (summary, sink) = ws.deploy(&remote, &config, false);
    let failure = summary.failures().next().expect("host should fail");
    assert_eq!(failure.stage, Some(Stage::RunScripts));
    assert!(matches!(
        failure.error,
        DeployError::Scripts {
            attempted: 3,
            succeeded: 1
        }
    ));
    assert_eq!(sink.skipped_scripts(), vec![missing.clone(), broken.clone()]);
    assert!(remote.log().ran("10.0.0.5", "touch ~/.initialized"));

    let record = ws.status().record("web1");
    assert_eq!(record.executed_scripts, vec![good.clone()]);
    assert!(record.has_installed("git"));
    assert_eq!(record.shell.as_deref(), Some("zsh"));
    assert!(!record.deployed_files.is_empty());

    // Step 2: the missing script appears and the host is fixed
    ws.file("missing.sh", "echo now here\n");
    remote.heal();
    remote.reset_log();
    let (summary, _) = ws.deploy(&remote, &config, false);
    match &summary.outcomes[0] {
        HostOutcome::Deployed { report, .. } => {
            assert_eq!(report.stages, vec![Stage::RunScripts]);
            assert_eq!(report.scripts_executed, vec![missing, broken]);
        }
        other => panic!("expected a deployment, got {:?}", other),
    }
    assert!(!remote.log().ran("10.0.0.5", "touch ~/.initialized"));
}

#[test]
fn scenario_elevated_script_is_marked_for_elevation() {
    let ws = Workspace::new();
    let mut config = ws.dotfiles_config(&["10.0.0.5"]);
    let root_setup = ws.file("root_setup.sh", "sudo mkdir -p /opt/tools\n");
    config.scripts = vec![ScriptSpec::new(root_setup.display().to_string(), true)];
    let remote = FakeConnector::new(REMOTE_USER);

    let (summary, _) = ws.deploy(&remote, &config, false);
    assert!(summary.is_success());

    let log = remote.log();
    let (_, batch) = log
        .batches
        .iter()
        .find(|(_, batch)| batch.lines == ["sudo mkdir -p /opt/tools"])
        .expect("script batch");
    assert!(batch.elevate);
    assert!(batch.exit_on_error);
}
