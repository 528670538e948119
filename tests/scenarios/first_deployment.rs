//! Scenario: First Deployment and Incremental Reruns
//!
//! Journey: a user deploys their dotfiles to a fresh host, reruns without
//! changes, then edits one file.
//!
//! Success Criteria:
//! - The first run applies every stage in order over one connection
//! - An unchanged rerun contacts nobody
//! - An edit ships exactly the edited file

use scd::domain::value_objects::Stage;
use scd::HostOutcome;

use crate::common::*;

const ADDRESS: &str = "10.0.0.5";

fn stages_of(outcome: &HostOutcome) -> Vec<Stage> {
    match outcome {
        HostOutcome::Deployed { report, .. } => report.stages.clone(),
        other => panic!("expected a deployment, got {:?}", other),
    }
}

#[test]
fn scenario_first_deployment_then_incremental_reruns() {
    let ws = Workspace::new();
    let config = ws.dotfiles_config(&[ADDRESS]);
    let remote = FakeConnector::new(REMOTE_USER).hostname(ADDRESS, "web1");

    // Step 1: fresh host gets everything
    let (summary, _) = ws.deploy(&remote, &config, false);
    assert!(summary.is_success());
    assert_eq!(stages_of(&summary.outcomes[0]), Stage::ORDER.to_vec());

    {
        let log = remote.log();
        assert_eq!(log.connects, vec![ADDRESS], "one connection per host");
        assert!(log.ran(ADDRESS, "install 'git' 'zsh'"));
        assert!(log.ran(ADDRESS, "usermod -s \"$LOGIN_SHELL\" 'deploy'"));
        assert!(log.ran(ADDRESS, "touch ~/.initialized"));
        assert_eq!(
            log.shipped_to(ADDRESS),
            vec![
                "home/deploy/.oh-my-zsh/oh-my-zsh.sh",
                "home/deploy/.oh-my-zsh/themes/robbyrussell.zsh-theme",
                "home/deploy/.zshrc",
            ],
            "ignored .git must not be shipped"
        );
    }

    let status = ws.status();
    assert_eq!(status.resolved_name(ADDRESS), Some("web1"));
    let record = status.get("web1").expect("record for web1");
    assert!(record.has_installed("git"));
    assert!(record.has_installed("zsh"));
    assert_eq!(record.shell.as_deref(), Some("zsh"));
    assert!(record.has_deployed(&ws.path(".zshrc").display().to_string()));
    assert!(record.has_deployed(&ws.path(".oh-my-zsh").display().to_string()));
    assert!(record.has_executed(&ws.path("init.sh").display().to_string()));

    // Step 2: nothing changed, the cached name means no connection at all
    remote.reset_log();
    let (summary, _) = ws.deploy(&remote, &config, false);
    assert!(matches!(summary.outcomes[0], HostOutcome::UpToDate { .. }));
    assert!(remote.log().connects.is_empty());
    assert!(remote.log().batches.is_empty());

    // Step 3: one edited file is the only thing shipped
    ws.modify(".oh-my-zsh/oh-my-zsh.sh", "echo changed\n");
    remote.reset_log();
    let (summary, _) = ws.deploy(&remote, &config, false);
    assert_eq!(stages_of(&summary.outcomes[0]), vec![Stage::DeployFiles]);

    let log = remote.log();
    assert_eq!(log.shipped_to(ADDRESS), vec!["home/deploy/.oh-my-zsh/oh-my-zsh.sh"]);
    assert!(!log.ran(ADDRESS, "install"));
    assert!(!log.ran(ADDRESS, "touch ~/.initialized"));
}

#[test]
fn scenario_new_mapping_ships_all_of_its_files() {
    let ws = Workspace::new();
    let mut config = ws.dotfiles_config(&[ADDRESS]);
    let remote = FakeConnector::new(REMOTE_USER);

    let (summary, _) = ws.deploy(&remote, &config, false);
    assert!(summary.is_success());

    // Older than the last deployment, but never deployed before
    ws.file(".vim/vimrc", "set number\n");
    ws.file(".vim/colors/dark.vim", "hi Normal\n");
    config.files.push(ws.mapping(".vim"));

    remote.reset_log();
    let (summary, _) = ws.deploy(&remote, &config, false);
    assert_eq!(stages_of(&summary.outcomes[0]), vec![Stage::DeployFiles]);
    assert_eq!(
        remote.log().shipped_to(ADDRESS),
        vec!["home/deploy/.vim/colors/dark.vim", "home/deploy/.vim/vimrc"]
    );
}

#[test]
fn scenario_force_redeploys_everything() {
    let ws = Workspace::new();
    let config = ws.dotfiles_config(&[ADDRESS]);
    let remote = FakeConnector::new(REMOTE_USER).hostname(ADDRESS, "web1");

    ws.deploy(&remote, &config, false);
    remote.reset_log();

    let (summary, _) = ws.deploy(&remote, &config, true);
    assert_eq!(stages_of(&summary.outcomes[0]), Stage::ORDER.to_vec());
    assert_eq!(remote.log().shipped_to(ADDRESS).len(), 3);
}
