//! Local dotfiles and host status for library-level scenarios.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use filetime::FileTime;
use tempfile::TempDir;

use scd::config::DesiredConfiguration;
use scd::domain::entities::HostStatusStore;
use scd::domain::ports::HostStatusRepository;
use scd::domain::value_objects::{FileMapping, IgnorePatterns, ScriptSpec};
use scd::infrastructure::{CleanupRegistry, JsonHostStatusRepository};
use scd::{Orchestrator, PersistentHostState, RunSummary};

use super::remote::{FakeConnector, RecordingSink};

pub const REMOTE_USER: &str = "deploy";

/// A local "home" holding the files to deploy, plus a status file location.
pub struct Workspace {
    pub dir: TempDir,
    pub state_dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create workspace"),
            state_dir: tempfile::tempdir().expect("Failed to create state dir"),
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write a file whose modification time lies an hour in the past.
    pub fn file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        set_mtime(&path, SystemTime::now() - Duration::from_secs(3600));
        path
    }

    /// Mark a file as modified after any deployment so far.
    pub fn modify(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        std::fs::write(&path, content).expect("Failed to write file");
        set_mtime(&path, SystemTime::now() + Duration::from_secs(3600));
    }

    pub fn repository(&self) -> JsonHostStatusRepository {
        JsonHostStatusRepository::new(self.state_dir.path().join("host_status"))
    }

    /// Status as persisted on disk.
    pub fn status(&self) -> HostStatusStore {
        self.repository().load()
    }

    /// Configuration deploying `.zshrc` and the `.oh-my-zsh` directory,
    /// installing git and zsh, switching to zsh and running `init.sh`.
    pub fn dotfiles_config(&self, hosts: &[&str]) -> DesiredConfiguration {
        self.file(".zshrc", "export ZSH=~/.oh-my-zsh\n");
        self.file(".oh-my-zsh/oh-my-zsh.sh", "echo loaded\n");
        self.file(".oh-my-zsh/themes/robbyrussell.zsh-theme", "PROMPT='%~ '\n");
        self.file(".oh-my-zsh/.git/HEAD", "ref: refs/heads/master\n");
        self.file("init.sh", "echo init\ntouch ~/.initialized\n");

        let mut config = DesiredConfiguration::default();
        config.hosts = hosts.iter().map(|h| h.to_string()).collect();
        config.connection.user = REMOTE_USER.to_string();
        config.files = vec![
            self.mapping(".zshrc"),
            self.mapping(".oh-my-zsh"),
        ];
        config.programs = ["git", "zsh"].iter().map(|p| p.to_string()).collect();
        config.shell = Some("zsh".to_string());
        config.scripts = vec![ScriptSpec::new(self.path("init.sh").display().to_string(), false)];
        config.ignored_files = IgnorePatterns::new([".git"]).expect("valid pattern");
        config
    }

    /// Local `relative` deployed to `~/relative` on the host.
    pub fn mapping(&self, relative: &str) -> FileMapping {
        FileMapping::new(self.path(relative).display().to_string(), format!("~/{}", relative))
    }

    /// One full orchestrator run against `connector`.
    pub fn deploy(
        &self,
        connector: &FakeConnector,
        config: &DesiredConfiguration,
        force: bool,
    ) -> (RunSummary, RecordingSink) {
        let sink = RecordingSink::default();
        let state = PersistentHostState::load(self.repository());
        let summary = Orchestrator::new(connector, state, &sink, CleanupRegistry::new())
            .force(force)
            .run(config)
            .expect("configuration should be valid");
        (summary, sink)
    }
}

fn set_mtime(path: &std::path::Path, time: SystemTime) {
    filetime::set_file_mtime(path, FileTime::from_system_time(time)).expect("Failed to set mtime");
}
