//! Config Deployer
//!
//! Applies one host's outstanding work in a fixed stage order:
//! install programs, change shell, deploy files, run scripts.
//! Each stage's contribution is persisted as soon as it succeeds.

use std::fs;

use crate::application::state::PersistentHostState;
use crate::domain::entities::{OutstandingWork, StatusUpdate};
use crate::domain::ports::{
    CommandBatch, CommandOutput, DeployEvent, DeployEventSink, HostStatusRepository, RemoteShell,
};
use crate::domain::services::commands::{self, ARCHIVE_PATH};
use crate::domain::value_objects::{expand_local_home, HostIdentity, ScriptSpec, Stage};
use crate::error::{DeployError, HostFailure};
use crate::infrastructure::archive::build_archive;
use crate::infrastructure::interrupt::CleanupRegistry;

use super::result::DeployReport;

/// Drives a `RemoteShell` through the deployment stages for one host.
pub struct ConfigDeployer<'a, S, R>
where
    S: RemoteShell,
    R: HostStatusRepository,
{
    host: &'a HostIdentity,
    shell: &'a mut S,
    state: &'a mut PersistentHostState<R>,
    events: &'a dyn DeployEventSink,
    cleanup: &'a CleanupRegistry,
    report: DeployReport,
}

impl<'a, S, R> ConfigDeployer<'a, S, R>
where
    S: RemoteShell,
    R: HostStatusRepository,
{
    pub fn new(
        host: &'a HostIdentity,
        shell: &'a mut S,
        state: &'a mut PersistentHostState<R>,
        events: &'a dyn DeployEventSink,
        cleanup: &'a CleanupRegistry,
    ) -> Self {
        Self {
            host,
            shell,
            state,
            events,
            cleanup,
            report: DeployReport::new(),
        }
    }

    /// Run every stage that has work. The first failing stage ends the
    /// deployment; stages persisted before it stay recorded.
    pub fn deploy(mut self, work: &OutstandingWork) -> Result<DeployReport, HostFailure> {
        self.install_programs(&work.programs)
            .map_err(|e| self.failure(Stage::InstallPrograms, e))?;
        if let Some(shell) = &work.shell {
            self.change_shell(shell)
                .map_err(|e| self.failure(Stage::ChangeShell, e))?;
        }
        self.deploy_files(work)
            .map_err(|e| self.failure(Stage::DeployFiles, e))?;
        self.run_scripts(&work.scripts)
            .map_err(|e| self.failure(Stage::RunScripts, e))?;

        Ok(self.report)
    }

    fn failure(&self, stage: Stage, error: DeployError) -> HostFailure {
        HostFailure::new(self.host.address(), Some(stage), error)
    }

    fn name(&self) -> String {
        self.host.name().to_string()
    }

    fn install_programs(&mut self, programs: &[String]) -> Result<(), DeployError> {
        if programs.is_empty() {
            return Ok(());
        }

        let batch = CommandBatch::new(commands::install_programs(programs)).elevated(true);
        self.run_stage(Stage::InstallPrograms, programs.to_vec(), &batch)?;

        self.state.apply(
            self.host.name(),
            StatusUpdate::ProgramsInstalled(programs.to_vec()),
        )?;
        self.report.programs_installed = programs.to_vec();
        Ok(())
    }

    fn change_shell(&mut self, shell: &str) -> Result<(), DeployError> {
        let user = self.shell.user().to_string();
        let batch = CommandBatch::new(commands::change_shell(shell, &user)).elevated(true);
        self.run_stage(Stage::ChangeShell, vec![shell.to_string()], &batch)?;

        self.state
            .apply(self.host.name(), StatusUpdate::ShellChanged(shell.to_string()))?;
        self.report.shell_changed = Some(shell.to_string());
        Ok(())
    }

    fn deploy_files(&mut self, work: &OutstandingWork) -> Result<(), DeployError> {
        if work.files.is_empty() {
            return Ok(());
        }

        let items = work
            .files
            .iter()
            .map(|f| f.destination.display().to_string())
            .collect();
        self.events.on_event(DeployEvent::StageStarted {
            host: self.name(),
            stage: Stage::DeployFiles,
            items,
        });

        let archive = build_archive(&work.files).map_err(DeployError::Archive)?;
        let local_id = self.cleanup.register_file(archive.path());
        let sent = self.shell.send_file(archive.path(), ARCHIVE_PATH);
        self.cleanup.release(local_id);
        drop(archive);
        sent?;

        let (lines, elevate) = commands::extract_archive(&work.files, self.shell.user());
        let batch = CommandBatch::new(lines)
            .elevated(elevate)
            .removing(ARCHIVE_PATH);
        self.execute(Stage::DeployFiles, &batch)?;

        self.state.apply(
            self.host.name(),
            StatusUpdate::FilesDeployed {
                sources: work.deployed_sources.clone(),
                at: work.snapshot,
            },
        )?;
        self.report.files_deployed = work.files.len();
        Ok(())
    }

    /// Each script is its own batch. A missing or failing script is skipped;
    /// the stage fails afterwards if any script did not succeed.
    fn run_scripts(&mut self, scripts: &[ScriptSpec]) -> Result<(), DeployError> {
        if scripts.is_empty() {
            return Ok(());
        }

        let mut succeeded = 0;
        for script in scripts {
            let path = expand_local_home(&script.path);
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(script = %script.path, error = %e, "skipping script");
                    self.skip_script(script, format!("could not read {}: {}", path.display(), e));
                    continue;
                }
            };

            let batch =
                CommandBatch::new(commands::script_lines(&content)).elevated(script.elevate);
            self.events.on_event(DeployEvent::StageStarted {
                host: self.name(),
                stage: Stage::RunScripts,
                items: vec![script.path.clone()],
            });

            match self.execute(Stage::RunScripts, &batch) {
                Ok(_) => {
                    self.state.apply(
                        self.host.name(),
                        StatusUpdate::ScriptExecuted(script.id().to_string()),
                    )?;
                    self.report.scripts_executed.push(script.id().to_string());
                    succeeded += 1;
                }
                Err(DeployError::Stage { exit_code, .. }) => {
                    self.skip_script(script, format!("exited with code {}", exit_code));
                }
                Err(e) => return Err(e),
            }
        }

        if succeeded != scripts.len() {
            return Err(DeployError::Scripts {
                attempted: scripts.len(),
                succeeded,
            });
        }
        Ok(())
    }

    fn skip_script(&mut self, script: &ScriptSpec, reason: String) {
        self.events.on_event(DeployEvent::ScriptSkipped {
            host: self.name(),
            script: script.path.clone(),
            reason: reason.clone(),
        });
        self.report.scripts_skipped.push((script.path.clone(), reason));
    }

    fn run_stage(
        &mut self,
        stage: Stage,
        items: Vec<String>,
        batch: &CommandBatch,
    ) -> Result<CommandOutput, DeployError> {
        self.events.on_event(DeployEvent::StageStarted {
            host: self.name(),
            stage,
            items,
        });
        self.execute(stage, batch)
    }

    /// Execute `batch`, reporting its output. A non-zero exit is a stage error.
    fn execute(&mut self, stage: Stage, batch: &CommandBatch) -> Result<CommandOutput, DeployError> {
        if !self.report.stages.contains(&stage) {
            self.report.stages.push(stage);
        }

        let output = self.shell.execute(batch)?;
        if output.success() {
            self.events.on_event(DeployEvent::StageSucceeded {
                host: self.name(),
                stage,
                output: output.lines.clone(),
            });
            return Ok(output);
        }

        self.events.on_event(DeployEvent::StageFailed {
            host: self.name(),
            stage,
            exit_code: output.exit_code,
            output: output.lines.clone(),
        });
        Err(DeployError::Stage {
            stage,
            exit_code: output.exit_code,
            output: output.lines,
        })
    }
}
