//! Orchestrator
//!
//! Runs every configured host independently: resolve its name, reconcile,
//! and deploy unless nothing is outstanding. A failing host never stops the
//! hosts after it.

use crate::application::deploy::{ConfigDeployer, DeployReport};
use crate::application::state::PersistentHostState;
use crate::config::{validate_sources, DesiredConfiguration};
use crate::domain::entities::HostStatusRecord;
use crate::domain::ports::{
    CommandBatch, DeployEvent, DeployEventSink, HostStatusRepository, RemoteConnector, RemoteShell,
};
use crate::domain::services::commands::HOSTNAME_COMMAND;
use crate::domain::services::HostConfiguration;
use crate::domain::value_objects::HostIdentity;
use crate::error::{ConfigError, DeployError, HostFailure};
use crate::infrastructure::interrupt::CleanupRegistry;

/// How one host ended.
#[derive(Debug)]
pub enum HostOutcome {
    Deployed {
        host: HostIdentity,
        report: DeployReport,
    },
    UpToDate {
        host: HostIdentity,
    },
    Failed(HostFailure),
}

impl HostOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, HostOutcome::Failed(_))
    }
}

/// Outcomes of every host, in configured order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<HostOutcome>,
}

impl RunSummary {
    pub fn failures(&self) -> impl Iterator<Item = &HostFailure> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            HostOutcome::Failed(failure) => Some(failure),
            _ => None,
        })
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Runs deployments for all configured hosts.
pub struct Orchestrator<'a, C, R>
where
    C: RemoteConnector,
    R: HostStatusRepository,
{
    connector: &'a C,
    state: PersistentHostState<R>,
    events: &'a dyn DeployEventSink,
    cleanup: CleanupRegistry,
    force: bool,
}

impl<'a, C, R> Orchestrator<'a, C, R>
where
    C: RemoteConnector,
    R: HostStatusRepository,
{
    pub fn new(
        connector: &'a C,
        state: PersistentHostState<R>,
        events: &'a dyn DeployEventSink,
        cleanup: CleanupRegistry,
    ) -> Self {
        Self {
            connector,
            state,
            events,
            cleanup,
            force: false,
        }
    }

    /// Reconcile against an empty record, redeploying everything.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn state(&self) -> &PersistentHostState<R> {
        &self.state
    }

    pub fn into_state(self) -> PersistentHostState<R> {
        self.state
    }

    /// Deploy to every host. Only a configuration problem found before any
    /// host is contacted fails the whole run.
    pub fn run(&mut self, config: &DesiredConfiguration) -> Result<RunSummary, ConfigError> {
        validate_sources(config)?;

        let mut summary = RunSummary::default();
        for address in &config.hosts {
            self.events.on_event(DeployEvent::HostStarted {
                address: address.clone(),
            });

            let outcome = match self.deploy_host(config, address) {
                Ok(outcome) => outcome,
                Err(failure) => {
                    tracing::debug!(host = %address, error = %failure, "host failed");
                    self.events.on_event(DeployEvent::HostFailed {
                        host: address.clone(),
                        stage: failure.stage,
                        message: failure.error.to_string(),
                    });
                    HostOutcome::Failed(failure)
                }
            };
            summary.outcomes.push(outcome);
        }
        Ok(summary)
    }

    fn deploy_host(
        &mut self,
        config: &DesiredConfiguration,
        address: &str,
    ) -> Result<HostOutcome, HostFailure> {
        let fail = |error: DeployError| HostFailure::new(address, None, error);

        // Connect only when the name is unknown or there is work to do
        let mut session = None;
        let cached = self.state.resolved_name(address).map(str::to_string);
        let name = match cached {
            Some(name) => name,
            None => {
                let mut connected = self.connector.connect(address).map_err(|e| fail(e.into()))?;
                let name = resolve_hostname(&mut connected, address).map_err(fail)?;
                self.state.map_host(address, &name).map_err(|e| fail(e.into()))?;
                session = Some(connected);
                name
            }
        };
        let host = HostIdentity::new(address, name);
        self.events.on_event(DeployEvent::HostResolved {
            address: address.to_string(),
            name: host.name().to_string(),
        });

        let record = if self.force {
            HostStatusRecord::default()
        } else {
            self.state.record(host.name())
        };
        let work = HostConfiguration::new(config, &record)
            .map_err(fail)?
            .into_work();

        self.events.on_event(DeployEvent::WorkComputed {
            host: host.name().to_string(),
            programs: work.programs.len(),
            files: work.files.len(),
            scripts: work.scripts.len(),
            shell_change: work.shell.is_some(),
        });

        if work.is_empty() {
            self.events.on_event(DeployEvent::HostUpToDate {
                host: host.name().to_string(),
            });
            return Ok(HostOutcome::UpToDate { host });
        }

        let mut session = match session {
            Some(session) => session,
            None => self.connector.connect(address).map_err(|e| fail(e.into()))?,
        };

        let report = ConfigDeployer::new(
            &host,
            &mut session,
            &mut self.state,
            self.events,
            &self.cleanup,
        )
        .deploy(&work)?;

        self.events.on_event(DeployEvent::HostCompleted {
            host: host.name().to_string(),
        });
        Ok(HostOutcome::Deployed { host, report })
    }
}

/// Ask the host for its canonical name.
fn resolve_hostname<S: RemoteShell>(session: &mut S, address: &str) -> Result<String, DeployError> {
    let output = session.execute(&CommandBatch::new([HOSTNAME_COMMAND]).quiet())?;
    match output.lines.last() {
        Some(name) if output.success() => Ok(name.clone()),
        _ => Err(DeployError::Hostname {
            address: address.to_string(),
            exit_code: output.exit_code,
        }),
    }
}
