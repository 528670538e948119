//! SSH session over `ssh2`
//!
//! One authenticated connection per host. Commands run as one script per
//! batch on a fresh channel with a pseudo-terminal; files go over SFTP.

use ssh2::{ErrorCode, OpenFlags, OpenType, Session};
use std::fs::File;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use crate::config::ConnectionSettings;
use crate::domain::ports::{CommandBatch, CommandOutput, RemoteConnector, RemoteShell};
use crate::error::{AuthFailure, RemoteError};
use crate::infrastructure::interrupt::{CleanupId, CleanupRegistry};

use super::script::{compose_script, normalize_output, wrap_for_exec, Elevation, SECRET_PATH};

/// libssh2's timeout error code
const LIBSSH2_ERROR_TIMEOUT: i32 = -9;

/// Opens [`SshSession`]s with shared connection settings.
#[derive(Clone)]
pub struct SshConnector {
    settings: ConnectionSettings,
    cleanup: CleanupRegistry,
}

impl SshConnector {
    pub fn new(settings: ConnectionSettings, cleanup: CleanupRegistry) -> Self {
        Self { settings, cleanup }
    }
}

impl RemoteConnector for SshConnector {
    type Session = SshSession;

    fn connect(&self, address: &str) -> Result<SshSession, RemoteError> {
        let session = open_session(address, &self.settings)?;
        tracing::debug!(host = address, user = %self.settings.user, "connected");
        Ok(SshSession {
            address: address.to_string(),
            settings: self.settings.clone(),
            session,
            cleanup: self.cleanup.clone(),
            remote_cleanup: None,
        })
    }
}

/// An authenticated session to one host.
pub struct SshSession {
    address: String,
    settings: ConnectionSettings,
    session: Session,
    cleanup: CleanupRegistry,
    remote_cleanup: Option<CleanupId>,
}

impl SshSession {
    fn channel_error(&self, e: impl ToString) -> RemoteError {
        RemoteError::Channel {
            host: self.address.clone(),
            message: e.to_string(),
        }
    }

    /// Upload the password to [`SECRET_PATH`] through a private local file.
    fn upload_secret(&mut self) -> Result<(), RemoteError> {
        let Some(password) = self.settings.password.clone() else {
            return Ok(());
        };

        let mut local = tempfile::Builder::new()
            .prefix(".scd_elevation")
            .tempfile()
            .map_err(|e| self.channel_error(e))?;
        let local_id = self.cleanup.register_file(local.path());

        let written = local
            .write_all(password.expose().as_bytes())
            .and_then(|_| local.write_all(b"\n"))
            .and_then(|_| local.flush());
        let result = match written {
            Ok(()) => self.send_file(local.path(), SECRET_PATH),
            Err(e) => Err(self.channel_error(e)),
        };

        self.cleanup.release(local_id);
        drop(local);
        result?;

        if self.remote_cleanup.is_none() {
            let address = self.address.clone();
            let settings = self.settings.clone();
            self.remote_cleanup = Some(
                self.cleanup
                    .register_remote(move || remove_remote_secret(&address, &settings)),
            );
        }
        Ok(())
    }

    fn run(&mut self, command: &str) -> Result<CommandOutput, RemoteError> {
        let mut channel = self
            .session
            .channel_session()
            .map_err(|e| self.channel_error(e))?;
        channel
            .request_pty("xterm", None, None)
            .map_err(|e| self.channel_error(e))?;
        channel.exec(command).map_err(|e| self.channel_error(e))?;

        let mut raw = Vec::new();
        channel
            .read_to_end(&mut raw)
            .map_err(|e| self.channel_error(e))?;
        channel.wait_close().map_err(|e| self.channel_error(e))?;
        let exit_code = channel.exit_status().map_err(|e| self.channel_error(e))?;

        Ok(CommandOutput::new(
            exit_code,
            normalize_output(&String::from_utf8_lossy(&raw)),
        ))
    }
}

impl RemoteShell for SshSession {
    fn user(&self) -> &str {
        &self.settings.user
    }

    fn execute(&mut self, batch: &CommandBatch) -> Result<CommandOutput, RemoteError> {
        let elevation = match (batch.elevate, self.settings.password.is_some()) {
            (false, _) => Elevation::Off,
            (true, false) => Elevation::NonInteractive,
            (true, true) => {
                self.upload_secret()?;
                Elevation::SecretFile(SECRET_PATH)
            }
        };

        let script = compose_script(batch, elevation);
        tracing::trace!(host = %self.address, script = %script, "executing batch");

        let output = self.run(&wrap_for_exec(&script))?;
        tracing::debug!(host = %self.address, exit_code = output.exit_code, lines = output.lines.len(), "batch finished");
        Ok(output)
    }

    fn send_file(&mut self, local_path: &Path, remote_path: &str) -> Result<(), RemoteError> {
        let transfer_error = |e: &dyn std::fmt::Display| RemoteError::Transfer {
            host: self.address.clone(),
            local: local_path.to_path_buf(),
            remote: remote_path.to_string(),
            message: e.to_string(),
        };

        let mut local = File::open(local_path).map_err(|e| transfer_error(&e))?;
        let sftp = self.session.sftp().map_err(|e| transfer_error(&e))?;
        let mut remote = sftp
            .open_mode(
                Path::new(remote_path),
                OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNCATE,
                0o600,
                OpenType::File,
            )
            .map_err(|e| transfer_error(&e))?;
        io::copy(&mut local, &mut remote).map_err(|e| transfer_error(&e))?;

        tracing::debug!(host = %self.address, local = %local_path.display(), remote = remote_path, "sent file");
        Ok(())
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        // The remote trap already removed the secret once a batch has exited
        if let Some(id) = self.remote_cleanup.take() {
            self.cleanup.release(id);
        }
        let _ = self.session.disconnect(None, "bye", None);
    }
}

/// Connect, handshake and authenticate. Only this phase is time-bounded.
fn open_session(address: &str, settings: &ConnectionSettings) -> Result<Session, RemoteError> {
    let connection_error = |message: String| RemoteError::Connection {
        host: address.to_string(),
        message,
    };
    let timeout_error = || RemoteError::Timeout {
        host: address.to_string(),
        seconds: settings.timeout.as_secs(),
    };

    let addrs = (address, settings.port)
        .to_socket_addrs()
        .map_err(|e| connection_error(e.to_string()))?;

    let mut last_error = None;
    let mut stream = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, settings.timeout) {
            Ok(s) => {
                stream = Some(s);
                break;
            }
            Err(e) => last_error = Some(e),
        }
    }
    let stream = match (stream, last_error) {
        (Some(stream), _) => stream,
        (None, Some(e)) if e.kind() == io::ErrorKind::TimedOut => return Err(timeout_error()),
        (None, Some(e)) => return Err(connection_error(e.to_string())),
        (None, None) => return Err(connection_error("address did not resolve".to_string())),
    };

    let mut session = Session::new().map_err(|e| connection_error(e.to_string()))?;
    session.set_tcp_stream(stream);
    session.set_timeout(timeout_millis(settings.timeout));
    session.handshake().map_err(|e| {
        if e.code() == ErrorCode::Session(LIBSSH2_ERROR_TIMEOUT) {
            timeout_error()
        } else {
            connection_error(e.to_string())
        }
    })?;

    authenticate(&session, address, settings)?;
    session.set_timeout(0);
    Ok(session)
}

/// Private key, then password, then the agent as a last resort.
fn authenticate(session: &Session, address: &str, settings: &ConnectionSettings) -> Result<(), RemoteError> {
    let user = settings.user.as_str();

    if let Some(key) = &settings.private_key {
        if let Err(e) = session.userauth_pubkey_file(user, None, key, None) {
            tracing::debug!(host = address, key = %key.display(), error = %e, "key authentication failed");
        }
    }

    if !session.authenticated() {
        if let Some(password) = &settings.password {
            if let Err(e) = session.userauth_password(user, password.expose()) {
                tracing::debug!(host = address, error = %e, "password authentication failed");
            }
        }
    }

    if !session.authenticated() {
        if let Err(e) = session.userauth_agent(user) {
            tracing::debug!(host = address, error = %e, "agent authentication failed");
        }
    }

    if session.authenticated() {
        return Ok(());
    }

    let reason = if settings.private_key.is_some() || settings.password.is_some() {
        AuthFailure::Rejected
    } else {
        AuthFailure::NoCredential
    };
    Err(RemoteError::Authentication {
        host: address.to_string(),
        reason,
    })
}

fn timeout_millis(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}

/// Best-effort removal of the secret over a fresh connection.
fn remove_remote_secret(address: &str, settings: &ConnectionSettings) {
    let result = open_session(address, settings).and_then(|session| {
        session.set_timeout(timeout_millis(settings.timeout));
        let mut channel = session.channel_session().map_err(|e| RemoteError::Channel {
            host: address.to_string(),
            message: e.to_string(),
        })?;
        channel
            .exec(&format!("rm -f {}", SECRET_PATH))
            .and_then(|_| channel.wait_close())
            .map_err(|e| RemoteError::Channel {
                host: address.to_string(),
                message: e.to_string(),
            })
    });

    match result {
        Ok(()) => tracing::debug!(host = address, "removed elevation secret"),
        Err(e) => tracing::warn!(host = address, error = %e, "could not remove elevation secret"),
    }
}
