//! Persistent host state
//!
//! Wraps a `HostStatusRepository` so every recorded change is saved
//! immediately. A crash after any stage therefore never loses that stage.

use crate::domain::entities::{HostStatusRecord, HostStatusStore, StatusUpdate};
use crate::domain::ports::HostStatusRepository;
use crate::error::StateError;

/// The host status store plus the repository it is saved to.
pub struct PersistentHostState<R: HostStatusRepository> {
    repository: R,
    store: HostStatusStore,
}

impl<R: HostStatusRepository> PersistentHostState<R> {
    /// Load the store once.
    pub fn load(repository: R) -> Self {
        let store = repository.load();
        Self { repository, store }
    }

    pub fn store(&self) -> &HostStatusStore {
        &self.store
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Record of `name`, or the never-deployed record.
    pub fn record(&self, name: &str) -> HostStatusRecord {
        self.store.record(name)
    }

    pub fn resolved_name(&self, address: &str) -> Option<&str> {
        self.store.resolved_name(address)
    }

    /// Apply `update` to `name` and save.
    pub fn apply(&mut self, name: &str, update: StatusUpdate) -> Result<(), StateError> {
        self.store.apply(name, update);
        self.repository.save(&self.store)
    }

    /// Cache the canonical name of `address` and save if it changed.
    pub fn map_host(&mut self, address: &str, name: &str) -> Result<(), StateError> {
        if self.store.resolved_name(address) == Some(name) {
            return Ok(());
        }
        self.store.map_host(address, name);
        self.repository.save(&self.store)
    }

    /// Forget the record of `host` (address or name). Returns false if none existed.
    pub fn clear(&mut self, host: &str) -> Result<bool, StateError> {
        if !self.store.clear(host) {
            return Ok(false);
        }
        self.repository.save(&self.store)?;
        Ok(true)
    }
}
