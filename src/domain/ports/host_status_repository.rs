//! HostStatusRepository port - persistence of the host status store

use crate::domain::entities::HostStatusStore;
use crate::error::StateError;

/// Loads and saves the `HostStatusStore`.
pub trait HostStatusRepository {
    /// Load the store. A missing or unreadable file yields an empty store.
    fn load(&self) -> HostStatusStore;

    /// Persist the store. Implementations must never leave a half-written file.
    fn save(&self, store: &HostStatusStore) -> Result<(), StateError>;
}
