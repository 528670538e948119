//! Host identity value object.

use std::fmt;

/// A remote machine: the address the user typed plus the hostname it reports.
///
/// Status records are keyed by `name`, so two addresses that reach the same
/// machine share one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostIdentity {
    address: String,
    name: String,
}

impl HostIdentity {
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for HostIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.address == self.name {
            f.write_str(&self.name)
        } else {
            write!(f, "{} ({})", self.name, self.address)
        }
    }
}
