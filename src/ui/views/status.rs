//! `--host-status` output.

use scd::domain::entities::HostStatusStore;

/// JSON view of the persisted status.
///
/// `host` is `"all"` for every record, or an address or name. Returns `None`
/// when a single host has no record.
pub fn status_json(store: &HostStatusStore, host: &str) -> Option<serde_json::Value> {
    if host == "all" {
        return serde_json::to_value(store.status()).ok();
    }

    let name = store.canonical_name(host);
    let record = store.get(name)?;
    let mut map = serde_json::Map::new();
    map.insert(name.to_string(), serde_json::to_value(record).ok()?);
    Some(serde_json::Value::Object(map))
}
