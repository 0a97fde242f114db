use anyhow::Result;

/// Key under which the full entry collection is persisted. One store
/// instance owns this key exclusively; tests inject a fresh backend per
/// store instead of sharing one.
pub const STORAGE_KEY: &str = "weight-entries";

/// Durable byte-oriented map the store writes through to. The store never
/// sees anything richer than get/set of opaque blobs.
pub trait StorageBackend: Send {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, bytes: &[u8]) -> Result<()>;
}
