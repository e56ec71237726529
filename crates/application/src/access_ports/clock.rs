use chrono::{DateTime, Utc};

/// Source of the current instant.
///
/// Entitlement decisions read it on every call; implementations must never
/// hand back a cached value.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}
