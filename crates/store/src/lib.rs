//! Reactive field store: current values of the configuration fields,
//! synchronous change notification, key-value persistence.
//!
//! # Invariants
//! - A write notifies every matching subscriber before it returns.
//! - Only persistent fields ever reach storage.
//! - Unreadable or malformed stored values never fail startup; defaults apply.

mod fields;
mod storage;

pub use fields::{FieldDefaults, FieldStore, SubscriptionId};
pub use storage::{FIELDS_FILE, JsonFileStorage, MemoryStorage, Storage, StorageError};

pub fn crate_info() -> &'static str {
    "textura-store v0.1.0"
}
