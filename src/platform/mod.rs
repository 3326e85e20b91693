//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time (weapon fire gating)
//! - Key-value storage (LocalStorage on web, files on native)

pub mod clock;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use storage::{KeyValueStore, MemoryStore, StorageError};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorageStore;
