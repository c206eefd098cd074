//! Service layer: the single-flight refresh worker.

pub mod refresher;

pub use refresher::{RefreshHandle, RefreshPolicy, spawn_refresher};
