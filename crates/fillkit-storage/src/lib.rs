//! # fillkit-storage
//!
//! Storage backends for filing finished documents. Provides the local
//! filesystem backend and a name-addressed registry; remote destinations
//! implement [`fillkit_core::StorageBackend`] and register alongside it.

pub mod local;
pub mod registry;

pub use local::LocalBackend;
pub use registry::BackendRegistry;
