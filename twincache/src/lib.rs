#![deny(clippy::all)]

pub mod coordinator;
pub mod domain;
pub mod planes;
pub mod ports;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::CacheCoordinator;
pub use planes::control::operation::AdminOperations;
pub use planes::data::operation::CacheOperations;
pub use ports::{BackendFactory, CacheBackend};
