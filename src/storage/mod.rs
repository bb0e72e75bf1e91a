//! Storage media for sessions
//!
//! Backends are interchangeable implementations of [`StorageMedia`]:
//! - `memory`: in-process map
//! - `file`: JSON documents under the state directory

mod factory;
pub mod file;
mod media;
pub mod memory;
pub mod registration;

pub use factory::{create_storage, StorageKind};
pub use file::FileStorage;
pub use media::{StorageMedia, StorageMediaRef};
pub use memory::MemoryStorage;
pub use registration::{register, RegistrationOutcome, StorageRegistration};
