//! Session management module

pub mod expiration;
pub mod id;
pub mod manager;
pub mod state;

pub use expiration::ExpirationRoutine;
pub use manager::SessionManager;
pub use state::{is_expired, Session, SessionRecord, SessionRef, SessionValue};
