//! wsm - Web Sessions Manager
//!
//! Binds an unguessable identifier, delivered in a cookie, to a per-visitor
//! key/value session held by a pluggable storage media, and sweeps sessions
//! that outlive their maximum lifetime.

pub mod cli;
pub mod config;
pub mod cookie;
pub mod error;
pub mod session;
pub mod storage;
pub mod ui;

pub use cookie::{Cookie, CookieSink, CookieSource, RequestCookies, ResponseCookies};
pub use error::{WsmError, WsmResult};
pub use session::{ExpirationRoutine, Session, SessionManager, SessionRef, SessionValue};
pub use storage::{StorageKind, StorageMedia, StorageMediaRef};
