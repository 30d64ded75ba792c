//! Client for the expense tracker service.
//!
//! The client is a thin layer: it never holds authoritative state. Every
//! mutation is a request followed by a re-fetch, and every snapshot it keeps
//! (session, alerts) is replaced wholesale.
//!
//! - [`SessionContext`] owns the credential and is handed to [`ApiClient`];
//!   there is no process-wide session.
//! - [`AuthGate`] drives login/register/logout on top of it.
//! - [`AlertCenter`] keeps the latest alert list and its unread count;
//!   [`AlertMonitor`] refreshes it on a fixed interval until cancelled.

pub use alerts::{AlertCenter, AlertSnapshot};
pub use api::ApiClient;
pub use auth::AuthGate;
pub use error::{ClientError, Result};
pub use generation::{Generation, RequestGeneration};
pub use monitor::{AlertMonitor, DEFAULT_POLL_INTERVAL, MonitorHandle};
pub use session::{AuthState, FileStorage, MemoryStorage, Session, SessionContext, SessionStorage};

mod alerts;
mod api;
mod auth;
mod error;
mod generation;
mod monitor;
mod session;
