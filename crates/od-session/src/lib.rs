//! # od-session
//!
//! Session state coordination for the OpsDesk dashboard.
//!
//! The rest of the application never talks to the identity provider or to
//! local storage for authentication state. It holds a single
//! [`SessionCoordinator`], constructed once at the composition root with
//! its two collaborators injected, and reads the current [`Session`]
//! through it.
//!
//! The coordinator reconciles two asynchronous sources of truth:
//!
//! - a locally persisted session record, read once at startup to present
//!   an optimistic state immediately
//! - the identity provider's event stream, which is the sole authority
//!   and corrects the optimistic state when they disagree
//!
//! All state mutations - login, logout, registration, and inbound provider
//! events - are serialized through one internal mutation point, so the
//! published [`Session`] is always the result of a single committed
//! operation, never a blend of two racing ones.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

mod coordinator;
mod record;
mod session;

pub use coordinator::SessionCoordinator;
pub use record::{PersistedSessionRecord, SLOT_KEY};
pub use session::{Session, SessionStatus};
