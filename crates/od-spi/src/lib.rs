//! # od-spi
//!
//! Provider interfaces for the OpsDesk session layer.
//!
//! The session coordinator consumes exactly two external collaborators,
//! both defined here and both treated as opaque:
//!
//! - [`IdentityProvider`] - the remote auth API (credential validation,
//!   session issuance/revocation, the auth event stream)
//! - [`PersistenceSlot`] - local durable key-value storage for the cached
//!   session record
//!
//! Real deployments back these with the hosted backend service; tests and
//! offline development use the in-memory implementations in
//! `od-provider-memory`. The coordinator itself never branches on which
//! implementation it is talking to.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

mod error;
mod event;
mod provider;
mod storage;

pub use error::{AuthError, AuthResult};
pub use event::{EventListener, ProviderEvent, SessionDetails, SubscriptionGuard};
pub use provider::IdentityProvider;
pub use storage::PersistenceSlot;
