//! # od-provider-memory
//!
//! In-memory implementations of the OpsDesk provider interfaces.
//!
//! These back the session coordinator in tests and offline development.
//! Keeping the fake identity behavior here - behind the same traits the
//! real backend implements - is what keeps mock logic out of the
//! coordinator's production code paths.
//!
//! [`InMemoryIdentityProvider`] supports failure simulation (offline mode,
//! rejected remote sign-out) and remote revocation so the coordinator's
//! degraded-network and forced-sign-out behavior can be exercised
//! deterministically.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

mod provider;
mod storage;

pub use provider::InMemoryIdentityProvider;
pub use storage::InMemoryPersistenceSlot;
