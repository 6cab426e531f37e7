//! # od-model
//!
//! Identity domain model for the OpsDesk session layer.
//!
//! OpsDesk is a multi-role operations dashboard (HR, finance, marketing,
//! client management). This crate defines the single normalized identity
//! shape shared by the rest of the workspace: whatever raw form the remote
//! identity provider returns, it is normalized into [`Identity`] at the
//! provider boundary and never re-derived downstream.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

mod identity;
mod profile;

pub use identity::{roles, Identity};
pub use profile::RegistrationProfile;
