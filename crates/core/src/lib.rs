//! Functional core for authstate.
//!
//! Pure types and functions describing the authentication state a UI layer
//! observes while an external OIDC client library signs users in and out.
//! Nothing in this crate performs I/O.

pub mod auth;
pub mod serde;

pub use crate::serde::Slot;
