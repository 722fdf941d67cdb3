//! Auth state controller for OIDC client integrations.
//!
//! This crate provides:
//! - `AuthController`, which drives a `UserManager` and publishes `AuthState`
//! - Environment-driven controller configuration
//! - A scriptable mock user manager (behind the `mock` feature)

mod config;
mod controller;
mod error;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::ControllerConfig;
pub use controller::{AuthController, Result};
pub use error::{ConfigError, ControllerError};
#[cfg(feature = "mock")]
pub use mock::{mock_user, MockOutcome, MockUserManager};
