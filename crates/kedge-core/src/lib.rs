//! Core types and validation for kedge.
//!
//! This crate defines the application descriptor written by `kedge init`
//! ([`App`]), controller validation ([`ControllerKind`]), and shared error
//! types.

pub mod app;
pub mod controller;
pub mod error;

pub use app::{App, Container, Service};
pub use controller::{ControllerKind, validate_controller};
pub use error::{Error, Result};

/// File written by `kedge init` when no output path is given.
pub const DEFAULT_OUTPUT: &str = "kedge.yml";

/// Dockerfile consulted for `EXPOSE` ports when none are given explicitly.
pub const DOCKERFILE_NAME: &str = "Dockerfile";
