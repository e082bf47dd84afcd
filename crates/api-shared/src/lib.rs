//! # API Shared
//!
//! Wire types and shared services for the Pressure Ulcer Watch APIs.
//!
//! Contains:
//! - Request and response bodies (`models` module), all `serde` + `utoipa::ToSchema`
//! - Shared services like `HealthService`
//!
//! Core domain types stay free of API concerns; this crate converts between the two.

pub mod health;
pub mod models;

pub use health::HealthService;
pub use models::*;
