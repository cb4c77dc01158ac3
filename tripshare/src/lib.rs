// tripshare/src/lib.rs

//! Identity lifecycle and capability authorization for a trip-planning backend.
//!
//! Accounts start Pending and become Active through an emailed, single-use
//! verification token. Active accounts log in for a short-lived bearer
//! credential. Every trip route runs an ordered gate pipeline: bearer, then
//! ownership; public routes instead resolve an opaque share secret.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;
pub mod web;

pub use config::AppConfig;
pub use errors::{AppError, Resource};
pub use state::{AppState, Collaborators};
