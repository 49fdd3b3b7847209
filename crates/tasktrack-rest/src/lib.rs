//! # TaskTrack REST
//!
//! REST API layer using Axum for TaskTrack.
//! Provides HTTP endpoints for tasks, permissions, and health checks.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
