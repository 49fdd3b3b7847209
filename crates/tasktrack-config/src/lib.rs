//! # TaskTrack Config
//!
//! Configuration management for TaskTrack.
//! Supports layered configuration from files, environment variables (including
//! the bare `PORT`/`REDIS_*`/`POCKETBASE_URL` variables), and runtime refresh.

mod app_config;
mod loader;

pub use app_config::*;
pub use loader::*;
