//! # TaskTrack Service
//!
//! The cache-consistency layer and the business services built on it.
//!
//! Reads go through [`QueryService`], which wraps record-store calls with
//! cache-aside lookups keyed by collection and scope. Writes go straight to
//! the record store and then through [`InvalidationCoordinator`], which evicts
//! every list key the written entity could appear in.

pub mod cache;
pub mod dto;
pub mod health_service;
pub mod r#impl;
pub mod invalidation;
pub mod permission_service;
pub mod query_service;
pub mod task_service;

pub use cache::*;
pub use dto::*;
pub use health_service::*;
pub use invalidation::*;
pub use permission_service::*;
pub use query_service::*;
pub use r#impl::{
    resolve_offset, to_local_time, HealthServiceImpl, PermissionServiceImpl, TaskServiceImpl,
};
pub use task_service::*;
