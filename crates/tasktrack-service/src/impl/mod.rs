//! Service implementations.
//!
//! Trait definitions live in the parent module (e.g. `task_service.rs`).

pub mod health_service_impl;
pub mod permission_service_impl;
pub mod task_service_impl;

pub use health_service_impl::HealthServiceImpl;
pub use permission_service_impl::{resolve_offset, to_local_time, PermissionServiceImpl};
pub use task_service_impl::TaskServiceImpl;
