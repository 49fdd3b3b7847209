//! Data Transfer Objects for the service layer.

pub mod envelope;
pub mod health_dto;
pub mod task_dto;

pub use envelope::*;
pub use health_dto::*;
pub use task_dto::*;
