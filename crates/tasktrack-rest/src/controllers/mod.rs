//! REST API controllers.

pub mod health_controller;
pub mod permission_controller;
pub mod task_controller;
