//! Custom Axum extractors.

mod cache_mode;
mod task_query;
mod validated;

pub use cache_mode::*;
pub use task_query::*;
pub use validated::*;
