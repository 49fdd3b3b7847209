//! # TaskTrack Core
//!
//! Core types, traits, and error definitions for TaskTrack.
//! Everything here is shared by the store, service, and REST layers: the error
//! taxonomy, collection and scope identities, record shapes, list queries, and the
//! structured filter builder used to talk to the record store.

pub mod collection;
pub mod error;
pub mod filter;
pub mod query;
pub mod record;
pub mod result;
pub mod validation;

pub use collection::*;
pub use error::*;
pub use filter::*;
pub use query::*;
pub use record::*;
pub use result::*;
pub use validation::*;

// Re-export shaku for dependency injection
pub use shaku::Interface;
