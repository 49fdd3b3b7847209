//! # TaskTrack Store
//!
//! Access to the durable record store.
//!
//! ```text
//! Service
//!   ↓  Arc<dyn RecordStore>
//! PocketBaseRecordStore  (REST client, production)
//! InMemoryRecordStore    (process-local, development and tests)
//! ```

pub mod memory;
pub mod pocketbase;
pub mod traits;

pub use memory::*;
pub use pocketbase::*;
pub use traits::*;
