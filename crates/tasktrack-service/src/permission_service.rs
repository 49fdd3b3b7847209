//! Permission service trait definition.

use crate::dto::Envelope;
use async_trait::async_trait;
use tasktrack_core::{Interface, Record, TrackResult};

/// Permission use cases.
#[async_trait]
pub trait PermissionService: Interface + Send + Sync {
    /// Gets the newest permission record for an email, with timestamps in
    /// local time. `data` is `None` when the email has no permission.
    async fn latest_permission(
        &self,
        email: &str,
        bypass: bool,
    ) -> TrackResult<Envelope<Option<Record>>>;
}
