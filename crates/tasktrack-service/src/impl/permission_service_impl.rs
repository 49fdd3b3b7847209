//! Permission service implementation.

use crate::cache::cache_keys;
use crate::dto::Envelope;
use crate::permission_service::PermissionService;
use crate::query_service::{list_failure, QueryService};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset};
use std::sync::Arc;
use tasktrack_config::PermissionsConfig;
use tasktrack_core::{Collection, ListQuery, Record, Scope, TrackError, TrackResult};
use tracing::debug;

const PERMISSIONS: Collection = Collection::PERMISSION;

const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Permission lookups, served through the cache.
pub struct PermissionServiceImpl {
    queries: Arc<QueryService>,
    offset: FixedOffset,
}

impl PermissionServiceImpl {
    /// Creates a permission service rendering timestamps at `offset`.
    #[must_use]
    pub fn new(queries: Arc<QueryService>, offset: FixedOffset) -> Self {
        Self { queries, offset }
    }
}

#[async_trait]
impl PermissionService for PermissionServiceImpl {
    async fn latest_permission(
        &self,
        email: &str,
        bypass: bool,
    ) -> TrackResult<Envelope<Option<Record>>> {
        let email = email.trim();
        if email.is_empty() {
            return Err(TrackError::validation("email: Email is required"));
        }

        let scope = Scope::Email(email.to_string());
        let key = cache_keys::list_key(PERMISSIONS, &scope);
        let query = ListQuery::new().paginate(1, 1).scoped(&scope);
        let offset = self.offset;

        self.queries
            .cached(key.clone(), bypass, |source| async move {
                let page = self
                    .queries
                    .store()
                    .list(PERMISSIONS, &query)
                    .await
                    .map_err(|e| list_failure(PERMISSIONS, e))?;

                let latest = page
                    .items
                    .into_iter()
                    .next()
                    .map(|record| to_local_time(record, offset));
                debug!("Latest permission for {}: {:?}", scope, latest.as_ref().map(|r| &r.id));

                let message = if latest.is_some() {
                    "Latest permission retrieved successfully"
                } else {
                    "No permission found for this email"
                };
                Ok(Envelope::ok(message, latest, source, key))
            })
            .await
    }
}

impl std::fmt::Debug for PermissionServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionServiceImpl")
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

/// Resolves the offset permission timestamps are rendered in.
///
/// # Errors
///
/// Returns [`TrackError::Configuration`] for an offset outside ±24h.
pub fn resolve_offset(config: &PermissionsConfig) -> TrackResult<FixedOffset> {
    match config.utc_offset_minutes {
        Some(minutes) => minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                TrackError::Configuration(format!("utc_offset_minutes out of range: {minutes}"))
            }),
        None => Ok(Local::now().offset().fix()),
    }
}

/// Rewrites `created` and `updated` into `offset`, without a zone suffix.
///
/// Values that do not parse as a timestamp are left as they are.
#[must_use]
pub fn to_local_time(mut record: Record, offset: FixedOffset) -> Record {
    for stamp in [&mut record.created, &mut record.updated] {
        if let Some(local) = stamp.as_deref().and_then(|s| render_local(s, offset)) {
            *stamp = Some(local);
        }
    }
    record
}

fn render_local(stamp: &str, offset: FixedOffset) -> Option<String> {
    let utc = DateTime::parse_from_rfc3339(stamp)
        .map(|t| t.naive_utc())
        .or_else(|_| {
            NaiveDateTime::parse_from_str(stamp.trim_end_matches('Z'), "%Y-%m-%d %H:%M:%S%.f")
        })
        .ok()?;

    Some(
        DateTime::<FixedOffset>::from_naive_utc_and_offset(utc, offset)
            .format(LOCAL_FORMAT)
            .to_string(),
    )
}
