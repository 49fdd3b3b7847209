//! Uniform response wrappers.

use serde::{Deserialize, Serialize};
use std::fmt;
use tasktrack_core::{Collection, RecordPage};

/// Where the data in an [`Envelope`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "cache")]
    Cache,
    #[serde(rename = "database")]
    Database,
    /// Read fresh because the request asked to skip the cache.
    #[serde(rename = "database (cache bypassed)")]
    DatabaseBypassed,
}

impl Source {
    /// Wire representation, also used for the `x-data-source` header.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Database => "database",
            Self::DatabaseBypassed => "database (cache bypassed)",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pagination metadata, present only on paginated list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total_pages: i64,
    pub total_items: i64,
}

impl From<&RecordPage> for Pagination {
    fn from(page: &RecordPage) -> Self {
        Self {
            page: page.page,
            per_page: page.per_page,
            total_pages: page.total_pages,
            total_items: page.total_items,
        }
    }
}

/// Read response: `{statusCode, message, data, source, cacheKey}` plus
/// flattened pagination fields for paginated lists.
///
/// The whole envelope is what gets cached; a hit returns it with `source`
/// and `cacheKey` rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub status_code: u16,
    pub message: String,
    pub data: T,
    pub source: Source,
    pub cache_key: String,
    #[serde(flatten)]
    pub pagination: Option<Pagination>,
}

impl<T> Envelope<T> {
    /// Creates a 200 envelope without pagination.
    pub fn ok(message: impl Into<String>, data: T, source: Source, cache_key: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            message: message.into(),
            data,
            source,
            cache_key: cache_key.into(),
            pagination: None,
        }
    }

    /// Attaches pagination metadata.
    #[must_use]
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Marks a cached envelope as served from the cache under `cache_key`.
    #[must_use]
    pub fn served_from_cache(mut self, cache_key: impl Into<String>) -> Self {
        self.source = Source::Cache;
        self.cache_key = cache_key.into();
        self
    }
}

impl<T> Envelope<Vec<T>> {
    /// Creates a list envelope whose message reflects whether anything was found.
    ///
    /// Empty results are still successful, cacheable reads.
    pub fn listing(collection: Collection, data: Vec<T>, source: Source, cache_key: impl Into<String>) -> Self {
        let message = if data.is_empty() {
            format!("No {} found", collection.cache_namespace())
        } else {
            format!("{} retrieved successfully", collection.cache_namespace())
        };
        Self::ok(message, data, source, cache_key)
    }
}

/// Write response: `{statusCode, message, data}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse<T> {
    pub status_code: u16,
    pub message: String,
    pub data: T,
}

impl<T> MutationResponse<T> {
    /// 201 response for a created record.
    pub fn created(collection: Collection, data: T) -> Self {
        Self {
            status_code: 201,
            message: format!("{} created successfully", collection.cache_namespace()),
            data,
        }
    }

    /// 200 response for an updated record.
    pub fn updated(collection: Collection, data: T) -> Self {
        Self {
            status_code: 200,
            message: format!("{} updated successfully", collection.cache_namespace()),
            data,
        }
    }

    /// 200 response for a deleted record.
    pub fn deleted(collection: Collection, data: T) -> Self {
        Self {
            status_code: 200,
            message: format!("{} deleted successfully", collection.cache_namespace()),
            data,
        }
    }
}

/// Payload of a delete response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedRecord {
    pub id: String,
}
