//! Record shapes exchanged with the record store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the partition field used for filtering and cache invalidation.
pub const EMAIL_FIELD: &str = "email";

/// Field payload for create and update calls.
pub type RecordData = Map<String, Value>;

/// A record as returned by the record store.
///
/// `id`, `created`, and `updated` are owned by the store; every other field
/// (including `collectionId`/`collectionName` metadata) is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque identifier assigned on creation.
    pub id: String,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    /// Remaining fields.
    #[serde(flatten)]
    pub fields: RecordData,
}

impl Record {
    /// Creates a record with the given id and fields.
    #[must_use]
    pub fn new(id: impl Into<String>, fields: RecordData) -> Self {
        Self {
            id: id.into(),
            created: None,
            updated: None,
            fields,
        }
    }

    /// Returns a field value.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns the partition email, if the record carries a non-empty one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        email_of(&self.fields)
    }
}

/// Returns the non-empty `email` string of a field payload.
#[must_use]
pub fn email_of(data: &RecordData) -> Option<&str> {
    data.get(EMAIL_FIELD)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|email| !email.is_empty())
}

/// One page of a paginated query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPage {
    /// 1-based page number.
    pub page: u32,
    /// Requested page size.
    pub per_page: u32,
    /// Total number of pages; `-1` when the store skipped counting.
    pub total_pages: i64,
    /// Total number of matching records; `-1` when the store skipped counting.
    pub total_items: i64,
    /// Records on this page.
    pub items: Vec<Record>,
}

impl RecordPage {
    /// Builds a page from a slice of an already filtered and sorted result.
    #[must_use]
    pub fn from_items(items: Vec<Record>, page: u32, per_page: u32, total_items: usize) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            total_items.div_ceil(per_page as usize)
        };
        Self {
            page,
            per_page,
            total_pages: i64::try_from(total_pages).unwrap_or(i64::MAX),
            total_items: i64::try_from(total_items).unwrap_or(i64::MAX),
            items,
        }
    }
}
