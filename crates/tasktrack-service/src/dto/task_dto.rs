//! Task-related DTOs.

use serde::{Deserialize, Serialize};
use tasktrack_core::{
    rules, validate_sort, Filter, ListQuery, RecordData, TrackError, TrackResult,
};
use validator::Validate;

/// Body of a task create or update request.
///
/// Known task fields are validated; anything else is forwarded to the record
/// store untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct TaskPayload {
    #[validate(email(message = "Invalid email format"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[validate(
        length(min = 1, max = 255, message = "Title must be 1-255 characters"),
        custom(function = "rules::not_blank", message = "Title must not be blank")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[validate(range(min = 0, max = 100, message = "Progress must be between 0 and 100"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_done: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: RecordData,
}

impl TaskPayload {
    /// Converts into the field map sent to the record store.
    ///
    /// # Errors
    ///
    /// Fails only if a field cannot be represented as JSON.
    pub fn into_record_data(self) -> TrackResult<RecordData> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            _ => Err(TrackError::internal("task payload did not serialize to an object")),
        }
    }
}

/// Query options for a paginated task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListOptions {
    pub email: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sort: Option<String>,
    pub expand: Option<String>,
}

impl TaskListOptions {
    /// Builds the record-store query, without the email scope.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Validation`] for a malformed sort expression.
    pub fn to_query(&self) -> TrackResult<ListQuery> {
        let mut query = ListQuery::new()
            .paginate(
                self.page.unwrap_or(1),
                self.per_page.unwrap_or(ListQuery::DEFAULT_PER_PAGE),
            )
            .expand(self.expand.clone());

        if let Some(sort) = self.sort.as_deref().filter(|s| !s.trim().is_empty()) {
            validate_sort(sort)?;
            query = query.sort(sort);
        }

        Ok(query)
    }

    /// True when page, page size, sort and expand are all left at their defaults.
    #[must_use]
    pub fn is_default_window(&self) -> bool {
        let blank_or = |value: &Option<String>, default: &str| {
            value
                .as_deref()
                .map(str::trim)
                .map_or(true, |v| v.is_empty() || v == default)
        };

        self.page.map_or(true, |page| page == 1)
            && self
                .per_page
                .map_or(true, |per_page| per_page == ListQuery::DEFAULT_PER_PAGE)
            && blank_or(&self.sort, ListQuery::DEFAULT_SORT)
            && blank_or(&self.expand, "")
    }
}

/// Criteria for "first task matching".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCriteria {
    pub email: Option<String>,
    pub status: Option<String>,
    pub title: Option<String>,
}

impl TaskCriteria {
    /// Builds an equality filter from the non-blank criteria.
    #[must_use]
    pub fn to_filter(&self) -> Filter {
        [
            ("email", &self.email),
            ("status", &self.status),
            ("title", &self.title),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (field, v))
        })
        .fold(Filter::all(), |filter, (field, value)| filter.and_eq(field, value))
    }
}
