//! List query options.

use crate::{Filter, Scope, EMAIL_FIELD};

/// Options for a list query against the record store.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    /// 1-based page number. Ignored by full-list queries.
    pub page: u32,
    /// Page size. Ignored by full-list queries.
    pub per_page: u32,
    /// Conditions every returned record must satisfy.
    pub filter: Filter,
    /// Sort expression, e.g. `-created`.
    pub sort: String,
    /// Relations to expand, passed through verbatim.
    pub expand: Option<String>,
}

impl ListQuery {
    /// The default page size.
    pub const DEFAULT_PER_PAGE: u32 = 50;
    /// The maximum allowed page size.
    pub const MAX_PER_PAGE: u32 = 500;
    /// The default sort: newest first.
    pub const DEFAULT_SORT: &'static str = "-created";

    /// Creates a query for the first page with default size and sort.
    #[must_use]
    pub fn new() -> Self {
        Self {
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
            filter: Filter::all(),
            sort: Self::DEFAULT_SORT.to_string(),
            expand: None,
        }
    }

    /// Sets the page and page size, clamping both into range.
    #[must_use]
    pub fn paginate(mut self, page: u32, per_page: u32) -> Self {
        self.page = page.max(1);
        self.per_page = per_page.clamp(1, Self::MAX_PER_PAGE);
        self
    }

    /// Replaces the filter.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Replaces the sort expression.
    #[must_use]
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    /// Sets the relations to expand.
    #[must_use]
    pub fn expand(mut self, expand: Option<String>) -> Self {
        self.expand = expand.filter(|e| !e.trim().is_empty());
        self
    }

    /// Restricts the query to a scope by appending `email = '<scope>'`.
    #[must_use]
    pub fn scoped(mut self, scope: &Scope) -> Self {
        if let Some(email) = scope.email() {
            self.filter = self.filter.and_eq(EMAIL_FIELD, email);
        }
        self
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query = ListQuery::default();
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 50);
        assert_eq!(query.sort, "-created");
        assert!(query.filter.is_empty());
    }

    #[test]
    fn test_paginate_clamps() {
        let query = ListQuery::new().paginate(0, 10_000);
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, ListQuery::MAX_PER_PAGE);

        let query = ListQuery::new().paginate(3, 0);
        assert_eq!(query.per_page, 1);
    }

    #[test]
    fn test_scoped_appends_email_condition() {
        let query = ListQuery::new()
            .filter(Filter::eq("status", "open"))
            .scoped(&Scope::Email("a@x.com".to_string()));
        assert_eq!(
            query.filter.render().unwrap(),
            "status = 'open' && email = 'a@x.com'"
        );

        let unscoped = ListQuery::new().scoped(&Scope::All);
        assert!(unscoped.filter.is_empty());
    }

    #[test]
    fn test_blank_expand_is_dropped() {
        assert_eq!(ListQuery::new().expand(Some(" ".to_string())).expand, None);
        assert_eq!(
            ListQuery::new().expand(Some("owner".to_string())).expand.as_deref(),
            Some("owner")
        );
    }
}
