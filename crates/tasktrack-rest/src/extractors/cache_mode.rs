//! Cache bypass extractor.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;
use std::convert::Infallible;

#[derive(Debug, Deserialize)]
struct CacheParam {
    cache: Option<String>,
}

/// Whether a read may use the cache.
///
/// `?cache=none` (case-insensitive) bypasses it; any other value, or none at
/// all, reads through the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheMode {
    pub bypass: bool,
}

impl CacheMode {
    const NONE: &'static str = "none";

    /// Interprets the raw `cache` query value.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        Self {
            bypass: value.is_some_and(|v| v.trim().eq_ignore_ascii_case(Self::NONE)),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CacheMode
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let param = Query::<CacheParam>::try_from_uri(&parts.uri)
            .map(|Query(param)| param.cache)
            .unwrap_or_default();
        Ok(Self::from_param(param.as_deref()))
    }
}
