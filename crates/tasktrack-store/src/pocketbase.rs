//! PocketBase REST client.

use crate::RecordStore;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use shaku::Component;
use tasktrack_config::RecordStoreConfig;
use tasktrack_core::{
    Collection, Filter, ListQuery, Record, RecordData, RecordPage, TrackError, TrackResult,
};
use tracing::{debug, error};
use url::Url;

/// Default page size used while walking a full list.
pub const DEFAULT_BATCH_SIZE: u32 = 500;

/// Error body returned by PocketBase, e.g. `{"code":404,"message":"..."}`.
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Record store backed by a PocketBase server.
#[derive(Component)]
#[shaku(interface = RecordStore)]
pub struct PocketBaseRecordStore {
    /// Shared HTTP client, carrying the request timeout.
    http: Client,
    /// Server base URL, e.g. `http://127.0.0.1:8090`.
    base_url: String,
    /// Value of the `Authorization` header, when the collections are protected.
    auth_token: Option<String>,
    /// Page size used by [`RecordStore::full_list`].
    #[shaku(default = DEFAULT_BATCH_SIZE)]
    batch_size: u32,
}

impl PocketBaseRecordStore {
    /// Creates a client from the record store configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Configuration`] when the URL is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: &RecordStoreConfig) -> TrackResult<Self> {
        Url::parse(&config.url).map_err(|e| {
            TrackError::Configuration(format!("Invalid record store URL '{}': {}", config.url, e))
        })?;

        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| TrackError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.url.clone(),
            auth_token: config.auth_token.clone().filter(|t| !t.is_empty()),
            batch_size: config.full_list_batch_size.max(1),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> TrackResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            TrackError::Configuration(format!("Invalid record store URL '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                TrackError::Configuration(format!("Record store URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn records_url(&self, collection: Collection) -> TrackResult<Url> {
        self.endpoint(&["api", "collections", collection.name(), "records"])
    }

    fn record_url(&self, collection: Collection, id: &str) -> TrackResult<Url> {
        self.endpoint(&["api", "collections", collection.name(), "records", id])
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.auth_token {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> TrackResult<Response> {
        builder.send().await.map_err(|e| {
            error!("Record store request failed: {}", e);
            TrackError::record_store(None, format!("request failed: {}", e))
        })
    }

    async fn fetch_page(
        &self,
        collection: Collection,
        query: &ListQuery,
        page: u32,
        per_page: u32,
        skip_total: bool,
    ) -> TrackResult<RecordPage> {
        let mut params: Vec<(&str, String)> = vec![
            ("page", page.to_string()),
            ("perPage", per_page.to_string()),
        ];
        if !query.sort.is_empty() {
            params.push(("sort", query.sort.clone()));
        }
        let filter = query.filter.render()?;
        if !filter.is_empty() {
            params.push(("filter", filter));
        }
        if let Some(expand) = &query.expand {
            params.push(("expand", expand.clone()));
        }
        if skip_total {
            params.push(("skipTotal", "1".to_string()));
        }

        debug!(
            "Record store: list {} page={} perPage={} filter={}",
            collection.name(),
            page,
            per_page,
            query.filter
        );

        let url = self.records_url(collection)?;
        let response = self.send(self.request(Method::GET, url).query(&params)).await?;
        let response = check_status(response).await?;
        decode(response).await
    }
}

/// Turns a non-success response into a [`TrackError::RecordStore`].
async fn check_status(response: Response) -> TrackResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .map(|e| e.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or(body);

    Err(TrackError::record_store(Some(status.as_u16()), message))
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> TrackResult<T> {
    response.json::<T>().await.map_err(|e| {
        TrackError::record_store(None, format!("invalid response body: {}", e))
    })
}

/// Maps a 404 from an id-addressed endpoint to `NotFound`.
fn not_found_for(collection: Collection, id: &str, err: TrackError) -> TrackError {
    match err {
        TrackError::RecordStore {
            status: Some(404), ..
        } => TrackError::not_found(collection.cache_namespace(), id),
        other => other,
    }
}

#[async_trait]
impl RecordStore for PocketBaseRecordStore {
    async fn list(&self, collection: Collection, query: &ListQuery) -> TrackResult<RecordPage> {
        self.fetch_page(collection, query, query.page, query.per_page, false)
            .await
    }

    async fn full_list(&self, collection: Collection, query: &ListQuery) -> TrackResult<Vec<Record>> {
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let batch = self
                .fetch_page(collection, query, page, self.batch_size, true)
                .await?;
            let fetched = batch.items.len();
            records.extend(batch.items);

            if fetched < self.batch_size as usize {
                break;
            }
            page += 1;
        }

        debug!(
            "Record store: full list {} returned {} records",
            collection.name(),
            records.len()
        );
        Ok(records)
    }

    async fn first(
        &self,
        collection: Collection,
        filter: &Filter,
        expand: Option<&str>,
    ) -> TrackResult<Record> {
        let query = ListQuery::new()
            .filter(filter.clone())
            .sort("")
            .expand(expand.map(ToString::to_string));

        let page = self.fetch_page(collection, &query, 1, 1, true).await?;
        page.items
            .into_iter()
            .next()
            .ok_or_else(|| TrackError::not_found_by_filter(collection.cache_namespace(), filter))
    }

    async fn get_one(&self, collection: Collection, id: &str) -> TrackResult<Record> {
        debug!("Record store: get {} {}", collection.name(), id);
        let url = self.record_url(collection, id)?;
        let response = self.send(self.request(Method::GET, url)).await?;
        let response = check_status(response)
            .await
            .map_err(|e| not_found_for(collection, id, e))?;
        decode(response).await
    }

    async fn create(&self, collection: Collection, data: &RecordData) -> TrackResult<Record> {
        debug!("Record store: create {}", collection.name());
        let url = self.records_url(collection)?;
        let response = self.send(self.request(Method::POST, url).json(data)).await?;
        let response = check_status(response).await.map_err(|e| match e {
            TrackError::RecordStore {
                status: Some(code),
                message,
            } if code == StatusCode::BAD_REQUEST.as_u16() || code == StatusCode::CONFLICT.as_u16() => {
                debug!("Record store rejected create: {}", message);
                TrackError::conflict(format!(
                    "Failed to create {}. Please check your input data.",
                    collection.cache_namespace()
                ))
            }
            other => other,
        })?;
        decode(response).await
    }

    async fn update(&self, collection: Collection, id: &str, data: &RecordData) -> TrackResult<Record> {
        debug!("Record store: update {} {}", collection.name(), id);
        let url = self.record_url(collection, id)?;
        let response = self.send(self.request(Method::PATCH, url).json(data)).await?;
        let response = check_status(response).await.map_err(|e| match e {
            TrackError::RecordStore {
                status: Some(400),
                message,
            } => TrackError::validation(message),
            other => not_found_for(collection, id, other),
        })?;
        decode(response).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> TrackResult<()> {
        debug!("Record store: delete {} {}", collection.name(), id);
        let url = self.record_url(collection, id)?;
        let response = self.send(self.request(Method::DELETE, url)).await?;
        check_status(response)
            .await
            .map_err(|e| not_found_for(collection, id, e))?;
        Ok(())
    }

    async fn health_check(&self) -> TrackResult<()> {
        let url = self.endpoint(&["api", "health"])?;
        let response = self.send(self.request(Method::GET, url)).await?;
        check_status(response).await?;
        Ok(())
    }
}

impl std::fmt::Debug for PocketBaseRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PocketBaseRecordStore")
            .field("base_url", &self.base_url)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(server: &MockServer, batch: u32, token: Option<&str>) -> PocketBaseRecordStore {
        let config = RecordStoreConfig {
            url: server.uri(),
            auth_token: token.map(ToString::to_string),
            full_list_batch_size: batch,
            ..RecordStoreConfig::default()
        };
        PocketBaseRecordStore::new(&config).unwrap()
    }

    fn task(id: &str, email: &str) -> serde_json::Value {
        json!({"id": id, "collectionName": "task", "email": email, "title": format!("T{}", id)})
    }

    #[tokio::test]
    async fn test_list_sends_query_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/collections/task/records"))
            .and(query_param("page", "2"))
            .and(query_param("perPage", "10"))
            .and(query_param("sort", "-created"))
            .and(query_param("filter", "email = 'a@x.com'"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 2, "perPage": 10, "totalPages": 3, "totalItems": 21,
                "items": [task("1", "a@x.com")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server, 500, None);
        let query = ListQuery::new()
            .paginate(2, 10)
            .filter(Filter::eq("email", "a@x.com"));
        let page = store.list(Collection::TASK, &query).await.unwrap();

        assert_eq!(page.page, 2);
        assert_eq!(page.total_items, 21);
        assert_eq!(page.items[0].email(), Some("a@x.com"));
    }

    #[tokio::test]
    async fn test_full_list_walks_batches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/collections/task/records"))
            .and(query_param("page", "1"))
            .and(query_param("skipTotal", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 1, "perPage": 2, "totalPages": -1, "totalItems": -1,
                "items": [task("1", "a@x.com"), task("2", "a@x.com")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/collections/task/records"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 2, "perPage": 2, "totalPages": -1, "totalItems": -1,
                "items": [task("3", "b@x.com")]
            })))
            .mount(&server)
            .await;

        let store = store_for(&server, 2, None);
        let records = store.full_list(Collection::TASK, &ListQuery::new()).await.unwrap();

        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_first_on_empty_result_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/collections/task/records"))
            .and(query_param("perPage", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 1, "perPage": 1, "totalPages": -1, "totalItems": -1, "items": []
            })))
            .mount(&server)
            .await;

        let store = store_for(&server, 500, None);
        let err = store
            .first(Collection::TASK, &Filter::eq("status", "open"), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_one_maps_404_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/collections/task/records/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "code": 404, "message": "The requested resource wasn't found.", "data": {}
            })))
            .mount(&server)
            .await;

        let store = store_for(&server, 500, None);
        let err = store.get_one(Collection::TASK, "missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_maps_400_to_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/collections/task/records"))
            .and(body_json(json!({"email": "a@x.com"})))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": 400, "message": "Failed to create record.", "data": {}
            })))
            .mount(&server)
            .await;

        let store = store_for(&server, 500, None);
        let mut data = RecordData::new();
        data.insert("email".to_string(), json!("a@x.com"));
        let err = store.create(Collection::TASK, &data).await.unwrap_err();

        assert!(matches!(err, TrackError::Conflict(_)));
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_update_uses_patch_and_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/collections/task/records/42"))
            .and(header("authorization", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(task("42", "a@x.com")))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server, 500, Some("secret"));
        let mut data = RecordData::new();
        data.insert("title".to_string(), json!("T42"));
        let record = store.update(Collection::TASK, "42", &data).await.unwrap();
        assert_eq!(record.id, "42");
    }

    #[tokio::test]
    async fn test_server_error_is_record_store_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/collections/control_system/records"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let store = store_for(&server, 500, None);
        let err = store
            .list(Collection::PERMISSION, &ListQuery::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TrackError::RecordStore {
                status: Some(500),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_delete_returning_reads_then_deletes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/collections/task/records/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(task("7", "a@x.com")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/collections/task/records/7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server, 500, None);
        let deleted = store.delete_returning(Collection::TASK, "7").await.unwrap();
        assert_eq!(deleted.email(), Some("a@x.com"));
    }

    #[tokio::test]
    async fn test_update_returning_previous_reads_then_patches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/collections/task/records/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(task("7", "a@x.com")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/collections/task/records/7"))
            .and(body_json(json!({"email": "b@x.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(task("7", "b@x.com")))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server, 500, None);
        let mut data = RecordData::new();
        data.insert("email".to_string(), json!("b@x.com"));
        let (previous, updated) = store
            .update_returning_previous(Collection::TASK, "7", &data)
            .await
            .unwrap();
        assert_eq!(previous.email(), Some("a@x.com"));
        assert_eq!(updated.email(), Some("b@x.com"));
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200, "message": "API is healthy."
            })))
            .mount(&server)
            .await;

        let store = store_for(&server, 500, None);
        assert!(store.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_record_store_error() {
        let config = RecordStoreConfig {
            url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..RecordStoreConfig::default()
        };
        let store = PocketBaseRecordStore::new(&config).unwrap();
        let err = store.health_check().await.unwrap_err();
        assert!(matches!(err, TrackError::RecordStore { status: None, .. }));
    }
}
