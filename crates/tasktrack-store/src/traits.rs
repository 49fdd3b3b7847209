//! Record store trait definition.

use async_trait::async_trait;
use tasktrack_core::{Collection, Filter, Interface, ListQuery, Record, RecordData, RecordPage, TrackResult};

/// Filtered, sorted, paginated queries and CRUD against the durable store.
///
/// Implementations are shared across requests and must be safe for
/// concurrent use. A single attempt is made per call; errors are returned
/// unchanged.
#[async_trait]
pub trait RecordStore: Interface + Send + Sync {
    /// Returns one page of records matching the query.
    async fn list(&self, collection: Collection, query: &ListQuery) -> TrackResult<RecordPage>;

    /// Returns every record matching the query, ignoring its pagination.
    async fn full_list(&self, collection: Collection, query: &ListQuery) -> TrackResult<Vec<Record>>;

    /// Returns the first record matching the filter.
    ///
    /// Fails with `NotFound` when nothing matches.
    async fn first(
        &self,
        collection: Collection,
        filter: &Filter,
        expand: Option<&str>,
    ) -> TrackResult<Record>;

    /// Fetches a record by id. Fails with `NotFound` when absent.
    async fn get_one(&self, collection: Collection, id: &str) -> TrackResult<Record>;

    /// Creates a record.
    async fn create(&self, collection: Collection, data: &RecordData) -> TrackResult<Record>;

    /// Patches the given fields of an existing record.
    async fn update(&self, collection: Collection, id: &str, data: &RecordData) -> TrackResult<Record>;

    /// Patches a record and returns it as it was before and after the write.
    ///
    /// The default reads then updates in two calls, with the same caveat as
    /// [`RecordStore::delete_returning`].
    async fn update_returning_previous(
        &self,
        collection: Collection,
        id: &str,
        data: &RecordData,
    ) -> TrackResult<(Record, Record)> {
        let previous = self.get_one(collection, id).await?;
        let updated = self.update(collection, id, data).await?;
        Ok((previous, updated))
    }

    /// Deletes a record by id.
    async fn delete(&self, collection: Collection, id: &str) -> TrackResult<()>;

    /// Deletes a record and returns it as it was just before deletion.
    ///
    /// The default reads then deletes in two calls, so a concurrent write in
    /// between is not observed. Stores that can return the deleted row
    /// atomically should override this.
    async fn delete_returning(&self, collection: Collection, id: &str) -> TrackResult<Record> {
        let record = self.get_one(collection, id).await?;
        self.delete(collection, id).await?;
        Ok(record)
    }

    /// Probes the store. `Ok` means it answered.
    async fn health_check(&self) -> TrackResult<()>;
}
