//! Process-local record store.
//!
//! Evaluates the same filter AST and sort expressions as the remote store so
//! services can be exercised end to end without a PocketBase server.

use crate::RecordStore;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use shaku::Component;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use tasktrack_core::{
    validate_sort, Collection, Condition, Filter, FilterValue, ListQuery, Operator, Record,
    RecordData, RecordPage, TrackError, TrackResult,
};
use tracing::debug;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3fZ";

/// In-memory record store.
#[derive(Component, Default)]
#[shaku(interface = RecordStore)]
pub struct InMemoryRecordStore {
    /// Records per collection name, in insertion order.
    collections: RwLock<HashMap<&'static str, Vec<Record>>>,
    /// Source of generated ids.
    next_id: AtomicU64,
    /// Last issued timestamp, kept strictly increasing so `-created` is stable.
    clock: Mutex<Option<DateTime<Utc>>>,
    /// Number of read calls served, for asserting cache behavior.
    reads: AtomicUsize,
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record verbatim, replacing any record with the same id.
    pub fn insert(&self, collection: Collection, record: Record) {
        let mut collections = self.collections.write();
        let records = collections.entry(collection.name()).or_default();
        records.retain(|r| r.id != record.id);
        records.push(record);
    }

    /// Number of read calls (`list`, `full_list`, `first`, `get_one`) served so far.
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.reads.load(AtomicOrdering::SeqCst)
    }

    /// Number of records currently held in a collection.
    #[must_use]
    pub fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .get(collection.name())
            .map_or(0, Vec::len)
    }

    /// Returns true when the collection holds no records.
    #[must_use]
    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    fn now(&self) -> String {
        let mut last = self.clock.lock();
        let mut now = Utc::now();
        if let Some(previous) = *last {
            if now <= previous {
                now = previous + Duration::milliseconds(1);
            }
        }
        *last = Some(now);
        now.format(TIMESTAMP_FORMAT).to_string()
    }

    fn generate_id(&self) -> String {
        let n = self.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        format!("{:015}", n)
    }

    fn matching(&self, collection: Collection, query: &ListQuery) -> TrackResult<Vec<Record>> {
        // Rendering rejects the same inputs the remote store would.
        query.filter.render()?;
        if !query.sort.trim().is_empty() {
            validate_sort(&query.sort)?;
        }

        self.reads.fetch_add(1, AtomicOrdering::SeqCst);

        let collections = self.collections.read();
        let mut records: Vec<Record> = collections
            .get(collection.name())
            .map(|records| {
                records
                    .iter()
                    .filter(|record| filter_matches(record, &query.filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(collections);

        sort_records(&mut records, &query.sort);
        Ok(records)
    }
}

/// Looks up a field path, including the store-owned `id`/`created`/`updated`.
fn lookup(record: &Record, field: &str) -> Option<Value> {
    let mut parts = field.split('.');
    let head = parts.next()?;
    let root = match head {
        "id" => Some(Value::String(record.id.clone())),
        "created" => record.created.clone().map(Value::String),
        "updated" => record.updated.clone().map(Value::String),
        _ => record.fields.get(head).cloned(),
    };

    parts.try_fold(root?, |value, part| value.get(part).cloned())
}

fn compare_values(left: &Value, right: &FilterValue) -> Option<Ordering> {
    match (left, right) {
        (Value::String(l), FilterValue::Text(r)) => Some(l.as_str().cmp(r.as_str())),
        (Value::Number(l), FilterValue::Integer(r)) => {
            l.as_f64().and_then(|l| l.partial_cmp(&(*r as f64)))
        }
        (Value::Number(l), FilterValue::Text(r)) => {
            let r = r.parse::<f64>().ok()?;
            l.as_f64().and_then(|l| l.partial_cmp(&r))
        }
        (Value::Bool(l), FilterValue::Bool(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

fn condition_holds(record: &Record, condition: &Condition) -> bool {
    let value = lookup(record, &condition.field).unwrap_or(Value::Null);

    if let FilterValue::Null = condition.value {
        let is_null = value.is_null() || value.as_str().is_some_and(str::is_empty);
        return match condition.op {
            Operator::Eq => is_null,
            Operator::NotEq => !is_null,
            _ => false,
        };
    }

    match condition.op {
        Operator::Eq => compare_values(&value, &condition.value) == Some(Ordering::Equal),
        Operator::NotEq => compare_values(&value, &condition.value) != Some(Ordering::Equal),
        Operator::Gt => compare_values(&value, &condition.value) == Some(Ordering::Greater),
        Operator::Gte => matches!(
            compare_values(&value, &condition.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::Lt => compare_values(&value, &condition.value) == Some(Ordering::Less),
        Operator::Lte => matches!(
            compare_values(&value, &condition.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::Like => match (&value, &condition.value) {
            (Value::String(haystack), FilterValue::Text(needle)) => haystack
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => false,
        },
    }
}

fn filter_matches(record: &Record, filter: &Filter) -> bool {
    filter
        .conditions()
        .iter()
        .all(|condition| condition_holds(record, condition))
}

fn order_json(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (Some(Value::String(l)), Some(Value::String(r))) => l.cmp(r),
        (Some(Value::Number(l)), Some(Value::Number(r))) => l
            .as_f64()
            .zip(r.as_f64())
            .and_then(|(l, r)| l.partial_cmp(&r))
            .unwrap_or(Ordering::Equal),
        (Some(Value::Bool(l)), Some(Value::Bool(r))) => l.cmp(r),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn sort_records(records: &mut [Record], sort: &str) {
    let keys: Vec<(&str, bool)> = sort
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(|key| match key.strip_prefix('-') {
            Some(field) => (field, true),
            None => (key.strip_prefix('+').unwrap_or(key), false),
        })
        .collect();

    if keys.is_empty() {
        return;
    }

    records.sort_by(|a, b| {
        keys.iter().fold(Ordering::Equal, |acc, (field, descending)| {
            acc.then_with(|| {
                let ordering = order_json(lookup(a, field).as_ref(), lookup(b, field).as_ref());
                if *descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
        })
    });
}

/// Splits store-owned keys off a payload.
fn user_fields(data: &RecordData) -> RecordData {
    data.iter()
        .filter(|(key, _)| !matches!(key.as_str(), "id" | "created" | "updated"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list(&self, collection: Collection, query: &ListQuery) -> TrackResult<RecordPage> {
        let records = self.matching(collection, query)?;
        let total = records.len();
        let page = query.page.max(1);
        let per_page = query.per_page.max(1);
        let start = (page as usize - 1).saturating_mul(per_page as usize);

        let items = records
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();

        Ok(RecordPage::from_items(items, page, per_page, total))
    }

    async fn full_list(&self, collection: Collection, query: &ListQuery) -> TrackResult<Vec<Record>> {
        self.matching(collection, query)
    }

    async fn first(
        &self,
        collection: Collection,
        filter: &Filter,
        _expand: Option<&str>,
    ) -> TrackResult<Record> {
        let query = ListQuery::new().filter(filter.clone()).sort("");
        self.matching(collection, &query)?
            .into_iter()
            .next()
            .ok_or_else(|| TrackError::not_found_by_filter(collection.cache_namespace(), filter))
    }

    async fn get_one(&self, collection: Collection, id: &str) -> TrackResult<Record> {
        self.reads.fetch_add(1, AtomicOrdering::SeqCst);
        self.collections
            .read()
            .get(collection.name())
            .and_then(|records| records.iter().find(|r| r.id == id).cloned())
            .ok_or_else(|| TrackError::not_found(collection.cache_namespace(), id))
    }

    async fn create(&self, collection: Collection, data: &RecordData) -> TrackResult<Record> {
        let id = data
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map_or_else(|| self.generate_id(), ToString::to_string);

        let now = self.now();
        let record = Record {
            id,
            created: Some(now.clone()),
            updated: Some(now),
            fields: user_fields(data),
        };

        let mut collections = self.collections.write();
        let records = collections.entry(collection.name()).or_default();
        if records.iter().any(|r| r.id == record.id) {
            return Err(TrackError::conflict(format!(
                "Failed to create {}. Please check your input data.",
                collection.cache_namespace()
            )));
        }
        records.push(record.clone());
        debug!("In-memory store: created {} {}", collection.name(), record.id);

        Ok(record)
    }

    async fn update(&self, collection: Collection, id: &str, data: &RecordData) -> TrackResult<Record> {
        self.update_returning_previous(collection, id, data)
            .await
            .map(|(_, updated)| updated)
    }

    async fn update_returning_previous(
        &self,
        collection: Collection,
        id: &str,
        data: &RecordData,
    ) -> TrackResult<(Record, Record)> {
        let now = self.now();
        let mut collections = self.collections.write();
        let record = collections
            .get_mut(collection.name())
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| TrackError::not_found(collection.cache_namespace(), id))?;

        let previous = record.clone();
        record.fields.extend(user_fields(data));
        record.updated = Some(now);
        Ok((previous, record.clone()))
    }

    async fn delete(&self, collection: Collection, id: &str) -> TrackResult<()> {
        self.delete_returning(collection, id).await.map(|_| ())
    }

    async fn delete_returning(&self, collection: Collection, id: &str) -> TrackResult<Record> {
        let mut collections = self.collections.write();
        let records = collections
            .get_mut(collection.name())
            .ok_or_else(|| TrackError::not_found(collection.cache_namespace(), id))?;
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| TrackError::not_found(collection.cache_namespace(), id))?;

        Ok(records.remove(index))
    }

    async fn health_check(&self) -> TrackResult<()> {
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRecordStore").finish_non_exhaustive()
    }
}
