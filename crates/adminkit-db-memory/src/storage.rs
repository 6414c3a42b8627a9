use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use adminkit_core::{FieldValue, ListParams, Record};
use adminkit_storage::{RecordStore, StorageError};
use async_trait::async_trait;
use papaya::HashMap as PapayaHashMap;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::Mutex;

use crate::query::{compare_rows, matches_all};

/// Storage-specific options.
///
/// `latency` delays every `query` call, which lets tests widen the window in
/// which concurrent readers overlap.
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    pub latency: Option<Duration>,
}

/// In-memory record store using papaya lock-free HashMap.
///
/// This storage implementation provides:
/// - Lock-free concurrent reads via papaya::HashMap
/// - Serialized writes so partial updates never lose a concurrent patch
/// - Store-generated identifiers starting at 1
/// - Filtering, sorting and paging over the records' JSON form
#[derive(Debug)]
pub struct InMemoryStore<R: Record> {
    data: Arc<PapayaHashMap<u64, R>>,
    /// Writers hold this while reading-modifying-writing a row.
    write_lock: Mutex<()>,
    next_id: AtomicU64,
    /// Number of `query` calls served, for observing read amplification.
    queries: AtomicU64,
    options: StoreOptions,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> InMemoryStore<R> {
    /// Creates a new in-memory store with default options.
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// Creates a new in-memory store with the given options.
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            data: Arc::new(PapayaHashMap::new()),
            write_lock: Mutex::new(()),
            next_id: AtomicU64::new(1),
            queries: AtomicU64::new(0),
            options,
            _record: PhantomData,
        }
    }

    /// Number of `query` calls made so far.
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.data.pin().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_raw(&self, id: u64) -> Option<R> {
        self.data.pin().get(&id).cloned()
    }

    fn snapshot(&self) -> Vec<R> {
        self.data.pin().iter().map(|(_, r)| r.clone()).collect()
    }
}

fn to_json<R: Record>(record: &R) -> Result<Value, StorageError> {
    serde_json::to_value(record)
        .map_err(|e| StorageError::internal(format!("Failed to encode {}: {e}", R::ENTITY)))
}

fn format_timestamp(ts: OffsetDateTime) -> Result<Value, StorageError> {
    ts.format(&Rfc3339)
        .map(Value::String)
        .map_err(|e| StorageError::internal(format!("Failed to format timestamp: {e}")))
}

/// Overlays columns (and the store-owned timestamps) onto a record.
fn overlay<R: Record>(
    record: &R,
    columns: &[(&'static str, FieldValue)],
    created_at: Option<OffsetDateTime>,
    updated_at: Option<OffsetDateTime>,
) -> Result<R, StorageError> {
    let mut json = to_json(record)?;
    let object = json
        .as_object_mut()
        .ok_or_else(|| StorageError::internal(format!("{} is not a JSON object", R::ENTITY)))?;

    for (column, value) in columns {
        object.insert((*column).to_string(), value.to_json());
    }
    if R::TIMESTAMPS {
        if let Some(ts) = created_at {
            object.insert("created_at".into(), format_timestamp(ts)?);
        }
        if let Some(ts) = updated_at {
            object.insert("updated_at".into(), format_timestamp(ts)?);
        }
    }

    serde_json::from_value(json)
        .map_err(|e| StorageError::internal(format!("Failed to decode {}: {e}", R::ENTITY)))
}

#[async_trait]
impl<R: Record> RecordStore<R> for InMemoryStore<R> {
    async fn query(&self, id: u64) -> Result<R, StorageError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.options.latency {
            tokio::time::sleep(latency).await;
        }
        self.get_raw(id)
            .ok_or_else(|| StorageError::not_found(R::ENTITY, id))
    }

    async fn insert(&self, record: &R) -> Result<u64, StorageError> {
        let _guard = self.write_lock.lock().await;

        let id = if R::GENERATED_ID {
            self.next_id.fetch_add(1, Ordering::SeqCst)
        } else {
            let id = record.id();
            if id == 0 {
                return Err(StorageError::invalid_record(format!(
                    "{} cannot be 0",
                    R::ID_COLUMN
                )));
            }
            if self.data.pin().contains_key(&id) {
                return Err(StorageError::already_exists(R::ENTITY, id));
            }
            id
        };

        let now = OffsetDateTime::now_utc();
        let mut stored = overlay(record, &[], Some(now), Some(now))?;
        stored.set_id(id);
        self.data.pin().insert(id, stored);

        tracing::debug!(entity = R::ENTITY, id, "record inserted");
        Ok(id)
    }

    async fn delete_by_id(&self, id: u64) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.data.pin().remove(&id);
        Ok(())
    }

    async fn update_partial(&self, record: &R) -> Result<(), StorageError> {
        let id = record.id();
        if id == 0 {
            return Err(StorageError::invalid_record(format!(
                "{} cannot be 0",
                R::ID_COLUMN
            )));
        }

        let _guard = self.write_lock.lock().await;
        // Updating a missing row affects nothing and is not an error.
        let Some(current) = self.get_raw(id) else {
            return Ok(());
        };

        let patch = record.patch();
        if patch.is_empty() {
            return Ok(());
        }
        let mut updated = overlay(&current, &patch, None, Some(OffsetDateTime::now_utc()))?;
        // The patch may carry the identifier column itself (join tables); the row key wins.
        updated.set_id(id);
        self.data.pin().insert(id, updated);
        Ok(())
    }

    async fn query_by_filter(&self, params: &ListParams) -> Result<(Vec<R>, u64), StorageError> {
        params.validate::<R>()?;

        let mut rows = Vec::new();
        for record in self.snapshot() {
            let json = to_json(&record)?;
            if matches_all(&json, &params.columns) {
                rows.push((json, record));
            }
        }

        let total = if params.counts_total() {
            let total = rows.len() as u64;
            if total == 0 {
                return Ok((Vec::new(), 0));
            }
            total
        } else {
            0
        };

        let order = params.sort_order(R::ID_COLUMN);
        rows.sort_by(|(a, _), (b, _)| compare_rows(a, b, &order));

        let offset = usize::try_from(params.offset()).unwrap_or(usize::MAX);
        let page = rows
            .into_iter()
            .skip(offset)
            .take(params.limit as usize)
            .map(|(_, record)| record)
            .collect();

        Ok((page, total))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
