//! Embedded document store keeping collections in process memory.
//!
//! Implements the same command surface a networked store offers: filters,
//! per-document upserts, unique indexes and aggregation pipelines. Cursors
//! are counted while open so callers can verify they are always released.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::context::RequestContext;
use crate::application::ports::document_store::{
    DeleteOutcome, DocumentCursor, DocumentStore, StoreError, UpdateOutcome,
};
use crate::application::query::{Document, Filter, Pipeline, Update, UpdateOptions};
use crate::domain::tags::tag::fields;

pub mod eval;

#[derive(Default)]
struct Collection {
    docs: Vec<Document>,
    unique: Vec<String>,
}

impl Collection {
    /// First unique field for which `doc` collides with another stored document.
    fn duplicate_of(&self, doc: &Document, skip: Option<usize>) -> Option<(String, Value)> {
        for field in &self.unique {
            let Some(value) = doc.get(field) else {
                continue;
            };
            let taken = self
                .docs
                .iter()
                .enumerate()
                .any(|(i, other)| Some(i) != skip && other.get(field) == Some(value));
            if taken {
                return Some((field.clone(), value.clone()));
            }
        }
        None
    }
}

#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
    open_cursors: Arc<AtomicUsize>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document as-is, assigning a fresh `_id` when it has none.
    pub async fn insert_one<T: Serialize>(
        &self,
        collection: &str,
        value: &T,
    ) -> Result<Value, StoreError> {
        let mut doc = match serde_json::to_value(value) {
            Ok(Value::Object(doc)) => doc,
            Ok(_) => return Err(StoreError::Rejected("document must be an object".into())),
            Err(e) => return Err(StoreError::Rejected(e.to_string())),
        };
        let id = doc
            .entry(fields::ID)
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()))
            .clone();
        let mut collections = self.collections.write().await;
        let coll = collections.entry(collection.to_string()).or_default();
        if let Some((field, value)) = coll.duplicate_of(&doc, None) {
            return Err(duplicate(collection, field, &value));
        }
        tracing::trace!(collection, %id, "insert_one");
        coll.docs.push(doc);
        Ok(id)
    }

    pub async fn count(&self, collection: &str, filter: &Filter) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|c| c.docs.iter().filter(|d| eval::matches(filter, d)).count())
            .unwrap_or(0)
    }

    /// Cursors handed out and not yet dropped.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    fn cursor(&self, ctx: &RequestContext, docs: Vec<Document>) -> DocumentCursor {
        let ctx = ctx.clone();
        let stream = futures_util::stream::iter(docs).map(move |doc| ctx.check().map(|()| doc));
        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        let open = self.open_cursors.clone();
        DocumentCursor::new(stream).on_close(move || {
            open.fetch_sub(1, Ordering::SeqCst);
        })
    }

    async fn matching(&self, collection: &str, filter: &Filter) -> Vec<Document> {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|c| {
                c.docs
                    .iter()
                    .filter(|d| eval::matches(filter, d))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn duplicate(collection: &str, field: String, value: &Value) -> StoreError {
    StoreError::DuplicateKey {
        collection: collection.to_string(),
        field,
        value: value.to_string(),
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find(
        &self,
        ctx: &RequestContext,
        collection: &str,
        filter: &Filter,
    ) -> Result<DocumentCursor, StoreError> {
        ctx.check()?;
        tracing::trace!(collection, ?filter, "find");
        let docs = self.matching(collection, filter).await;
        Ok(self.cursor(ctx, docs))
    }

    async fn find_one(
        &self,
        ctx: &RequestContext,
        collection: &str,
        filter: &Filter,
    ) -> Result<Document, StoreError> {
        ctx.check()?;
        tracing::trace!(collection, ?filter, "find_one");
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|c| c.docs.iter().find(|d| eval::matches(filter, d)).cloned())
            .ok_or(StoreError::NoDocuments)
    }

    async fn aggregate(
        &self,
        ctx: &RequestContext,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<DocumentCursor, StoreError> {
        ctx.check()?;
        tracing::trace!(collection, pipeline = %pipeline.describe(), "aggregate");
        let docs = self.matching(collection, &Filter::All).await;
        let out = eval::run_pipeline(docs, pipeline);
        Ok(self.cursor(ctx, out))
    }

    async fn update_one(
        &self,
        ctx: &RequestContext,
        collection: &str,
        filter: &Filter,
        update: &Update,
        options: UpdateOptions,
    ) -> Result<UpdateOutcome, StoreError> {
        ctx.check()?;
        tracing::trace!(collection, ?filter, upsert = options.upsert, "update_one");
        let mut collections = self.collections.write().await;
        let coll = collections.entry(collection.to_string()).or_default();

        if let Some(pos) = coll.docs.iter().position(|d| eval::matches(filter, d)) {
            let mut updated = coll.docs[pos].clone();
            for (k, v) in update.fields() {
                updated.insert(k.clone(), v.clone());
            }
            if let Some((field, value)) = coll.duplicate_of(&updated, Some(pos)) {
                return Err(duplicate(collection, field, &value));
            }
            let modified = u64::from(updated != coll.docs[pos]);
            coll.docs[pos] = updated;
            return Ok(UpdateOutcome {
                matched: 1,
                modified,
                upserted_id: None,
            });
        }

        if !options.upsert {
            return Ok(UpdateOutcome::default());
        }

        let mut doc = filter.equality_fields();
        for (k, v) in update.fields() {
            doc.insert(k.clone(), v.clone());
        }
        let id = doc
            .entry(fields::ID)
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()))
            .clone();
        if let Some((field, value)) = coll.duplicate_of(&doc, None) {
            return Err(duplicate(collection, field, &value));
        }
        coll.docs.push(doc);
        Ok(UpdateOutcome {
            matched: 0,
            modified: 0,
            upserted_id: Some(id),
        })
    }

    async fn delete_one(
        &self,
        ctx: &RequestContext,
        collection: &str,
        filter: &Filter,
    ) -> Result<DeleteOutcome, StoreError> {
        ctx.check()?;
        tracing::trace!(collection, ?filter, "delete_one");
        let mut collections = self.collections.write().await;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(DeleteOutcome::default());
        };
        match coll.docs.iter().position(|d| eval::matches(filter, d)) {
            Some(pos) => {
                coll.docs.remove(pos);
                Ok(DeleteOutcome { deleted: 1 })
            }
            None => Ok(DeleteOutcome::default()),
        }
    }

    async fn create_unique_index(
        &self,
        ctx: &RequestContext,
        collection: &str,
        field: &str,
    ) -> Result<(), StoreError> {
        ctx.check()?;
        let mut collections = self.collections.write().await;
        let coll = collections.entry(collection.to_string()).or_default();
        if coll.unique.iter().any(|f| f == field) {
            return Ok(());
        }
        let mut seen: Vec<&Value> = Vec::new();
        for value in coll.docs.iter().filter_map(|d| d.get(field)) {
            if seen.contains(&value) {
                return Err(duplicate(collection, field.to_string(), value));
            }
            seen.push(value);
        }
        tracing::debug!(collection, field, "unique index created");
        coll.unique.push(field.to_string());
        Ok(())
    }
}
