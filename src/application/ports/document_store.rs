use async_trait::async_trait;
use futures_util::stream::{BoxStream, Stream, StreamExt};
use serde_json::Value;

use crate::application::context::RequestContext;
use crate::application::query::{Document, Filter, Pipeline, Update, UpdateOptions};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A single-document read matched nothing.
    #[error("no documents in result")]
    NoDocuments,
    #[error("duplicate key {field}={value} in {collection}")]
    DuplicateKey {
        collection: String,
        field: String,
        value: String,
    },
    #[error("operation cancelled")]
    Cancelled,
    #[error("operation deadline exceeded")]
    DeadlineExceeded,
    #[error("command rejected: {0}")]
    Rejected(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, StoreError::Cancelled | StoreError::DeadlineExceeded)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
    pub upserted_id: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted: u64,
}

/// Server-side cursor over a multi-document result.
///
/// The cursor is released when this value is dropped, whether iteration ran
/// to completion or was abandoned half-way.
pub struct DocumentCursor {
    inner: BoxStream<'static, Result<Document, StoreError>>,
    on_close: Option<Box<dyn FnOnce() + Send>>,
}

impl DocumentCursor {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Document, StoreError>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
            on_close: None,
        }
    }

    /// Run `release` exactly once when the cursor goes away.
    pub fn on_close(mut self, release: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(release));
        self
    }

    pub async fn next(&mut self) -> Option<Result<Document, StoreError>> {
        self.inner.next().await
    }
}

impl Drop for DocumentCursor {
    fn drop(&mut self) {
        if let Some(release) = self.on_close.take() {
            release();
        }
    }
}

impl std::fmt::Debug for DocumentCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCursor")
            .field("open", &self.on_close.is_some())
            .finish()
    }
}

/// Collection-addressable document store.
///
/// Every command takes the caller's context and must give up with
/// `Cancelled`/`DeadlineExceeded` once that context is done.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(
        &self,
        ctx: &RequestContext,
        collection: &str,
        filter: &Filter,
    ) -> Result<DocumentCursor, StoreError>;

    /// First matching document, or `StoreError::NoDocuments`.
    async fn find_one(
        &self,
        ctx: &RequestContext,
        collection: &str,
        filter: &Filter,
    ) -> Result<Document, StoreError>;

    async fn aggregate(
        &self,
        ctx: &RequestContext,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<DocumentCursor, StoreError>;

    async fn update_one(
        &self,
        ctx: &RequestContext,
        collection: &str,
        filter: &Filter,
        update: &Update,
        options: UpdateOptions,
    ) -> Result<UpdateOutcome, StoreError>;

    async fn delete_one(
        &self,
        ctx: &RequestContext,
        collection: &str,
        filter: &Filter,
    ) -> Result<DeleteOutcome, StoreError>;

    /// Declare a unique index on `field`. Declaring an existing index is a no-op.
    async fn create_unique_index(
        &self,
        ctx: &RequestContext,
        collection: &str,
        field: &str,
    ) -> Result<(), StoreError>;
}
