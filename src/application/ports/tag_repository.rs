use async_trait::async_trait;

use crate::application::context::RequestContext;
use crate::application::ports::document_store::StoreError;
use crate::domain::tags::{Tag, TagPopularity};

#[derive(thiserror::Error, Debug)]
pub enum RepositoryError {
    #[error("tag not found")]
    NotFound,
    #[error("no tag removed: delete target not found")]
    DeleteTargetNotFound,
    #[error("failed to decode stored document")]
    Decode(#[source] serde_json::Error),
    #[error("store operation failed")]
    Store(#[source] StoreError),
}

impl RepositoryError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RepositoryError::Store(e) if e.is_cancellation())
    }
}

// The only place a store signal becomes a repository error: "no documents"
// turns into `NotFound`, everything else is carried as `Store`.
impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NoDocuments => RepositoryError::NotFound,
            other => RepositoryError::Store(other),
        }
    }
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Tags whose name is one of `names`, in no particular order.
    async fn find_all_by_names(
        &self,
        ctx: &RequestContext,
        names: &[String],
    ) -> Result<Vec<Tag>, RepositoryError>;

    async fn find_by_name(&self, ctx: &RequestContext, name: &str) -> Result<Tag, RepositoryError>;

    /// Association counts per tag, highest first, at most `limit` entries.
    async fn find_tag_popular(
        &self,
        ctx: &RequestContext,
        limit: u64,
    ) -> Result<Vec<TagPopularity>, RepositoryError>;

    /// Insert each missing name as a tag; existing names are left as they are.
    async fn upsert_many(
        &self,
        ctx: &RequestContext,
        names: &[String],
    ) -> Result<(), RepositoryError>;

    async fn delete_by_id(&self, ctx: &RequestContext, tag: &Tag) -> Result<(), RepositoryError>;

    /// Declare the unique index on tag names that `upsert_many` relies on.
    async fn ensure_indexes(&self, ctx: &RequestContext) -> Result<(), RepositoryError>;
}
