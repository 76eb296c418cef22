use std::sync::Arc;

use crate::application::context::RequestContext;
use crate::application::ports::document_store::DocumentStore;
use crate::application::ports::tag_repository::TagRepository;
use crate::bootstrap::config::Config;
use crate::infrastructure::db::memory::MemoryDocumentStore;
use crate::infrastructure::db::repositories::tag_repository_store::StoreTagRepository;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    tag_repo: Arc<dyn TagRepository>,
}

impl AppContext {
    pub fn new(cfg: Config, store: Arc<dyn DocumentStore>) -> Self {
        let tag_repo = Arc::new(StoreTagRepository::with_collections(
            store,
            cfg.tags_collection.clone(),
            cfg.article_tags_collection.clone(),
        ));
        Self { cfg, tag_repo }
    }

    /// Context backed by the embedded store, with tag indexes declared.
    pub async fn in_memory(cfg: Config) -> anyhow::Result<(Self, Arc<MemoryDocumentStore>)> {
        let store = Arc::new(MemoryDocumentStore::new());
        let ctx = Self::new(cfg, store.clone());
        ctx.tag_repo
            .ensure_indexes(&ctx.request_context())
            .await?;
        tracing::info!(
            tags = %ctx.cfg.tags_collection,
            article_tags = %ctx.cfg.article_tags_collection,
            "in-memory tag store ready"
        );
        Ok((ctx, store))
    }

    pub fn tag_repo(&self) -> Arc<dyn TagRepository> {
        self.tag_repo.clone()
    }

    /// Fresh request scope bounded by the configured store timeout.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::new().with_timeout(self.cfg.store_op_timeout)
    }
}
