use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::application::context::RequestContext;
use crate::application::ports::document_store::{DocumentCursor, DocumentStore};
use crate::application::ports::tag_repository::{RepositoryError, TagRepository};
use crate::application::query::{
    Document, Filter, GROUP_KEY, GroupStage, Pipeline, ProjectStage, SortStage, Update,
    UpdateOptions,
};
use crate::domain::tags::tag::fields;
use crate::domain::tags::{Tag, TagPopularity};

pub const TAGS_COLLECTION: &str = "tags";
pub const ARTICLE_TAGS_COLLECTION: &str = "article_tags";

pub struct StoreTagRepository {
    pub store: Arc<dyn DocumentStore>,
    tags: String,
    article_tags: String,
}

impl StoreTagRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_collections(store, TAGS_COLLECTION, ARTICLE_TAGS_COLLECTION)
    }

    pub fn with_collections(
        store: Arc<dyn DocumentStore>,
        tags: impl Into<String>,
        article_tags: impl Into<String>,
    ) -> Self {
        Self {
            store,
            tags: tags.into(),
            article_tags: article_tags.into(),
        }
    }

    fn popularity_pipeline(limit: u64) -> Pipeline {
        Pipeline::group(GroupStage::by(fields::TAG_ID).count_as(fields::COUNT))
            .project(
                ProjectStage::new()
                    .field(fields::TAG_ID, GROUP_KEY)
                    .field(fields::COUNT, fields::COUNT),
            )
            .sort(SortStage::descending(fields::COUNT))
            .limit(limit)
    }
}

fn decode<T: DeserializeOwned>(doc: Document) -> Result<T, RepositoryError> {
    serde_json::from_value(Value::Object(doc)).map_err(RepositoryError::Decode)
}

/// Drain `cursor`, decoding every document. The first failure ends the
/// iteration and the cursor is released on the way out.
async fn collect_decoded<T: DeserializeOwned>(
    ctx: &RequestContext,
    mut cursor: DocumentCursor,
) -> Result<Vec<T>, RepositoryError> {
    let mut out = Vec::new();
    while let Some(doc) = ctx.run(async { cursor.next().await.transpose() }).await? {
        out.push(decode(doc)?);
    }
    Ok(out)
}

#[async_trait]
impl TagRepository for StoreTagRepository {
    async fn find_all_by_names(
        &self,
        ctx: &RequestContext,
        names: &[String],
    ) -> Result<Vec<Tag>, RepositoryError> {
        tracing::debug!(count = names.len(), "find_all_by_names");
        let filter = Filter::in_values(fields::NAME, names.iter().map(String::as_str));
        let cursor = ctx.run(self.store.find(ctx, &self.tags, &filter)).await?;
        collect_decoded(ctx, cursor).await
    }

    async fn find_by_name(&self, ctx: &RequestContext, name: &str) -> Result<Tag, RepositoryError> {
        tracing::debug!(name, "find_by_name");
        let filter = Filter::eq(fields::NAME, name);
        let doc = ctx
            .run(self.store.find_one(ctx, &self.tags, &filter))
            .await?;
        decode(doc)
    }

    async fn find_tag_popular(
        &self,
        ctx: &RequestContext,
        limit: u64,
    ) -> Result<Vec<TagPopularity>, RepositoryError> {
        tracing::debug!(limit, "find_tag_popular");
        // Stores reject a zero limit stage; nothing to fetch anyway.
        if limit == 0 {
            ctx.check()?;
            return Ok(Vec::new());
        }
        let pipeline = Self::popularity_pipeline(limit);
        let cursor = ctx
            .run(self.store.aggregate(ctx, &self.article_tags, &pipeline))
            .await?;
        collect_decoded(ctx, cursor).await
    }

    async fn upsert_many(
        &self,
        ctx: &RequestContext,
        names: &[String],
    ) -> Result<(), RepositoryError> {
        tracing::debug!(count = names.len(), "upsert_many");
        for name in names {
            let filter = Filter::eq(fields::NAME, name.as_str());
            let update = Update::set(fields::NAME, name.as_str());
            ctx.run(self.store.update_one(
                ctx,
                &self.tags,
                &filter,
                &update,
                UpdateOptions::upsert(),
            ))
            .await?;
        }
        Ok(())
    }

    async fn delete_by_id(&self, ctx: &RequestContext, tag: &Tag) -> Result<(), RepositoryError> {
        tracing::debug!(id = %tag.id, "delete_by_id");
        let filter = Filter::eq(fields::ID, tag.id.to_string());
        let res = ctx
            .run(self.store.delete_one(ctx, &self.tags, &filter))
            .await?;
        if res.deleted == 0 {
            return Err(RepositoryError::DeleteTargetNotFound);
        }
        Ok(())
    }

    async fn ensure_indexes(&self, ctx: &RequestContext) -> Result<(), RepositoryError> {
        ctx.run(self.store.create_unique_index(ctx, &self.tags, fields::NAME))
            .await?;
        Ok(())
    }
}
