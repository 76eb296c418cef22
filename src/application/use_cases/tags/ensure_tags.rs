use crate::application::context::RequestContext;
use crate::application::ports::tag_repository::{RepositoryError, TagRepository};
use crate::application::services::tagging::normalize_tag_names;
use crate::domain::tags::Tag;

pub struct EnsureTags<'a, R: TagRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: TagRepository + ?Sized> EnsureTags<'a, R> {
    /// Make sure every usable name exists and return the stored tags.
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        raw_names: &[String],
    ) -> Result<Vec<Tag>, RepositoryError> {
        let names = normalize_tag_names(raw_names);
        if names.is_empty() {
            return Ok(Vec::new());
        }
        self.repo.upsert_many(ctx, &names).await?;
        self.repo.find_all_by_names(ctx, &names).await
    }
}
