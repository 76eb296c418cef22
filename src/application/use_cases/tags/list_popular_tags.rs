use crate::application::context::RequestContext;
use crate::application::dto::tags::PopularTagDto;
use crate::application::ports::tag_repository::{RepositoryError, TagRepository};

pub struct ListPopularTags<'a, R: TagRepository + ?Sized> {
    pub repo: &'a R,
    pub max_limit: u64,
}

impl<'a, R: TagRepository + ?Sized> ListPopularTags<'a, R> {
    /// `limit` defaults to, and is capped at, `max_limit`.
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        limit: Option<u64>,
    ) -> Result<Vec<PopularTagDto>, RepositoryError> {
        let limit = limit.unwrap_or(self.max_limit).min(self.max_limit);
        let rows = self.repo.find_tag_popular(ctx, limit).await?;
        Ok(rows
            .into_iter()
            .map(|p| PopularTagDto {
                tag_id: p.tag_id,
                count: p.count,
            })
            .collect())
    }
}
