use crate::application::context::RequestContext;
use crate::application::ports::tag_repository::{RepositoryError, TagRepository};
use crate::domain::tags::Tag;

pub struct DeleteTagByName<'a, R: TagRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: TagRepository + ?Sized> DeleteTagByName<'a, R> {
    pub async fn execute(&self, ctx: &RequestContext, name: &str) -> Result<Tag, RepositoryError> {
        let tag = self.repo.find_by_name(ctx, name).await?;
        self.repo.delete_by_id(ctx, &tag).await?;
        Ok(tag)
    }
}
