use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Document field names shared by the `tags` and `article_tags` collections.
pub mod fields {
    pub const ID: &str = "_id";
    pub const NAME: &str = "name";
    pub const ARTICLE_ID: &str = "articleID";
    pub const TAG_ID: &str = "tagID";
    pub const COUNT: &str = "count";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
}

/// Links one article to one tag. Only ever read here, for aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleTag {
    #[serde(rename = "articleID")]
    pub article_id: Uuid,
    #[serde(rename = "tagID")]
    pub tag_id: Uuid,
}

/// Number of article associations currently pointing at a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPopularity {
    #[serde(rename = "tagID")]
    pub tag_id: Uuid,
    pub count: i64,
}
