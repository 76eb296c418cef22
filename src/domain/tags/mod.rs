pub mod tag;

pub use tag::{ArticleTag, Tag, TagPopularity};
