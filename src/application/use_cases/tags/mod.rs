pub mod delete_tag_by_name;
pub mod ensure_tags;
pub mod list_popular_tags;
