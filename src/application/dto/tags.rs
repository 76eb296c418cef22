use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopularTagDto {
    pub tag_id: Uuid,
    pub count: i64,
}
