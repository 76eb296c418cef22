pub mod tag_repository_store;
