pub mod document_store;
pub mod tag_repository;
