pub mod blob_store;
pub mod document_store;
pub mod email_sender;
pub mod memory_store;
pub mod pg_store;
