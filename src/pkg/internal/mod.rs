pub mod adaptors;
pub mod catalog;
pub mod ingest;
pub mod retention;
