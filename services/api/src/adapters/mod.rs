pub mod db;
pub mod extractors;
pub mod file_store;

pub use db::DbAdapter;
pub use extractors::{default_registry, DocxTextExtractor, PdfTextExtractor};
pub use file_store::{stored_filename, LocalFileStore};
