pub mod consistency;
pub mod embed;
pub mod service;
pub mod validation;

pub use service::ArchiveService;
pub use validation::{GeographicRecordSubmission, LanguageRecordSubmission};
