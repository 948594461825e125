pub mod local;

pub use local::LocalMediaStorage;

use async_trait::async_trait;

/// A binary received alongside a record submission.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Lower-cased extension of the original file name, if any.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum MediaError {
    #[error("uploaded file {0:?} is empty")]
    Empty(String),
    #[error("media io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid media url: {0}")]
    Url(String),
}

/// Object storage for uploaded media. Returns the public URL that ends up in
/// `file_path` / `thumbnail_path`.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn save(&self, file: &UploadedFile) -> Result<String, MediaError>;

    async fn delete(&self, url: &str) -> Result<(), MediaError>;
}
