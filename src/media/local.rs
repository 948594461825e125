use super::{MediaError, MediaStorage, UploadedFile};
use async_trait::async_trait;
use log::{info, warn};
use std::path::PathBuf;
use url::Url;
use uuid::Uuid;

/// Writes uploads under `root` and serves them from `base_url`.
#[derive(Clone, Debug)]
pub struct LocalMediaStorage {
    root: PathBuf,
    base_url: Url,
}

impl LocalMediaStorage {
    /// `base_url` should end with a slash so object names are joined under it.
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Result<Self, MediaError> {
        let base_url = Url::parse(base_url).map_err(|e| MediaError::Url(e.to_string()))?;
        Ok(Self {
            root: root.into(),
            base_url,
        })
    }

    fn object_name(file: &UploadedFile) -> String {
        match file.extension() {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        }
    }

    fn object_path(&self, url: &str) -> Result<PathBuf, MediaError> {
        let name = url
            .strip_prefix(self.base_url.as_str())
            .filter(|n| !n.is_empty() && !n.contains('/') && !n.contains(".."))
            .ok_or_else(|| MediaError::Url(url.to_string()))?;
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn save(&self, file: &UploadedFile) -> Result<String, MediaError> {
        if file.bytes.is_empty() {
            return Err(MediaError::Empty(file.file_name.clone()));
        }
        tokio::fs::create_dir_all(&self.root).await?;
        let name = Self::object_name(file);
        tokio::fs::write(self.root.join(&name), &file.bytes).await?;
        let url = self
            .base_url
            .join(&name)
            .map_err(|e| MediaError::Url(e.to_string()))?;
        info!("stored upload {} as {}", file.file_name, url);
        Ok(url.to_string())
    }

    async fn delete(&self, url: &str) -> Result<(), MediaError> {
        let path = self.object_path(url)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("media object already gone: {}", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
