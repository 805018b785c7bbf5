use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;
use uuid::Uuid;

use snapshow_db::ContestError;

/// Extensions the contest accepts for photo and avatar uploads.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// On-disk store for uploaded images, one flat file per upload under a
/// freshly generated name. The original filename only contributes its
/// extension.
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub async fn new(dir: PathBuf) -> anyhow::Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Upload storage directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist upload bytes, returning the stored file reference.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, ContestError> {
        let ext = allowed_extension(original_name).ok_or(ContestError::Validation(
            "only JPG, PNG, or GIF images are allowed",
        ))?;

        let name = format!("{}.{}", Uuid::new_v4(), ext);
        fs::write(self.dir.join(&name), bytes)
            .await
            .map_err(|e| ContestError::Internal(e.into()))?;

        Ok(name)
    }
}

fn allowed_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::allowed_extension;

    #[test]
    fn extension_check_is_case_insensitive() {
        assert_eq!(allowed_extension("shot.JPG").as_deref(), Some("jpg"));
        assert_eq!(allowed_extension("shot.jpeg").as_deref(), Some("jpeg"));
    }

    #[test]
    fn unknown_or_missing_extensions_are_rejected() {
        assert_eq!(allowed_extension("script.exe"), None);
        assert_eq!(allowed_extension("noext"), None);
        assert_eq!(allowed_extension("archive.tar.gz"), None);
    }
}
