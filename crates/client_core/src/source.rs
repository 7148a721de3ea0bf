//! Video sources a user can submit for translation.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use shared::youtube::YoutubeUrl;
use tracing::warn;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";
const ACCEPTED_EXTENSIONS: &[&str] = &["mp4", "mov"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    path: PathBuf,
    file_name: String,
    mime_type: String,
    size_bytes: u64,
}

impl VideoFile {
    /// Checks that `path` is a readable regular file. MP4/MOV is only advised.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("failed to stat video file '{}'", path.display()))?;
        if !metadata.is_file() {
            bail!("'{}' is not a regular file", path.display());
        }

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("video.mp4")
            .to_string();
        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(FALLBACK_MIME_TYPE)
            .to_string();

        let file = Self {
            path: path.to_path_buf(),
            file_name,
            mime_type,
            size_bytes: metadata.len(),
        };
        if !file.has_accepted_format() {
            warn!(
                file_name = %file.file_name,
                mime_type = %file.mime_type,
                "video file is not MP4 or MOV; the backend may reject it"
            );
        }
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn has_accepted_format(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                ACCEPTED_EXTENSIONS
                    .iter()
                    .any(|accepted| ext.eq_ignore_ascii_case(accepted))
            })
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelection {
    File(VideoFile),
    YoutubeUrl(YoutubeUrl),
}

impl SourceSelection {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::YoutubeUrl(_) => "youtube_url",
        }
    }
}
