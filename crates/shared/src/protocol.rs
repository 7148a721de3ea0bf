use serde::Deserialize;
use thiserror::Error;

pub const VIDEO_FIELD: &str = "video";
pub const YOUTUBE_URL_FIELD: &str = "youtube_url";
pub const LANGUAGE_FIELD: &str = "language";
pub const CAPTION_OPTION_FIELD: &str = "caption_option";

pub fn upload_route() -> &'static str {
    "/upload"
}

pub fn output_videos_route() -> &'static str {
    "/output_videos"
}

/// JSON body returned by `POST /upload`, both on success and on rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub output_video: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub transcription: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedVideo {
    pub output_video: String,
    pub summary: Option<String>,
    pub transcription: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Translated(TranslatedVideo),
    /// The backend answered with an `error` field; carried verbatim.
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("upload response carries neither error nor output_video")]
    MissingOutputVideo,
}

impl UploadResponse {
    pub fn into_outcome(self) -> Result<UploadOutcome, ProtocolError> {
        if let Some(error) = self.error {
            return Ok(UploadOutcome::Rejected(error));
        }

        match self.output_video {
            Some(output_video) if !output_video.trim().is_empty() => {
                Ok(UploadOutcome::Translated(TranslatedVideo {
                    output_video,
                    summary: self.summary,
                    transcription: self.transcription,
                }))
            }
            _ => Err(ProtocolError::MissingOutputVideo),
        }
    }
}
