use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{
    multipart::{Form, Part},
    Body, Client,
};
use shared::{
    domain::{CaptionOption, LanguageCode},
    protocol::{
        UploadOutcome, UploadResponse, CAPTION_OPTION_FIELD, LANGUAGE_FIELD, VIDEO_FIELD,
        YOUTUBE_URL_FIELD,
    },
};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

pub mod config;
pub mod controller;
pub mod endpoint;
pub mod error;
pub mod source;

pub use config::{load_settings, ClientSettings};
pub use controller::{
    PendingSubmission, RequestLifecycle, SubmissionController, SubmissionOutcome,
    SubmissionState, SubmissionTicket, TranslationResult,
};
pub use endpoint::BackendEndpoint;
pub use error::{SubmitError, TransportError, ValidationError};
pub use source::{SourceSelection, VideoFile};

/// Everything the backend needs for one translation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub source: SourceSelection,
    pub language: LanguageCode,
    pub caption_option: CaptionOption,
}

#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn upload(&self, request: UploadRequest) -> Result<UploadOutcome, TransportError>;
}

pub struct HttpTranslationClient {
    http: Client,
    endpoint: BackendEndpoint,
}

impl HttpTranslationClient {
    pub fn new(endpoint: BackendEndpoint) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(http: Client, endpoint: BackendEndpoint) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &BackendEndpoint {
        &self.endpoint
    }

    async fn build_form(request: UploadRequest) -> Result<Form, TransportError> {
        let form = match request.source {
            SourceSelection::File(file) => {
                let handle = tokio::fs::File::open(file.path()).await.map_err(|source| {
                    TransportError::ReadSource {
                        path: file.path().to_path_buf(),
                        source,
                    }
                })?;
                let part = Part::stream_with_length(Body::from(handle), file.size_bytes())
                    .file_name(file.file_name().to_string())
                    .mime_str(file.mime_type())?;
                Form::new().part(VIDEO_FIELD, part)
            }
            SourceSelection::YoutubeUrl(url) => {
                Form::new().text(YOUTUBE_URL_FIELD, url.as_str().to_string())
            }
        };

        Ok(form
            .text(LANGUAGE_FIELD, request.language.as_str())
            .text(CAPTION_OPTION_FIELD, request.caption_option.form_value()))
    }

    /// Streams a produced video to `dest`, returning the number of bytes written.
    ///
    /// The body lands in a sibling `.part` file first; `dest` is only replaced
    /// once the whole body has arrived.
    pub async fn download_output_video(
        &self,
        video_url: &Url,
        dest: &Path,
    ) -> Result<u64, TransportError> {
        let response = self
            .http
            .get(video_url.clone())
            .send()
            .await?
            .error_for_status()?;

        let partial = partial_path(dest);
        let written = match stream_to_file(response, &partial).await {
            Ok(written) => written,
            Err(err) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    warn!(path = %partial.display(), error = %cleanup, "failed to remove partial download");
                }
                return Err(err);
            }
        };
        if let Err(err) = tokio::fs::rename(&partial, dest).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(err.into());
        }

        info!(url = %video_url, dest = %dest.display(), bytes = written, "downloaded translated video");
        Ok(written)
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

async fn stream_to_file(response: reqwest::Response, path: &Path) -> Result<u64, TransportError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

#[async_trait]
impl TranslationBackend for HttpTranslationClient {
    async fn upload(&self, request: UploadRequest) -> Result<UploadOutcome, TransportError> {
        let source_kind = request.source.kind();
        let language = request.language;
        let form = Self::build_form(request).await?;

        debug!(source = source_kind, %language, "posting translation request");
        let response = self
            .http
            .post(self.endpoint.upload_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        let decoded: UploadResponse =
            serde_json::from_slice(&body).map_err(|source| TransportError::Decode {
                status: status.as_u16(),
                source,
            })?;

        if !status.is_success() && decoded.error.is_none() {
            warn!(status = status.as_u16(), "backend failed without an error payload");
            return Err(TransportError::UnexpectedStatus(status.as_u16()));
        }

        Ok(decoded.into_outcome()?)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
