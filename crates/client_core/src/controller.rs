//! Session state for one user and the submit workflow that drives it.
//!
//! The controller knows nothing about any UI toolkit. A view reads
//! [`SubmissionController::state`] and calls the setters on user input.

use shared::{
    domain::{CaptionOption, LanguageCode},
    error::DomainError,
    protocol::UploadOutcome,
    youtube::YoutubeUrl,
};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::{
    endpoint::BackendEndpoint,
    error::{SubmitError, TransportError, ValidationError},
    source::{SourceSelection, VideoFile},
    TranslationBackend, UploadRequest,
};

pub const MISSING_SOURCE_MESSAGE: &str = "Please upload a video file or provide a YouTube URL.";
pub const MISSING_LANGUAGE_MESSAGE: &str = "Please select a language.";
pub const INVALID_YOUTUBE_URL_MESSAGE: &str = "Please provide a valid YouTube URL.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to process the video. Please try again.";

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingSource => MISSING_SOURCE_MESSAGE,
            Self::MissingLanguage => MISSING_LANGUAGE_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestLifecycle {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub translated_video_ref: Url,
    pub transcription: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionState {
    pub source: Option<SourceSelection>,
    pub language: Option<LanguageCode>,
    pub caption_option: CaptionOption,
    pub lifecycle: RequestLifecycle,
    pub result: Option<TranslationResult>,
    pub error_message: Option<String>,
}

impl Default for SubmissionState {
    fn default() -> Self {
        Self {
            source: None,
            language: Some(LanguageCode::default()),
            caption_option: CaptionOption::default(),
            lifecycle: RequestLifecycle::Idle,
            result: None,
            error_message: None,
        }
    }
}

/// Identifies one submission. `generation` is the source selection it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket {
    pub id: Uuid,
    generation: u64,
}

#[derive(Debug)]
pub struct PendingSubmission {
    pub ticket: SubmissionTicket,
    pub request: UploadRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Succeeded,
    BackendRejected,
    TransportFailed,
    /// The outcome arrived after the source selection changed, or for a
    /// submission that is no longer in flight.
    Discarded,
}

pub struct SubmissionController {
    endpoint: BackendEndpoint,
    state: SubmissionState,
    generation: u64,
    in_flight: Option<SubmissionTicket>,
}

impl SubmissionController {
    pub fn new(endpoint: BackendEndpoint) -> Self {
        Self::with_state(endpoint, SubmissionState::default())
    }

    pub fn with_defaults(
        endpoint: BackendEndpoint,
        language: Option<LanguageCode>,
        caption_option: CaptionOption,
    ) -> Self {
        Self::with_state(
            endpoint,
            SubmissionState {
                language,
                caption_option,
                ..SubmissionState::default()
            },
        )
    }

    fn with_state(endpoint: BackendEndpoint, state: SubmissionState) -> Self {
        Self {
            endpoint,
            state,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn endpoint(&self) -> &BackendEndpoint {
        &self.endpoint
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn source(&self) -> Option<&SourceSelection> {
        self.state.source.as_ref()
    }

    pub fn language(&self) -> Option<LanguageCode> {
        self.state.language
    }

    pub fn caption_option(&self) -> CaptionOption {
        self.state.caption_option
    }

    pub fn lifecycle(&self) -> RequestLifecycle {
        self.state.lifecycle
    }

    pub fn result(&self) -> Option<&TranslationResult> {
        self.state.result.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.state.error_message.as_deref()
    }

    /// Views should disable the submit trigger while this is true.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn select_file(&mut self, file: VideoFile) {
        debug!(file_name = file.file_name(), "video file selected");
        self.replace_source(Some(SourceSelection::File(file)));
    }

    /// Invalid text drops the current source and surfaces a message.
    pub fn select_youtube_url(&mut self, text: &str) -> Result<(), DomainError> {
        match YoutubeUrl::parse(text) {
            Ok(url) => {
                debug!(video_id = url.video_id(), "youtube url selected");
                self.replace_source(Some(SourceSelection::YoutubeUrl(url)));
                Ok(())
            }
            Err(err) => {
                self.replace_source(None);
                self.state.error_message = Some(INVALID_YOUTUBE_URL_MESSAGE.to_string());
                Err(err)
            }
        }
    }

    pub fn set_language(&mut self, code: LanguageCode) {
        self.state.language = Some(code);
    }

    pub fn clear_language(&mut self) {
        self.state.language = None;
    }

    pub fn set_caption_option(&mut self, option: CaptionOption) {
        self.state.caption_option = option;
    }

    fn replace_source(&mut self, source: Option<SourceSelection>) {
        self.state.source = source;
        self.state.result = None;
        self.state.error_message = None;
        self.generation += 1;
        if self.in_flight.is_none() {
            self.state.lifecycle = RequestLifecycle::Idle;
        }
    }

    /// True when a submission would pass validation right now.
    pub fn is_ready(&self) -> bool {
        self.in_flight.is_none() && self.validate().is_ok()
    }

    fn validate(&self) -> Result<(SourceSelection, LanguageCode), ValidationError> {
        let source = self
            .state
            .source
            .clone()
            .ok_or(ValidationError::MissingSource)?;
        let language = self.state.language.ok_or(ValidationError::MissingLanguage)?;
        Ok((source, language))
    }

    /// First half of [`Self::submit`]: validates and marks the session in flight.
    pub fn begin_submission(&mut self) -> Result<PendingSubmission, SubmitError> {
        if self.in_flight.is_some() {
            return Err(SubmitError::AlreadyInFlight);
        }

        let (source, language) = match self.validate() {
            Ok(valid) => valid,
            Err(err) => {
                debug!(reason = %err, "submission rejected before upload");
                self.state.lifecycle = RequestLifecycle::Idle;
                self.state.result = None;
                self.state.error_message = Some(err.user_message().to_string());
                return Err(err.into());
            }
        };

        let ticket = SubmissionTicket {
            id: Uuid::new_v4(),
            generation: self.generation,
        };
        self.in_flight = Some(ticket);
        self.state.lifecycle = RequestLifecycle::Submitting;
        self.state.error_message = None;
        self.state.result = None;

        info!(
            submission_id = %ticket.id,
            source = source.kind(),
            %language,
            caption_option = %self.state.caption_option,
            "submitting video for translation"
        );

        Ok(PendingSubmission {
            ticket,
            request: UploadRequest {
                source,
                language,
                caption_option: self.state.caption_option,
            },
        })
    }

    /// Second half of [`Self::submit`]. Always clears the in-flight flag for `ticket`.
    pub fn complete_submission(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<UploadOutcome, TransportError>,
    ) -> SubmissionOutcome {
        if self.in_flight != Some(ticket) {
            debug!(submission_id = %ticket.id, "ignoring outcome of a submission that is not in flight");
            return SubmissionOutcome::Discarded;
        }
        self.in_flight = None;

        if ticket.generation != self.generation {
            info!(submission_id = %ticket.id, "source changed while in flight; discarding outcome");
            self.state.lifecycle = RequestLifecycle::Idle;
            return SubmissionOutcome::Discarded;
        }

        match outcome {
            Ok(UploadOutcome::Translated(video)) => {
                match self.endpoint.output_video_url(&video.output_video) {
                    Ok(translated_video_ref) => {
                        info!(
                            submission_id = %ticket.id,
                            video = %translated_video_ref,
                            "translation succeeded"
                        );
                        self.state.result = Some(TranslationResult {
                            translated_video_ref,
                            transcription: video.transcription,
                            summary: video.summary,
                        });
                        self.state.lifecycle = RequestLifecycle::Succeeded;
                        SubmissionOutcome::Succeeded
                    }
                    Err(err) => self.fail_transport(ticket, err),
                }
            }
            Ok(UploadOutcome::Rejected(message)) => {
                warn!(submission_id = %ticket.id, error = %message, "backend rejected submission");
                self.state.result = None;
                self.state.error_message = Some(message);
                self.state.lifecycle = RequestLifecycle::Failed;
                SubmissionOutcome::BackendRejected
            }
            Err(err) => self.fail_transport(ticket, err),
        }
    }

    fn fail_transport(&mut self, ticket: SubmissionTicket, err: TransportError) -> SubmissionOutcome {
        warn!(submission_id = %ticket.id, error = %err, "translation request failed");
        self.state.result = None;
        self.state.error_message = Some(GENERIC_FAILURE_MESSAGE.to_string());
        self.state.lifecycle = RequestLifecycle::Failed;
        SubmissionOutcome::TransportFailed
    }

    fn abandon(&mut self, ticket: SubmissionTicket) {
        if self.in_flight == Some(ticket) {
            warn!(submission_id = %ticket.id, "submission abandoned before the backend answered");
            self.in_flight = None;
            self.state.lifecycle = RequestLifecycle::Idle;
        }
    }

    /// Validates, issues exactly one upload, and applies its outcome.
    pub async fn submit(
        &mut self,
        backend: &dyn TranslationBackend,
    ) -> Result<SubmissionOutcome, SubmitError> {
        let PendingSubmission { ticket, request } = self.begin_submission()?;
        let guard = InFlightGuard {
            controller: self,
            ticket,
            armed: true,
        };
        let outcome = backend.upload(request).await;
        Ok(guard.complete(outcome))
    }
}

/// Clears the in-flight flag if the submit future is dropped mid-await.
struct InFlightGuard<'a> {
    controller: &'a mut SubmissionController,
    ticket: SubmissionTicket,
    armed: bool,
}

impl InFlightGuard<'_> {
    fn complete(mut self, outcome: Result<UploadOutcome, TransportError>) -> SubmissionOutcome {
        self.armed = false;
        self.controller.complete_submission(self.ticket, outcome)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.controller.abandon(self.ticket);
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
