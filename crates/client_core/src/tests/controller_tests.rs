use super::*;

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use shared::protocol::{ProtocolError, TranslatedVideo};

const BASE: &str = "http://127.0.0.1:5000";
const YOUTUBE: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

#[derive(Clone)]
enum Scripted {
    Translated(TranslatedVideo),
    Rejected(String),
    ConnectionRefused,
    Hang,
}

struct ScriptedBackend {
    reply: Scripted,
    calls: Arc<AtomicUsize>,
    seen: Arc<std::sync::Mutex<Vec<UploadRequest>>>,
}

impl ScriptedBackend {
    fn new(reply: Scripted) -> Self {
        Self {
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    fn translated(output_video: &str, summary: Option<&str>, transcription: Option<&str>) -> Self {
        Self::new(Scripted::Translated(TranslatedVideo {
            output_video: output_video.to_string(),
            summary: summary.map(str::to_string),
            transcription: transcription.map(str::to_string),
        }))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationBackend for ScriptedBackend {
    async fn upload(&self, request: UploadRequest) -> Result<UploadOutcome, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().expect("seen lock").push(request);
        match self.reply.clone() {
            Scripted::Translated(video) => Ok(UploadOutcome::Translated(video)),
            Scripted::Rejected(message) => Ok(UploadOutcome::Rejected(message)),
            Scripted::ConnectionRefused => Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
            Scripted::Hang => futures::future::pending().await,
        }
    }
}

fn controller() -> SubmissionController {
    SubmissionController::new(BackendEndpoint::parse(BASE).expect("endpoint"))
}

fn language(code: &str) -> LanguageCode {
    LanguageCode::parse(code).expect("language")
}

async fn temp_video() -> (tempfile::NamedTempFile, VideoFile) {
    let file = tempfile::Builder::new()
        .suffix(".mp4")
        .tempfile()
        .expect("temp file");
    let video = VideoFile::open(file.path()).await.expect("open video");
    (file, video)
}

#[tokio::test]
async fn submit_without_source_never_calls_backend() {
    let backend = ScriptedBackend::translated("out.mp4", None, None);
    let mut controller = controller();

    let err = controller.submit(&backend).await.expect_err("validation");

    assert_eq!(err, SubmitError::Validation(ValidationError::MissingSource));
    assert_eq!(controller.error_message(), Some(MISSING_SOURCE_MESSAGE));
    assert_eq!(controller.lifecycle(), RequestLifecycle::Idle);
    assert!(!controller.is_submitting());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn missing_source_takes_precedence_over_missing_language() {
    let backend = ScriptedBackend::translated("out.mp4", None, None);
    let mut controller = controller();
    controller.clear_language();

    controller.submit(&backend).await.expect_err("validation");

    assert_eq!(controller.error_message(), Some(MISSING_SOURCE_MESSAGE));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn submit_without_language_never_calls_backend() {
    let backend = ScriptedBackend::translated("out.mp4", None, None);
    let mut controller = controller();
    controller.select_youtube_url(YOUTUBE).expect("url");
    controller.clear_language();

    let err = controller.submit(&backend).await.expect_err("validation");

    assert_eq!(err, SubmitError::Validation(ValidationError::MissingLanguage));
    assert_eq!(controller.error_message(), Some(MISSING_LANGUAGE_MESSAGE));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn readiness_tracks_source_language_and_in_flight() {
    let mut controller = controller();
    assert!(!controller.is_ready());

    controller.select_youtube_url(YOUTUBE).expect("url");
    assert!(controller.is_ready());

    controller.clear_language();
    assert!(!controller.is_ready());
    assert_eq!(controller.error_message(), None);

    controller.set_language(language("de"));
    let pending = controller.begin_submission().expect("begin");
    assert!(!controller.is_ready());

    controller.abandon(pending.ticket);
    assert!(controller.is_ready());
}

#[tokio::test]
async fn selecting_a_file_replaces_a_youtube_url_and_vice_versa() {
    let (_file, video) = temp_video().await;
    let mut controller = controller();

    controller.select_youtube_url(YOUTUBE).expect("url");
    assert!(matches!(
        controller.source(),
        Some(SourceSelection::YoutubeUrl(_))
    ));

    controller.select_file(video.clone());
    assert_eq!(controller.source(), Some(&SourceSelection::File(video)));

    controller.select_youtube_url(YOUTUBE).expect("url");
    assert!(matches!(
        controller.source(),
        Some(SourceSelection::YoutubeUrl(url)) if url.video_id() == "dQw4w9WgXcQ"
    ));
}

#[tokio::test]
async fn successful_response_builds_result() {
    let backend = ScriptedBackend::translated("out.mp4", Some("S"), Some("T"));
    let mut controller = controller();
    controller.select_youtube_url(YOUTUBE).expect("url");
    controller.set_language(language("fr"));
    controller.set_caption_option(CaptionOption::Translated);

    let outcome = controller.submit(&backend).await.expect("submit");

    assert_eq!(outcome, SubmissionOutcome::Succeeded);
    assert_eq!(controller.lifecycle(), RequestLifecycle::Succeeded);
    assert_eq!(controller.error_message(), None);
    let result = controller.result().expect("result");
    assert_eq!(
        result.translated_video_ref.as_str(),
        "http://127.0.0.1:5000/output_videos/out.mp4"
    );
    assert_eq!(result.summary.as_deref(), Some("S"));
    assert_eq!(result.transcription.as_deref(), Some("T"));

    let seen = backend.seen.lock().expect("seen lock");
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].language.as_str(), "fr");
    assert_eq!(seen[0].caption_option, CaptionOption::Translated);
}

#[tokio::test]
async fn backend_error_is_shown_verbatim() {
    let backend = ScriptedBackend::new(Scripted::Rejected("bad file".into()));
    let mut controller = controller();
    controller.select_youtube_url(YOUTUBE).expect("url");

    let outcome = controller.submit(&backend).await.expect("submit");

    assert_eq!(outcome, SubmissionOutcome::BackendRejected);
    assert_eq!(controller.error_message(), Some("bad file"));
    assert_eq!(controller.result(), None);
    assert_eq!(controller.lifecycle(), RequestLifecycle::Failed);
}

#[tokio::test]
async fn transport_failure_shows_generic_message() {
    let backend = ScriptedBackend::new(Scripted::ConnectionRefused);
    let mut controller = controller();
    controller.select_youtube_url(YOUTUBE).expect("url");

    let outcome = controller.submit(&backend).await.expect("submit");

    assert_eq!(outcome, SubmissionOutcome::TransportFailed);
    assert_eq!(controller.error_message(), Some(GENERIC_FAILURE_MESSAGE));
    assert_eq!(controller.lifecycle(), RequestLifecycle::Failed);
    assert_eq!(controller.result(), None);
}

#[tokio::test]
async fn terminal_states_allow_another_submission() {
    let failing = ScriptedBackend::new(Scripted::ConnectionRefused);
    let working = ScriptedBackend::translated("again.mp4", None, None);
    let mut controller = controller();
    controller.select_youtube_url(YOUTUBE).expect("url");

    controller.submit(&failing).await.expect("first submit");
    assert!(!controller.is_submitting());

    let outcome = controller.submit(&working).await.expect("second submit");
    assert_eq!(outcome, SubmissionOutcome::Succeeded);
    assert!(!controller.is_submitting());
    assert_eq!(working.calls(), 1);
}

#[tokio::test]
async fn only_one_submission_in_flight() {
    let mut controller = controller();
    controller.select_youtube_url(YOUTUBE).expect("url");

    let pending = controller.begin_submission().expect("first");
    assert_eq!(controller.lifecycle(), RequestLifecycle::Submitting);
    let before = controller.state().clone();

    assert_eq!(
        controller.begin_submission().expect_err("second"),
        SubmitError::AlreadyInFlight
    );
    assert_eq!(controller.state(), &before);

    let outcome = controller.complete_submission(
        pending.ticket,
        Ok(UploadOutcome::Rejected("busy".into())),
    );
    assert_eq!(outcome, SubmissionOutcome::BackendRejected);
    assert!(controller.begin_submission().is_ok());
}

#[tokio::test]
async fn outcome_after_source_change_is_discarded() {
    let (_file, video) = temp_video().await;
    let mut controller = controller();
    controller.select_youtube_url(YOUTUBE).expect("url");

    let pending = controller.begin_submission().expect("begin");
    controller.select_file(video);
    assert!(controller.is_submitting());
    assert_eq!(controller.lifecycle(), RequestLifecycle::Submitting);

    let outcome = controller.complete_submission(
        pending.ticket,
        Ok(UploadOutcome::Translated(TranslatedVideo {
            output_video: "stale.mp4".into(),
            summary: None,
            transcription: None,
        })),
    );

    assert_eq!(outcome, SubmissionOutcome::Discarded);
    assert_eq!(controller.lifecycle(), RequestLifecycle::Idle);
    assert_eq!(controller.result(), None);
    assert!(!controller.is_submitting());
}

#[tokio::test]
async fn completing_twice_is_ignored() {
    let mut controller = controller();
    controller.select_youtube_url(YOUTUBE).expect("url");
    let pending = controller.begin_submission().expect("begin");

    controller.complete_submission(pending.ticket, Ok(UploadOutcome::Rejected("first".into())));
    let outcome = controller.complete_submission(
        pending.ticket,
        Err(TransportError::Protocol(ProtocolError::MissingOutputVideo)),
    );

    assert_eq!(outcome, SubmissionOutcome::Discarded);
    assert_eq!(controller.error_message(), Some("first"));
}

#[tokio::test]
async fn dropping_submit_future_clears_in_flight_flag() {
    let backend = ScriptedBackend::new(Scripted::Hang);
    let mut controller = controller();
    controller.select_youtube_url(YOUTUBE).expect("url");

    let timed_out =
        tokio::time::timeout(Duration::from_millis(20), controller.submit(&backend)).await;

    assert!(timed_out.is_err());
    assert_eq!(backend.calls(), 1);
    assert!(!controller.is_submitting());
    assert_eq!(controller.lifecycle(), RequestLifecycle::Idle);
}

#[tokio::test]
async fn invalid_youtube_url_clears_source_and_sets_message() {
    let mut controller = controller();
    controller.select_youtube_url(YOUTUBE).expect("url");

    let err = controller
        .select_youtube_url("https://vimeo.com/1234")
        .expect_err("invalid");

    assert!(matches!(err, DomainError::InvalidYoutubeUrl { .. }));
    assert_eq!(controller.source(), None);
    assert_eq!(controller.error_message(), Some(INVALID_YOUTUBE_URL_MESSAGE));
}

#[tokio::test]
async fn new_selection_clears_previous_result_and_error() {
    let backend = ScriptedBackend::translated("out.mp4", None, None);
    let mut controller = controller();
    controller.select_youtube_url(YOUTUBE).expect("url");
    controller.submit(&backend).await.expect("submit");
    assert!(controller.result().is_some());

    controller
        .select_youtube_url("https://youtu.be/aaaaaaaaaaa")
        .expect("url");

    assert_eq!(controller.result(), None);
    assert_eq!(controller.error_message(), None);
    assert_eq!(controller.lifecycle(), RequestLifecycle::Idle);
}

#[tokio::test]
async fn invalid_output_name_counts_as_transport_failure() {
    let backend = ScriptedBackend::translated("..", None, None);
    let mut controller = controller();
    controller.select_youtube_url(YOUTUBE).expect("url");

    let outcome = controller.submit(&backend).await.expect("submit");

    assert_eq!(outcome, SubmissionOutcome::TransportFailed);
    assert_eq!(controller.error_message(), Some(GENERIC_FAILURE_MESSAGE));
}

#[test]
fn setting_language_is_idempotent() {
    let mut once = controller();
    once.set_language(language("de"));

    let mut twice = controller();
    twice.set_language(language("de"));
    twice.set_language(language("de"));

    assert_eq!(once.state(), twice.state());
}

#[test]
fn defaults_match_product_defaults() {
    let controller = controller();
    assert_eq!(controller.language().map(|l| l.as_str()), Some("en"));
    assert_eq!(controller.caption_option(), CaptionOption::None);
    assert_eq!(controller.lifecycle(), RequestLifecycle::Idle);
    assert_eq!(controller.source(), None);
}
