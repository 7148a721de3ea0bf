use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("unsupported language code '{0}'")]
    UnknownLanguage(String),
    #[error("unsupported caption option '{0}'")]
    UnknownCaptionOption(String),
    #[error("invalid YouTube URL '{url}': {reason}")]
    InvalidYoutubeUrl { url: String, reason: &'static str },
}
