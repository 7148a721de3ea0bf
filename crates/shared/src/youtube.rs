//! YouTube URL recognition and embeddable-id extraction.

use url::Url;

use crate::error::DomainError;

const VIDEO_ID_LEN: usize = 11;
const EMBED_BASE: &str = "https://www.youtube.com/embed/";
const ID_PATH_PREFIXES: &[&str] = &["embed", "shorts", "live", "v"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YoutubeUrl {
    raw: String,
    video_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostKind {
    Full,
    Short,
}

impl YoutubeUrl {
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let raw = text.trim();
        let invalid = |reason: &'static str| DomainError::InvalidYoutubeUrl {
            url: raw.to_string(),
            reason,
        };

        if raw.is_empty() {
            return Err(invalid("empty URL"));
        }

        let parsed = match Url::parse(raw) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{raw}"))
                .map_err(|_| invalid("not a URL"))?,
            Err(_) => return Err(invalid("not a URL")),
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| invalid("missing host"))?
            .to_ascii_lowercase();
        let kind = host_kind(&host).ok_or_else(|| invalid("not a YouTube host"))?;

        let candidate = match kind {
            HostKind::Short => first_segment(&parsed),
            HostKind::Full => match first_segment(&parsed).as_deref() {
                Some("watch") => parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                Some(prefix) if ID_PATH_PREFIXES.contains(&prefix) => nth_segment(&parsed, 1),
                _ => None,
            },
        };

        let video_id = candidate.ok_or_else(|| invalid("no video id in URL"))?;
        if !is_video_id(&video_id) {
            return Err(invalid("malformed video id"));
        }

        Ok(Self {
            raw: raw.to_string(),
            video_id,
        })
    }

    /// The URL as entered, trimmed. This is what the backend receives.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn embed_url(&self) -> String {
        format!("{EMBED_BASE}{}", self.video_id)
    }
}

fn host_kind(host: &str) -> Option<HostKind> {
    match host {
        "youtu.be" | "www.youtu.be" => Some(HostKind::Short),
        "youtube.com" | "www.youtube.com" | "m.youtube.com" | "music.youtube.com"
        | "youtube-nocookie.com" | "www.youtube-nocookie.com" => Some(HostKind::Full),
        _ => None,
    }
}

fn first_segment(url: &Url) -> Option<String> {
    nth_segment(url, 0)
}

fn nth_segment(url: &Url, n: usize) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .nth(n)
        .map(str::to_string)
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
