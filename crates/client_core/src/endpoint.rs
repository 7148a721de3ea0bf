use anyhow::{anyhow, bail, Context, Result};
use shared::protocol::{output_videos_route, upload_route};
use url::Url;

use crate::error::TransportError;

/// Base address of the translation backend. Always ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEndpoint {
    base: Url,
}

impl BackendEndpoint {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let mut base =
            Url::parse(raw).with_context(|| format!("invalid backend url '{raw}'"))?;
        if !matches!(base.scheme(), "http" | "https") {
            bail!("backend url '{raw}' must use http or https");
        }
        if base.cannot_be_a_base() {
            return Err(anyhow!("backend url '{raw}' cannot be used as a base"));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn upload_url(&self) -> Url {
        self.route_url(upload_route(), None)
    }

    /// Where the backend serves a produced video, e.g. `<base>/output_videos/out.mp4`.
    pub fn output_video_url(&self, name: &str) -> Result<Url, TransportError> {
        let name = name.trim();
        if name.is_empty() || name == "." || name == ".." {
            return Err(TransportError::InvalidOutputName(name.to_string()));
        }
        Ok(self.route_url(output_videos_route(), Some(name)))
    }

    fn route_url(&self, route: &str, leaf: Option<&str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(route.split('/').filter(|segment| !segment.is_empty()));
            if let Some(leaf) = leaf {
                segments.push(leaf);
            }
        }
        url
    }
}

impl std::fmt::Display for BackendEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base)
    }
}
