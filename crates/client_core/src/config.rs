use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use shared::domain::{CaptionOption, CaptionTable, LanguageCode, DEFAULT_LANGUAGE_CODE};
use tracing::warn;

use crate::endpoint::BackendEndpoint;

pub const CONFIG_FILE: &str = "client.toml";
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub backend_url: String,
    /// Empty means no language is preselected.
    pub language: String,
    pub caption_option: String,
    pub caption_excluded_languages: Vec<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            language: DEFAULT_LANGUAGE_CODE.into(),
            caption_option: CaptionOption::None.form_value().into(),
            caption_excluded_languages: Vec::new(),
        }
    }
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

/// File values override defaults, environment values override the file.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("backend_url") {
                    settings.backend_url = v.clone();
                }
                if let Some(v) = file_cfg.get("language") {
                    settings.language = v.clone();
                }
                if let Some(v) = file_cfg.get("caption_option") {
                    settings.caption_option = v.clone();
                }
                if let Some(v) = file_cfg.get("caption_excluded_languages") {
                    settings.caption_excluded_languages = split_codes(v);
                }
            }
            Err(err) => warn!(path = %path.display(), error = %err, "ignoring malformed settings file"),
        }
    }

    if let Some(v) = env("VIDTRANSLATE_BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Some(v) = env("APP__BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Some(v) = env("APP__LANGUAGE") {
        settings.language = v;
    }
    if let Some(v) = env("APP__CAPTION_OPTION") {
        settings.caption_option = v;
    }
    if let Some(v) = env("APP__CAPTION_EXCLUDED_LANGUAGES") {
        settings.caption_excluded_languages = split_codes(&v);
    }

    settings
}

fn split_codes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

impl ClientSettings {
    pub fn endpoint(&self) -> Result<BackendEndpoint> {
        BackendEndpoint::parse(&self.backend_url)
    }

    pub fn default_language(&self) -> Result<Option<LanguageCode>> {
        if self.language.trim().is_empty() {
            return Ok(None);
        }
        let code = LanguageCode::parse(&self.language).context("invalid default language")?;
        Ok(Some(code))
    }

    pub fn caption_table(&self) -> Result<CaptionTable> {
        let excluded = self
            .caption_excluded_languages
            .iter()
            .map(|code| LanguageCode::parse(code))
            .collect::<Result<Vec<_>, _>>()
            .context("invalid caption_excluded_languages entry")?;
        Ok(CaptionTable::excluding(&excluded))
    }

    pub fn default_caption_option(&self) -> Result<CaptionOption> {
        let table = self.caption_table()?;
        table
            .parse(&self.caption_option)
            .context("invalid default caption option")
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
