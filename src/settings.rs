//! User settings: query endpoint, presign endpoint, model identifier.
//!
//! Loaded from storage at start, edited through a [`SettingsForm`], written
//! back wholesale on save. URLs are not validated; the pipelines only check
//! that the field they need is non-empty.

use anyhow::Result;

use crate::storage::{KeyValueStore, KEY_MODEL, KEY_PRESIGN_URL, KEY_QUERY_URL};

/// Model used until the user saves a different one.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub query_url: String,
    pub presign_url: String,
    pub model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            query_url: String::new(),
            presign_url: String::new(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Editable copy of the settings. Values are taken as typed and trimmed on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    pub query_url: String,
    pub presign_url: String,
    pub model: String,
}

impl Settings {
    pub async fn load(store: &dyn KeyValueStore) -> Result<Self> {
        let defaults = Settings::default();
        Ok(Self {
            query_url: store.get(KEY_QUERY_URL).await?.unwrap_or(defaults.query_url),
            presign_url: store
                .get(KEY_PRESIGN_URL)
                .await?
                .unwrap_or(defaults.presign_url),
            model: store.get(KEY_MODEL).await?.unwrap_or(defaults.model),
        })
    }

    pub async fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.set(KEY_QUERY_URL, &self.query_url).await?;
        store.set(KEY_PRESIGN_URL, &self.presign_url).await?;
        store.set(KEY_MODEL, &self.model).await?;
        Ok(())
    }

    pub fn to_form(&self) -> SettingsForm {
        SettingsForm {
            query_url: self.query_url.clone(),
            presign_url: self.presign_url.clone(),
            model: self.model.clone(),
        }
    }

    pub fn model_badge(&self) -> &str {
        model_badge(&self.model)
    }
}

impl SettingsForm {
    pub fn into_settings(self) -> Settings {
        Settings {
            query_url: self.query_url.trim().to_string(),
            presign_url: self.presign_url.trim().to_string(),
            model: self.model.trim().to_string(),
        }
    }
}

/// Model identifier without its version suffix, for display.
///
/// Cuts at the first `-YYYYMMDD` segment; failing that, drops a trailing
/// `-vN`, `-vN:N` or `-latest` segment.
///
/// ```
/// use askcorp::settings::model_badge;
/// assert_eq!(model_badge("claude-3-5-sonnet-20241022"), "claude-3-5-sonnet");
/// assert_eq!(model_badge("anthropic.claude-3-haiku-20240307-v1:0"), "anthropic.claude-3-haiku");
/// assert_eq!(model_badge("mistral-large-latest"), "mistral-large");
/// assert_eq!(model_badge("gpt-4o"), "gpt-4o");
/// ```
pub fn model_badge(model: &str) -> &str {
    let mut offset = 0;
    for segment in model.split('-') {
        if offset > 0 && is_date_segment(segment) {
            return &model[..offset - 1];
        }
        offset += segment.len() + 1;
    }

    if let Some((head, tail)) = model.rsplit_once('-') {
        if !head.is_empty() && (tail == "latest" || is_version_segment(tail)) {
            return head;
        }
    }

    model
}

fn is_date_segment(segment: &str) -> bool {
    segment.len() == 8 && segment.bytes().all(|b| b.is_ascii_digit())
}

fn is_version_segment(segment: &str) -> bool {
    let Some(rest) = segment.strip_prefix('v') else {
        return false;
    };
    let mut parts = rest.split(':');
    let major_ok = parts
        .next()
        .is_some_and(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
    let minor_ok = parts.all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
    major_ok && minor_ok
}
