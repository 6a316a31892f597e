use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_FORM_ENDPOINT: &str = "http://localhost:3000/send-email";
pub const DEFAULT_TOAST_DISMISS_MS: u64 = 5000;
const SETTINGS_FILE: &str = "site.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub form_endpoint: String,
    pub toast_dismiss_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            form_endpoint: DEFAULT_FORM_ENDPOINT.into(),
            toast_dismiss_ms: DEFAULT_TOAST_DISMISS_MS,
        }
    }
}

impl Settings {
    pub fn toast_dismiss_delay(&self) -> Duration {
        Duration::from_millis(self.toast_dismiss_ms)
    }

    pub fn endpoint_url(&self) -> Result<Url, ClientError> {
        let url = Url::parse(self.form_endpoint.trim()).map_err(|source| {
            ClientError::InvalidEndpoint {
                endpoint: self.form_endpoint.clone(),
                source,
            }
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ClientError::UnsupportedScheme(scheme.to_string())),
        }
    }
}

/// Defaults, then `site.toml` in the working directory, then environment.
pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE))
}

pub fn load_settings_from(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw);
    }
    apply_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let table = match toml::from_str::<toml::Table>(raw) {
        Ok(table) => table,
        Err(err) => {
            warn!("ignoring malformed settings file: {err}");
            return;
        }
    };

    if let Some(v) = table.get("form_endpoint").and_then(|v| v.as_str()) {
        settings.form_endpoint = v.to_string();
    }
    if let Some(v) = table.get("toast_dismiss_ms").and_then(|v| v.as_integer()) {
        match u64::try_from(v) {
            Ok(ms) => settings.toast_dismiss_ms = ms,
            Err(_) => warn!("ignoring negative toast_dismiss_ms={v}"),
        }
    }
}

pub(crate) fn apply_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("FORM_ENDPOINT") {
        settings.form_endpoint = v;
    }
    if let Some(v) = lookup("APP__FORM_ENDPOINT") {
        settings.form_endpoint = v;
    }

    if let Some(v) = lookup("APP__TOAST_DISMISS_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.toast_dismiss_ms = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
