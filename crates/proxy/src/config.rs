use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

pub const SETTINGS_FILE: &str = "proxy.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    /// Full URL of the backend's question endpoint.
    pub backend_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".into(),
            backend_url: "http://localhost:8000/ask-question".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the optional TOML file, then environment. Later sources win;
/// blank values never override.
pub(crate) fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = non_blank(file_cfg.get("bind_addr").cloned()) {
                    settings.bind_addr = v;
                }
                if let Some(v) = non_blank(file_cfg.get("backend_url").cloned()) {
                    settings.backend_url = v;
                }
            }
            Err(error) => {
                tracing::warn!(file = %file.display(), %error, "ignoring unreadable settings file");
            }
        }
    }

    for key in ["PROXY_BIND", "APP__BIND_ADDR"] {
        if let Some(v) = non_blank(env(key)) {
            settings.bind_addr = v;
        }
    }
    for key in ["PYTHON_BACKEND_URL", "APP__BACKEND_URL"] {
        if let Some(v) = non_blank(env(key)) {
            settings.backend_url = v;
        }
    }

    settings
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn parse_backend_url(raw: &str) -> anyhow::Result<Url> {
    Url::parse(raw).with_context(|| format!("invalid backend url '{raw}'"))
}

/// Origin the backend serves its static assets from, e.g. `http://host:8000/`.
pub fn asset_origin(backend_url: &Url) -> Url {
    let mut origin = backend_url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    origin
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
