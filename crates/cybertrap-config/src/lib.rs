//! Shared configuration for the cybertrap CLI and TUI.
//!
//! TOML profiles, token resolution (env + keyring + plaintext), and
//! translation to `cybertrap_core::ClientConfig`. The CLI layers its
//! global flags on top of this.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use cybertrap_api::OAuthSettings;
use cybertrap_core::ClientConfig;

/// Keyring service name shared by every profile.
pub const KEYRING_SERVICE: &str = "cybertrap";

/// Env var consulted before any profile setting.
pub const TOKEN_ENV: &str = "CYBERTRAP_TOKEN";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("no token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' has no [oauth] section")]
    NoOAuth { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// `requested`, else `default_profile`, else `"default"`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Rows per page on table views.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> usize {
    cybertrap_core::view::DEFAULT_PAGE_SIZE
}

/// A named backend profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g., "https://api.example.com").
    pub api_url: String,

    /// Bearer token (plaintext -- prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable name containing the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Override the default timeout, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth: Option<OAuthProfile>,
}

/// Hosted-login settings for `cybertrap login`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OAuthProfile {
    pub domain: String,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub redirect_uri: String,
}

impl Profile {
    pub fn url(&self) -> Result<Url, ConfigError> {
        parse_url("api_url", &self.api_url)
    }

    pub fn timeout(&self, defaults: &Defaults) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(defaults.timeout))
    }

    pub fn oauth_settings(&self, profile_name: &str) -> Result<OAuthSettings, ConfigError> {
        let oauth = self.oauth.as_ref().ok_or_else(|| ConfigError::NoOAuth {
            profile: profile_name.into(),
        })?;
        if oauth.client_id.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "oauth.client_id".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(OAuthSettings {
            domain: parse_url("oauth.domain", &oauth.domain)?,
            client_id: oauth.client_id.clone(),
            client_secret: oauth.client_secret.clone().map(SecretString::from),
            redirect_uri: oauth.redirect_uri.clone(),
        })
    }
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("expected an http(s) URL, got '{raw}'"),
        });
    }
    Ok(url)
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "cybertrap").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("cybertrap");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` merged over defaults, then `CYBERTRAP_` env vars.
///
/// Nested keys use a double underscore:
/// `CYBERTRAP_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CYBERTRAP_").ignore(&["TOKEN"]).split("__"));

    Ok(figment.extract()?)
}

/// Load config, returning a default if the file is missing or broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/token"),
    )?)
}

/// Resolve the bearer token: `CYBERTRAP_TOKEN` → profile `token_env` →
/// keyring → plaintext `token`.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_token_with(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        |name| keyring_entry(name).ok()?.get_password().ok(),
    )
}

/// [`resolve_token`] with injectable env and keyring lookups.
pub fn resolve_token_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    let non_empty = |v: String| (!v.trim().is_empty()).then(|| v.trim().to_owned());

    if let Some(token) = env(TOKEN_ENV).and_then(non_empty) {
        debug!("token from {TOKEN_ENV}");
        return Ok(SecretString::from(token));
    }

    if let Some(token) = profile
        .token_env
        .as_deref()
        .and_then(&env)
        .and_then(non_empty)
    {
        debug!("token from profile token_env");
        return Ok(SecretString::from(token));
    }

    if let Some(token) = keyring(profile_name).and_then(non_empty) {
        debug!("token from keyring");
        return Ok(SecretString::from(token));
    }

    if let Some(token) = profile.token.clone().and_then(non_empty) {
        debug!("token from plaintext config");
        return Ok(SecretString::from(token));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store `token` in the OS keyring for `profile_name`.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token)?;
    Ok(())
}

/// Remove the keyring entry. Returns `false` if there was none.
pub fn delete_token(profile_name: &str) -> Result<bool, ConfigError> {
    match keyring_entry(profile_name)?.delete_credential() {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

// ── Translation to core config ──────────────────────────────────────

/// Build a `ClientConfig` from a profile with no flag overrides.
pub fn profile_to_client_config(
    config: &Config,
    profile: &Profile,
    profile_name: &str,
) -> Result<ClientConfig, ConfigError> {
    let mut client = ClientConfig::new(profile.url()?)
        .with_token(resolve_token(profile, profile_name)?)
        .with_timeout(profile.timeout(&config.defaults));
    client.page_size = config.defaults.page_size.max(1);
    Ok(client)
}
