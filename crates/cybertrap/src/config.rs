//! CLI configuration: thin wrapper around `cybertrap_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (`--api-url`, `--token`, `--timeout`).

use std::time::Duration;

use secrecy::SecretString;

use cybertrap_config::ConfigError;
use cybertrap_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use cybertrap_config::{
    Config, OAuthProfile, Profile, config_path, load_config_or_default, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Profiles as a comma-separated list, for "not found" hints.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Build a `ClientConfig` from the config file, active profile and flags.
///
/// Flags win over profile values. Without a profile, `--api-url` and a
/// token from `--token`/`CYBERTRAP_TOKEN` are enough.
pub fn resolve_client_config(
    global: &GlobalOpts,
    config: &Config,
) -> Result<ClientConfig, CliError> {
    let profile_name = active_profile_name(global, config);
    let profile = config.profiles.get(&profile_name);

    let url_str = match (global.api_url.as_deref(), profile) {
        (Some(url), _) => url.to_owned(),
        (None, Some(p)) => p.api_url.clone(),
        (None, None) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(config),
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };
    let url: url::Url = url_str.trim().parse().map_err(|_| CliError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let token = match (global.token.as_deref(), profile) {
        (Some(t), _) if !t.trim().is_empty() => SecretString::from(t.trim().to_owned()),
        (_, Some(p)) => cybertrap_config::resolve_token(p, &profile_name).map_err(|e| match e {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            other => CliError::Config(other),
        })?,
        (_, None) => {
            return Err(CliError::NoCredentials {
                profile: profile_name,
            });
        }
    };

    let timeout = global.timeout.map_or_else(
        || {
            profile.map_or(Duration::from_secs(config.defaults.timeout), |p| {
                p.timeout(&config.defaults)
            })
        },
        Duration::from_secs,
    );

    let mut client = ClientConfig::new(url)
        .with_token(token)
        .with_timeout(timeout);
    client.page_size = config.defaults.page_size.max(1);
    Ok(client)
}
