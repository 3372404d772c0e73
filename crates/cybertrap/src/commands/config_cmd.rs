//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, OAuthProfile, Profile};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Prompt(e.to_string())
}

fn non_empty(field: &str, value: &str) -> Result<String, CliError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "cannot be empty".into(),
        });
    }
    Ok(trimmed.to_owned())
}

fn http_url(field: &str, value: &str) -> Result<String, CliError> {
    let value = non_empty(field, value)?;
    match url::Url::parse(&value) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => Ok(value),
        _ => Err(CliError::Validation {
            field: field.into(),
            reason: format!("'{value}' is not an http(s) URL"),
        }),
    }
}

fn parse_secs(field: &str, value: &str) -> Result<u64, CliError> {
    value.trim().parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be a number (seconds)".into(),
    })
}

/// Copy of `cfg` with every secret masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(REDACTED.into());
        }
        if let Some(secret) = profile.oauth.as_mut().and_then(|o| o.client_secret.as_mut()) {
            REDACTED.clone_into(secret);
        }
    }
    cfg
}

fn describe(cfg: &Config) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "default_profile: {}",
        cfg.default_profile.as_deref().unwrap_or("(unset)")
    );
    let _ = writeln!(
        out,
        "defaults: output={} color={} timeout={}s page_size={}",
        cfg.defaults.output, cfg.defaults.color, cfg.defaults.timeout, cfg.defaults.page_size
    );
    for (name, p) in &cfg.profiles {
        let _ = writeln!(out, "\n[{name}]");
        let _ = writeln!(out, "  api_url:   {}", p.api_url);
        if let Some(t) = &p.token {
            let _ = writeln!(out, "  token:     {t}");
        }
        if let Some(env) = &p.token_env {
            let _ = writeln!(out, "  token_env: {env}");
        }
        if let Some(secs) = p.timeout {
            let _ = writeln!(out, "  timeout:   {secs}s");
        }
        if let Some(o) = &p.oauth {
            let _ = writeln!(out, "  oauth:     {} (client {})", o.domain, o.client_id);
        }
    }
    out.trim_end().to_owned()
}

fn init_wizard() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("cybertrap configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;
    let profile_name = non_empty("profile", &profile_name)?;

    let api_url: String = Input::new()
        .with_prompt("Backend URL")
        .default("http://localhost:8080".into())
        .interact_text()
        .map_err(prompt_err)?;
    let api_url = http_url("api_url", &api_url)?;

    let mut profile = Profile {
        api_url,
        ..Profile::default()
    };

    let token_choices = &[
        "Log in later with `cybertrap login` (hosted login)",
        "Paste a token and store it in the system keyring",
        "Paste a token and save it to the config file (plaintext)",
        "Read the token from an environment variable",
    ];
    let token_choice = Select::new()
        .with_prompt("How should the CLI get its bearer token?")
        .items(token_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    match token_choice {
        1 | 2 => {
            let token = rpassword::prompt_password("Token: ").map_err(prompt_err)?;
            let token = non_empty("token", &token)?;
            if token_choice == 1 {
                cybertrap_config::store_token(&profile_name, &token)?;
                eprintln!("   ✓ Token stored in system keyring");
            } else {
                profile.token = Some(token);
            }
        }
        3 => {
            let var: String = Input::new()
                .with_prompt("Environment variable name")
                .default("CYBERTRAP_TOKEN".into())
                .interact_text()
                .map_err(prompt_err)?;
            profile.token_env = Some(non_empty("token_env", &var)?);
        }
        _ => {}
    }

    if token_choice == 0 {
        let domain: String = Input::new()
            .with_prompt("Hosted login domain")
            .interact_text()
            .map_err(prompt_err)?;
        let client_id: String = Input::new()
            .with_prompt("OAuth client ID")
            .interact_text()
            .map_err(prompt_err)?;
        let redirect_uri: String = Input::new()
            .with_prompt("Redirect URI")
            .default("http://localhost:3000/callback".into())
            .interact_text()
            .map_err(prompt_err)?;
        profile.oauth = Some(OAuthProfile {
            domain: http_url("oauth.domain", &domain)?,
            client_id: non_empty("oauth.client_id", &client_id)?,
            client_secret: None,
            redirect_uri: non_empty("oauth.redirect_uri", &redirect_uri)?,
        });
    }

    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    let path = config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", path.display());
    eprintln!("  Active profile: {profile_name}");
    if token_choice == 0 {
        eprintln!("\n  Next: cybertrap login");
    } else {
        eprintln!("\n  Test it: cybertrap domains list");
    }
    Ok(())
}

fn set_key(profile: &mut Profile, key: &str, value: &str) -> Result<(), CliError> {
    match key {
        "api_url" | "api-url" => profile.api_url = http_url("api_url", value)?,
        "token" => profile.token = Some(non_empty("token", value)?),
        "token_env" | "token-env" => profile.token_env = Some(non_empty("token_env", value)?),
        "timeout" => profile.timeout = Some(parse_secs("timeout", value)?),
        k if k.starts_with("oauth.") => {
            let oauth = profile.oauth.get_or_insert_with(OAuthProfile::default);
            match k.trim_start_matches("oauth.") {
                "domain" => oauth.domain = http_url("oauth.domain", value)?,
                "client_id" | "client-id" => {
                    oauth.client_id = non_empty("oauth.client_id", value)?;
                }
                "client_secret" | "client-secret" => {
                    oauth.client_secret = Some(non_empty("oauth.client_secret", value)?);
                }
                "redirect_uri" | "redirect-uri" => {
                    oauth.redirect_uri = non_empty("oauth.redirect_uri", value)?;
                }
                other => {
                    return Err(CliError::Validation {
                        field: key.into(),
                        reason: format!(
                            "unknown oauth key '{other}'. Valid keys: domain, client_id, \
                             client_secret, redirect_uri"
                        ),
                    });
                }
            }
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: api_url, token, token_env, \
                     timeout, oauth.domain, oauth.client_id, oauth.client_secret, \
                     oauth.redirect_uri"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init_wizard(),

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(global.output, &cfg, describe, |c| {
                c.profiles.keys().cloned().collect::<Vec<_>>().join("\n")
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_key(profile, &key, &value)?;
            config::save_config(&cfg)?;
            output::print_success(
                &format!("Set {key} on profile '{profile_name}'"),
                global.quiet,
                global.color,
            );
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: cybertrap config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::print_success(
                &format!("Default profile set to '{name}'"),
                global.quiet,
                global.color,
            );
            Ok(())
        }

        ConfigCommand::SetToken => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let token = rpassword::prompt_password(format!("Token for '{profile_name}': "))
                .map_err(prompt_err)?;
            let token = non_empty("token", &token)?;
            cybertrap_config::store_token(&profile_name, &token)?;
            output::print_success(
                &format!("Token stored in system keyring for '{profile_name}'"),
                global.quiet,
                global.color,
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn set_key_updates_profile_and_oauth() {
        let mut p = Profile::default();
        set_key(&mut p, "api_url", "https://api.example.com").unwrap();
        set_key(&mut p, "timeout", "45").unwrap();
        set_key(&mut p, "oauth.client_id", "abc").unwrap();
        assert_eq!(p.api_url, "https://api.example.com");
        assert_eq!(p.timeout, Some(45));
        assert_eq!(p.oauth.unwrap().client_id, "abc");
    }

    #[test]
    fn set_key_rejects_unknown_and_bad_values() {
        let mut p = Profile::default();
        assert!(set_key(&mut p, "colour", "x").is_err());
        assert!(set_key(&mut p, "api_url", "ftp://x").is_err());
        assert!(set_key(&mut p, "timeout", "soon").is_err());
        assert!(set_key(&mut p, "oauth.scope", "x").is_err());
    }

    #[test]
    fn show_masks_secrets() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                api_url: "https://api.example.com".into(),
                token: Some("secret-token".into()),
                oauth: Some(OAuthProfile {
                    client_secret: Some("shh".into()),
                    ..OAuthProfile::default()
                }),
                ..Profile::default()
            },
        );
        let masked = redacted(&cfg);
        let text = describe(&masked);
        assert!(!text.contains("secret-token"));
        let p = &masked.profiles["default"];
        assert_eq!(p.token.as_deref(), Some(REDACTED));
        assert_eq!(
            p.oauth.as_ref().unwrap().client_secret.as_deref(),
            Some(REDACTED)
        );
    }
}
