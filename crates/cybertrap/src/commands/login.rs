//! Hosted login and logout.

use std::time::Duration;

use dialoguer::Input;
use secrecy::ExposeSecret;

use cybertrap_api::TransportConfig;
use cybertrap_api::auth::{authorize_url, exchange_code};
use cybertrap_core::CoreError;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

pub async fn login(args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);
    let profile = cfg
        .profiles
        .get(&profile_name)
        .ok_or_else(|| CliError::ProfileNotFound {
            name: profile_name.clone(),
            available: config::available_profiles(&cfg),
        })?;
    let settings = profile.oauth_settings(&profile_name)?;

    let code = if let Some(code) = args.code {
        code
    } else {
        let url = authorize_url(&settings)
            .map_err(|e| CliError::from_core(CoreError::from(e), &profile_name))?;
        eprintln!("Open this URL in a browser and sign in:\n\n  {url}\n");
        eprintln!("Then paste the `code` parameter from the redirect URL.");
        Input::<String>::new()
            .with_prompt("Authorization code")
            .interact_text()
            .map_err(|e| CliError::Prompt(e.to_string()))?
    };

    let timeout = global
        .timeout
        .map_or_else(|| profile.timeout(&cfg.defaults), Duration::from_secs);
    let transport = TransportConfig::default().with_timeout(timeout);
    let tokens = exchange_code(&settings, &code, &transport)
        .await
        .map_err(|e| CliError::from_core(CoreError::from(e), &profile_name))?;

    cybertrap_config::store_token(&profile_name, tokens.access_token.expose_secret())?;
    tracing::info!(profile = %profile_name, expires_in = ?tokens.expires_in, "stored access token");
    output::print_success(
        &format!("Logged in; token stored for profile '{profile_name}'"),
        global.quiet,
        global.color,
    );
    Ok(())
}

pub fn logout(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);
    if cybertrap_config::delete_token(&profile_name)? {
        output::print_success(
            &format!("Removed stored token for '{profile_name}'"),
            global.quiet,
            global.color,
        );
    } else {
        output::print_note(
            &format!("No stored token for '{profile_name}'"),
            global.quiet,
            global.color,
        );
    }
    Ok(())
}
