//! `cybertrap-tui`: terminal front end for CyberTrap scan management.
//!
//! Three screens, switched with 1-3: Targets (domains and templates,
//! start scans), Scans (status, groups, result links) and Schedule.
//! Each screen fetches what it shows when it is mounted; a background
//! bridge streams store changes and mutation notifications into the
//! action loop.
//!
//! Logs go to a daily-rolling file so they never touch the terminal.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use directories::ProjectDirs;
use secrecy::SecretString;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cybertrap_config::{Config, config_path, load_config};
use cybertrap_core::{ClientConfig, Controller};

use crate::app::App;

/// Terminal UI for managing CyberTrap domains, scans and schedules.
#[derive(Parser, Debug)]
#[command(name = "cybertrap-tui", version, about)]
struct Cli {
    /// Profile from the config file
    #[arg(short, long, env = "CYBERTRAP_PROFILE")]
    profile: Option<String>,

    /// Backend URL, overriding the profile
    #[arg(long, env = "CYBERTRAP_API_URL")]
    api_url: Option<String>,

    /// Bearer token, overriding the profile
    #[arg(long, env = "CYBERTRAP_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Directory for log files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn default_log_dir() -> PathBuf {
    ProjectDirs::from("", "", "cybertrap").map_or_else(
        || std::env::temp_dir().join("cybertrap"),
        |dirs| dirs.data_local_dir().join("logs"),
    )
}

/// File-only tracing. The guard must live as long as the app so the
/// non-blocking writer flushes.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("cybertrap_tui={level},cybertrap_core={level}"))
    });

    let log_dir = cli.log_dir.clone().unwrap_or_else(default_log_dir);
    let appender = tracing_appender::rolling::daily(log_dir, "cybertrap-tui.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// Flags over profile values, as in the CLI.
fn resolve_client_config(cli: &Cli, config: &Config) -> Result<ClientConfig> {
    let profile_name = config.active_profile_name(cli.profile.as_deref());
    let profile = config.profiles.get(&profile_name);

    let url = match (cli.api_url.as_deref(), profile) {
        (Some(raw), _) => raw
            .trim()
            .parse::<url::Url>()
            .wrap_err_with(|| format!("invalid --api-url {raw:?}"))?,
        (None, Some(p)) => p.url()?,
        (None, None) if cli.profile.is_some() => {
            return Err(eyre!("profile '{profile_name}' not found"));
        }
        (None, None) => {
            return Err(eyre!(
                "no configuration at {}; run `cybertrap config init` or pass --api-url",
                config_path().display()
            ));
        }
    };

    let token = match (cli.token.as_deref(), profile) {
        (Some(t), _) if !t.trim().is_empty() => SecretString::from(t.trim().to_owned()),
        (_, Some(p)) => cybertrap_config::resolve_token(p, &profile_name)?,
        (_, None) => return Err(eyre!("no token: pass --token or set CYBERTRAP_TOKEN")),
    };

    let timeout = profile.map_or(Duration::from_secs(config.defaults.timeout), |p| {
        p.timeout(&config.defaults)
    });

    let mut client = ClientConfig::new(url)
        .with_token(token)
        .with_timeout(timeout);
    client.page_size = config.defaults.page_size.max(1);
    Ok(client)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    let config = load_config()?;
    let client = resolve_client_config(&cli, &config)?;
    info!(url = %client.url, page_size = client.page_size, "starting cybertrap-tui");

    let controller = Controller::new(client)?;
    App::new(controller).run().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("cybertrap-tui").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_are_enough_without_a_profile() {
        let cli = cli(&["--api-url", "http://127.0.0.1:8080", "--token", " abc "]);
        let client = resolve_client_config(&cli, &Config::default()).unwrap();
        assert_eq!(client.url.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(client.token.unwrap().expose_secret(), "abc");
    }

    #[test]
    fn missing_config_points_at_config_init() {
        let cli = cli(&[]);
        let err = resolve_client_config(&cli, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("config init"));
    }

    #[test]
    fn unknown_profile_is_named() {
        let cli = cli(&["--profile", "ghost"]);
        let err = resolve_client_config(&cli, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }
}
