mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cybertrap_core::Controller;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Local commands: no backend session needed
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),
        Command::Login(args) => commands::login::login(args, &cli.global).await,
        Command::Logout => commands::login::logout(&cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "cybertrap", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = config::load_config_or_default();
            let profile = config::active_profile_name(&cli.global, &cfg);
            let client_config = config::resolve_client_config(&cli.global, &cfg)?;
            let controller =
                Controller::new(client_config).map_err(|e| CliError::from_core(e, &profile))?;

            tracing::debug!(command = ?cmd, %profile, "dispatching command");
            let result = commands::dispatch(cmd, &controller, &cli.global).await;
            controller.shutdown();
            result.map_err(|e| match e {
                CliError::SessionExpired { .. } => CliError::SessionExpired { profile },
                CliError::AuthFailed { message, .. } => CliError::AuthFailed { profile, message },
                other => other,
            })
        }
    }
}
