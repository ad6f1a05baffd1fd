mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bambou::{DynamicRoot, Session, SessionContext};

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
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli { mut global, command } = cli;

    match command {
        // Config commands don't need a VSD connection
        Command::Config(args) => commands::config_cmd::handle(args, &global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "bambou", &mut std::io::stdout());
            Ok(())
        }

        // Everything else authenticates first
        cmd => {
            let cfg = config::load_config()?;
            global.output = Some(config::resolve_output(&global, &cfg)?);
            let session_config = config::resolve_session_config(&global, &cfg)?;
            let url = session_config.url.to_string();
            let timeout = session_config.timeout.as_secs();

            let session = Session::new(session_config, DynamicRoot::default())?;
            let context: SessionContext<commands::VsdSession> = SessionContext::new();
            context
                .start(Arc::new(session))
                .await
                .map_err(|e| CliError::from_session(e, &url, timeout))?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &context, &global).await;
            context.reset().await;
            result
        }
    }
}
