//! Pantry Control - CLI client for the pantry server
//!
//! Catalog, stock, locations, photos and recipes from the terminal.

use anyhow::Result;
use clap::Parser;
use pantry_common::config::{config_path, PantryConfig};
use pantry_common::error::PantryError;
use pantry_common::prompt::{AssumeYes, Prompter};
use pantryctl::cli::Cli;
use pantryctl::client::HttpPantryApi;
use pantryctl::commands::{self, Context};
use pantryctl::errors::{exit_code_for, EXIT_SUCCESS};
use pantryctl::prompt::TerminalPrompter;
use pantryctl::{logging, output};
use std::sync::Arc;
use tracing::{debug, Instrument};
use uuid::Uuid;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            if let Some(err) = e.downcast_ref::<PantryError>() {
                debug!(code = err.code(), "Command failed");
            }
            output::display_error(&format!("{:#}", e));
            exit_code_for(&e)
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<()> {
    let config = PantryConfig::load(cli.config.as_deref())?.with_server(cli.server.as_deref());
    logging::init(&config.log.level);

    match config_path(cli.config.as_deref()) {
        Some(path) => debug!("Config: {}", path.display()),
        None => debug!("No config directory; using defaults"),
    }

    let span = tracing::info_span!("pantryctl", invocation = %Uuid::new_v4());
    let api = Arc::new(HttpPantryApi::new(&config.server)?);
    let prompter: Arc<dyn Prompter> = if cli.yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(TerminalPrompter)
    };
    debug!("Server: {}", api.base_url());

    let mut ctx = Context::new(api, prompter, config);
    commands::run(&mut ctx, cli.command).instrument(span).await
}
