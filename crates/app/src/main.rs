//! Storefront CLI

use std::{
    io::{self, Write},
    process::ExitCode,
};

use storefront::{engine::ReconciliationEngine, remote::InventoryRemote};
use storefront_app::{
    config::AppConfig,
    context::AppContext,
    observability,
    shell::{Shell, describe},
};
use tokio::io::BufReader;
use tracing::{error, info};

/// Storefront CLI entry point
#[tokio::main]
pub async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(error) => {
            // --help and --version are reported through the error path too
            _ = error.print();

            return if error.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(error) = observability::init(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for setup errors"
        )]
        {
            eprintln!("Logging error: {error}");
        }

        return ExitCode::FAILURE;
    }

    let AppContext { engine, shell } = match AppContext::from_config(&config) {
        Ok(context) => context,
        Err(init_error) => {
            error!(error = %describe(&init_error), "failed to start");

            return ExitCode::FAILURE;
        }
    };

    let mut stdout = io::stdout();

    if let Err(write_error) = load_catalog(&engine, &mut stdout).await {
        error!(error = %write_error, "failed to write to stdout");

        return ExitCode::FAILURE;
    }

    let mut shell = Shell::new(&engine, stdout, shell);

    match shell.run(BufReader::new(tokio::io::stdin())).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(shell_error) => {
            error!(error = %describe(&shell_error), "shell stopped");

            ExitCode::FAILURE
        }
    }
}

async fn load_catalog<R: InventoryRemote>(
    engine: &ReconciliationEngine<R>,
    out: &mut impl Write,
) -> io::Result<()> {
    match engine.load().await {
        Ok(count) => {
            info!(products = count, "catalog ready");
            writeln!(out, "Loaded {count} products.")
        }
        Err(load_error) => writeln!(
            out,
            "Could not load products: {}. Type `refresh` to try again.",
            describe(&load_error)
        ),
    }
}
