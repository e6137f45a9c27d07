//! playgen CLI Binary
//!
//! Appends generated interactive playgrounds to the lesson documents of one section.

use clap::Parser;
use playgen::cli::{map_error, Cli, RunContext};
use playgen::config::ConfigLoader;
use playgen::logging::{init_logging, LoggingConfig};
use std::process;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// First interrupt stops new documents and retries; a second one exits at once.
async fn watch_interrupts(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    warn!("Interrupt received, finishing the current attempt");
    cancel.cancel();

    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("Second interrupt received, exiting without waiting");
        process::exit(1);
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let logging_config = build_logging_config(&cli);

    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("playgen starting");

    let context = match RunContext::new(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error initializing run: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            eprintln!("Failed to create tokio runtime: {}", e);
            process::exit(1);
        }
    };

    let cancel = CancellationToken::new();
    let result = runtime.block_on(async {
        tokio::spawn(watch_interrupts(cancel.clone()));
        context.execute(cancel.clone()).await
    });

    // Per-document failures are part of the report, not an error exit.
    match result {
        Ok(output) => {
            info!("Run completed");
            println!("{}", output);
        }
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(&cli.target)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    }

    config
}
