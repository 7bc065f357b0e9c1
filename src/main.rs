//! strand - An extensible, event-driven text editor
//!
//! This is the main entry point. It parses CLI arguments, builds the
//! configuration, sets up logging and runs the terminal editor.

use strand::{cli, config, run, user_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let cli = cli::Cli::parse()?;
    if cli.help {
        println!("{}", cli::USAGE);
        return Ok(());
    }

    // Load configuration
    let mut config = config::Config::default();
    user_config::configure(&mut config);

    // Apply CLI overrides
    cli.apply_to_config(&mut config);

    let _log_guard = run::init_logging(&config)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "strand starting");

    if let Err(e) = run::run_terminal_mode(&cli.files, &config) {
        tracing::error!(error = %e, "terminal mode failed");
        return Err(e.into());
    }
    Ok(())
}
