//! eulaw-report command-line tool
//!
//! Exports EU case law reports and manages filter presets.
//!
//! # Usage
//!
//! ```bash
//! # Export a PDF report
//! eulaw-report export --input report.json --format pdf --output-dir reports
//!
//! # List report templates
//! eulaw-report templates --category analytical
//! ```

use tracing::Level;

use eulaw_report::Result;
use eulaw_report::cli::CliInterface;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments
/// 2. Load configuration
/// 3. Initialize logging
/// 4. Run the selected command
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    cli.handle_command().await
}

/// Initialize logging system based on verbosity level
///
/// # Arguments
/// * `cli` - CLI interface with verbosity settings
fn initialize_logging(cli: &CliInterface) {
    let level = if cli.args().very_verbose {
        Level::TRACE
    } else if cli.args().verbose {
        Level::DEBUG
    } else {
        cli.config().logging.level.to_tracing_level()
    };

    // stdout is reserved for command output
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
