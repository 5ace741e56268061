//! nsapi command-line tool
//!
//! Sends shard requests, streams data dumps and obtains autologin
//! credentials, all through one rate-limited client.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// Import CLI modules through the library
use nsapi::cli::{handle_autologin, handle_dump, handle_init, handle_shard, Cli, Commands};
use nsapi::config::{AppConfig, LoggingConfig};
use nsapi::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();
    if let Commands::Init = cli.command {
        init_logging(&cli, &LoggingConfig::default());
        return handle_init(&cli.global).await;
    }

    let config = AppConfig::load(cli.global.config.clone()).await?;
    init_logging(&cli, &config.logging);

    info!("nsapi v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Shard(args) => {
            info!("Executing shard command");
            handle_shard(&cli.global, &config, args).await
        }
        Commands::Dump(args) => {
            info!("Executing dump command");
            handle_dump(&cli.global, &config, args).await
        }
        Commands::Autologin(args) => {
            info!("Executing autologin command");
            handle_autologin(&cli.global, &config, args).await
        }
        Commands::Init => handle_init(&cli.global).await,
    }
}

/// Initialize logging from the CLI flags, falling back to the configured level
fn init_logging(cli: &Cli, logging: &LoggingConfig) {
    let global = &cli.global;
    let log_level = if global.quiet || global.verbose || global.very_verbose {
        cli.log_level().to_string().to_lowercase()
    } else {
        logging.level.clone()
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("nsapi={}", log_level).parse() {
        filter = filter.add_directive(directive);
    }

    // Logs go to stderr so command output stays pipeable
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(logging.show_target)
        .with_level(cli.global.very_verbose)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
