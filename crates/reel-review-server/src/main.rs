use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::eyre;
use commands::{config, serve, token};
use reel_review_config::{Config, PathManager};
use std::path::PathBuf;

mod commands;
mod http;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "reel-review")]
#[command(about = "reel-review - movie reviews backed by TMDB")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    #[command(long_about = "Serve the /movies and /reviews REST API. TMDB_API_KEY, JWT_SECRET and PORT override the config file.")]
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides server.port and PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Keep reviews and movies in memory only
        #[arg(long, action = ArgAction::SetTrue)]
        in_memory: bool,

        /// Write logs to the default log file when logging.file is not set
        #[arg(long, action = ArgAction::SetTrue)]
        log_to_file: bool,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Mint a bearer token for local testing
    #[command(long_about = "Sign a bearer token with the configured JWT secret. The token carries the given user id and username, exactly as the sign-in service would issue it.")]
    Token {
        /// User id placed in the token payload
        #[arg(long)]
        user_id: String,

        /// Username placed in the token payload
        #[arg(long)]
        username: String,

        /// Expiry in hours; omit for a token without expiry
        #[arg(long)]
        expires_in_hours: Option<i64>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks secrets)
    Show {
        /// Show secrets unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let paths = PathManager::default();
    let config_path = cli.config.clone().unwrap_or_else(|| paths.config_file());
    let config = Config::load_or_default(&config_path)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_path.display(), e))?;
    let paths = match &config.storage.data_dir {
        Some(dir) => paths.with_data_dir(dir.clone()),
        None => paths,
    };

    // Only the server writes to the log file; one-shot commands log to stderr
    let log_file = match cli.command {
        Commands::Serve { log_to_file, .. } => config
            .logging
            .file
            .clone()
            .or_else(|| log_to_file.then(|| paths.server_log_file())),
        _ => None,
    };
    logging::init_logging_with_file(
        cli.verbose,
        cli.quiet,
        &config.logging.level,
        config.logging.json,
        log_file,
    )
    .map_err(|e| eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Serve { host, port, in_memory, .. } => {
            serve::run_serve(config, paths, host, port, in_memory, &output).await
        }
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show { full } => config::show_config(&config, &config_path, &paths, full, &output),
            ConfigCommands::Init { force } => config::init_config(&config_path, force, &output),
        },
        Commands::Token {
            user_id,
            username,
            expires_in_hours,
        } => token::run_token(&config, user_id, username, expires_in_hours, &output),
    }
}
