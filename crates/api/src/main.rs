//! `tunequiz` command-line entry point

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;
use tunequiz_app::commands::{
    auth_refresh, auth_set_refresh_token, auth_status, list_tracks, play,
};
use tunequiz_app::utils::logging::{init_telemetry, log_command_failure};
use tunequiz_app::{user_message, AppContext, AppResult};

#[derive(Parser)]
#[command(name = "tunequiz", version, about = "Spotify playlist guessing game")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Configuration file (TOML or JSON)
    #[arg(long, global = true, env = "TUNEQUIZ_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or repair the Spotify credentials
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// List the playable tracks of a playlist
    Tracks {
        /// Spotify playlist ID
        playlist_id: String,
    },
    /// Play a guessing round from a playlist
    Play {
        /// Spotify playlist ID
        playlist_id: String,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Show the credential state without contacting Spotify
    Status,
    /// Refresh the access token now
    Refresh,
    /// Save a refresh token obtained from a new authorization
    SetRefreshToken {
        /// The refresh token
        token: String,
    },
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = tunequiz_infra::config::load(cli.config)?;
    let ctx = AppContext::new(config).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Auth { action: AuthAction::Status } => auth_status(&ctx, &mut out),
        Commands::Auth { action: AuthAction::Refresh } => auth_refresh(&ctx, &mut out).await,
        Commands::Auth { action: AuthAction::SetRefreshToken { token } } => {
            auth_set_refresh_token(&ctx, &token, &mut out).await
        }
        Commands::Tracks { playlist_id } => list_tracks(&ctx, &playlist_id, &mut out).await,
        Commands::Play { playlist_id } => {
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            play(&ctx, &playlist_id, input, &mut out).await
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli.log_level, cli.json_logs)?;

    info!(version = env!("CARGO_PKG_VERSION"), "tunequiz starting");

    match run(cli).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            log_command_failure(&err);
            let mut stderr = std::io::stderr().lock();
            writeln!(stderr, "{}", user_message(&err))?;
            Ok(ExitCode::FAILURE)
        }
    }
}
