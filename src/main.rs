use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use datesync_auth::{GoogleOAuth2Provider, SecureStorage};
use datesync_calendar::{CalendarClient, GoogleCalendarGateway};
use datesync_core::{dates, sync, CalendarGateway, Config, DryRun, EntrySource};
use datesync_sheets::{SheetsClient, SheetsSource};

#[derive(Parser)]
#[command(name = "datesync")]
#[command(about = "Sync spreadsheet birthdays and anniversaries into yearly calendar events")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Read everything but only log the events that would be created
    #[arg(long)]
    dry_run: bool,

    /// Config file (defaults to ~/.config/datesync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize Google Calendar and Sheets access in the browser
    Auth,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    datesync_core::init()?;

    match cli.command {
        Some(Commands::Auth) => auth(cli.config.as_deref()).await,
        None => run_sync(cli.config.as_deref(), cli.dry_run).await,
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn oauth_provider(config: &Config) -> Option<GoogleOAuth2Provider> {
    config.google.is_configured().then(|| {
        GoogleOAuth2Provider::new(
            config.google.client_id.clone(),
            config.google.client_secret.clone(),
        )
    })
}

async fn auth(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let provider = oauth_provider(&config).context(
        "Google OAuth client is not configured; \
         set [google] client_id and client_secret in the config file",
    )?;
    let storage = SecureStorage::default_location()?;

    datesync_auth::authenticate(&provider, &storage).await?;
    println!("Authorized. Tokens saved under {}", storage.dir().display());
    Ok(())
}

async fn run_sync(config_path: Option<&Path>, dry_run: bool) -> Result<()> {
    let config = Config::load_validated(config_path)?;
    let storage = SecureStorage::default_location()?;
    let provider = oauth_provider(&config);
    let access_token = datesync_auth::resolve_access_token(&storage, provider.as_ref()).await?;

    let sheets = SheetsClient::with_base_url(&access_token, &config.api.sheets_base_url)?;
    let source = SheetsSource::new(sheets, config.spreadsheet_id.clone(), config.sort_on_read);

    let calendar = CalendarClient::with_base_url(&access_token, &config.api.calendar_base_url)?;
    let gateway = GoogleCalendarGateway::new(calendar, config.calendar_id.clone());

    if dry_run {
        tracing::info!("Dry run: no events will be created");
        sync_with(&source, &DryRun::new(gateway), &config).await
    } else {
        sync_with(&source, &gateway, &config).await
    }
}

async fn sync_with<S, G>(source: &S, gateway: &G, config: &Config) -> Result<()>
where
    S: EntrySource,
    G: CalendarGateway,
{
    let year = dates::current_year();
    tracing::info!(
        "Syncing spreadsheet {} into {} for {}",
        config.spreadsheet_id,
        config.calendar_id,
        year
    );

    let report = match sync::run(source, gateway, &config.source_specs(), year).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("{}", e.user_message());
            return Err(e.into());
        }
    };

    let total = report.total();
    tracing::info!(
        "Sync finished: {} created, {} already present, {} failed ({} events found for {})",
        total.created,
        total.skipped,
        total.failed,
        report.existing,
        year
    );

    if total.failed > 0 {
        tracing::warn!(
            "{} events could not be created; they will be retried on the next run",
            total.failed
        );
    }

    Ok(())
}
