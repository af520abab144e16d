mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lastfm_provider::{LastFmClient, ServiceCredentials};
use nowplaying_core::{
    init_logging, AppDirs, Config, CredentialStore, MusicService, Period, RecentTrackEntry,
    RequestParameters, SecretsError,
};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Keyring namespace for the Last.fm API key.
const KEY_SERVICE: &str = "lastfm";

#[derive(Debug, Parser)]
#[command(name = "nowplaying", version, about = "Last.fm listening data from the terminal")]
struct Cli {
    /// Username to query (takes precedence over config)
    #[arg(long, global = true)]
    user: Option<String>,
    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(flatten)]
    Query(Query),
    /// API key management
    #[command(subcommand)]
    Auth(AuthCommand),
}

/// Commands that talk to the music service.
#[derive(Debug, Subcommand)]
enum Query {
    /// Show the user's profile
    Profile,
    /// List the user's most played tracks
    TopTracks(TopTracksArgs),
    /// List recently scrobbled tracks
    Recent(RecentArgs),
    /// Show the track playing right now
    NowPlaying(NowPlayingArgs),
}

#[derive(Debug, Subcommand)]
enum AuthCommand {
    /// Store the API key in the OS keyring
    SetKey { key: String },
    /// Remove the stored API key
    Clear,
    /// Report where the API key would be loaded from
    Status,
}

#[derive(Debug, Parser, Clone, Default)]
struct TopTracksArgs {
    /// overall, 7day, 1month, 3month, 6month or 12month
    #[arg(long)]
    period: Option<Period>,
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long)]
    page: Option<u32>,
}

#[derive(Debug, Parser, Clone, Default)]
struct RecentArgs {
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long)]
    page: Option<u32>,
    /// Only scrobbles after this unix timestamp
    #[arg(long)]
    from: Option<i64>,
    /// Only scrobbles before this unix timestamp
    #[arg(long)]
    to: Option<i64>,
    /// Include loved flags and full artist records
    #[arg(long)]
    extended: bool,
}

#[derive(Debug, Parser, Clone, Default)]
struct NowPlayingArgs {
    /// Poll every N seconds until interrupted
    #[arg(long, value_name = "SECS")]
    watch: Option<u64>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("no API key configured; set {env} or run `nowplaying auth set-key <KEY>`")]
    MissingApiKey { env: &'static str },
    #[error("--watch interval must be at least 1 second")]
    ZeroInterval,
}

impl TopTracksArgs {
    fn params(&self) -> RequestParameters {
        RequestParameters {
            period: self.period,
            limit: self.limit,
            page: self.page,
            ..RequestParameters::default()
        }
    }
}

impl RecentArgs {
    fn params(&self) -> RequestParameters {
        RequestParameters {
            limit: self.limit,
            page: self.page,
            from: self.from,
            to: self.to,
            extended: self.extended.then_some(true),
            ..RequestParameters::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let dirs = AppDirs::discover()?;
    let config = Config::load_or_default(&dirs)?;
    let _logging = init_logging(&config.logging, &dirs)?;
    let store = CredentialStore::new();
    let profile = config.profile.as_deref();

    let query = match cli.command {
        Command::Auth(auth) => return run_auth(&store, profile, auth),
        Command::Query(query) => query,
    };

    let (api_key, source) = match store.resolve_api_key(KEY_SERVICE, profile) {
        Ok(found) => found,
        Err(SecretsError::NotFound { .. }) => {
            return Err(CliError::MissingApiKey {
                env: nowplaying_core::secrets::API_KEY_ENV,
            }
            .into())
        }
        Err(e) => return Err(e).context("failed to read API key"),
    };
    tracing::debug!(source = source.describe(), "resolved api key");

    let credentials = ServiceCredentials::from_url(api_key, config.lastfm.parsed_base_url()?)?;
    let client = LastFmClient::new(credentials, Some(config.lastfm.username.as_str()));
    if let Some(user) = cli.user.as_deref() {
        client.set_identity(user);
    }
    tracing::info!(
        "Querying Last.fm as '{}' (config dir: {})",
        client.identity(),
        dirs.config_dir().display()
    );

    run(&client, query, cli.json).await
}

async fn run(service: &dyn MusicService, query: Query, json: bool) -> Result<()> {
    match query {
        Query::Profile => {
            let profile = service.user_profile().await?;
            emit(json, &profile, render::profile)?;
        }
        Query::TopTracks(args) => {
            let page = service.top_tracks(args.params()).await?;
            emit(json, &page, render::top_tracks)?;
        }
        Query::Recent(args) => {
            let page = service.recent_tracks(args.params()).await?;
            emit(json, &page, render::recent_tracks)?;
        }
        Query::NowPlaying(NowPlayingArgs { watch: None }) => {
            let playing = now_playing(service).await?;
            emit(json, &playing, |p| render::now_playing(p.as_ref()))?;
        }
        Query::NowPlaying(NowPlayingArgs { watch: Some(secs) }) => {
            watch(service, secs, json).await?;
        }
    }
    Ok(())
}

/// "Nothing playing" is an ordinary answer, not a failure.
async fn now_playing(service: &dyn MusicService) -> Result<Option<RecentTrackEntry>> {
    match service.currently_playing().await {
        Ok(entry) => Ok(Some(entry)),
        Err(e) if e.is_no_data() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Polls until Ctrl-C, printing only when the playing track changes.
async fn watch(service: &dyn MusicService, secs: u64, json: bool) -> Result<()> {
    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    watch_until(service, secs, json, interrupted).await
}

/// Poll loop that stops as soon as `shutdown` completes, including while a
/// request is in flight. Failed polls are logged and the loop keeps going.
async fn watch_until<F>(service: &dyn MusicService, secs: u64, json: bool, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    if secs == 0 {
        return Err(CliError::ZeroInterval.into());
    }
    let mut ticker = tokio::time::interval(Duration::from_secs(secs));
    let mut last: Option<Option<RecentTrackEntry>> = None;
    tokio::pin!(shutdown);

    loop {
        let polled = tokio::select! {
            _ = &mut shutdown => {
                tracing::debug!("watch interrupted");
                return Ok(());
            }
            polled = async {
                ticker.tick().await;
                now_playing(service).await
            } => polled,
        };

        match polled {
            Ok(current) => {
                if changed(last.as_ref(), &current) {
                    emit(json, &current, |p| render::now_playing(p.as_ref()))?;
                }
                last = Some(current);
            }
            Err(e) => tracing::warn!(error = %e, "now playing poll failed"),
        }
    }
}

fn changed(last: Option<&Option<RecentTrackEntry>>, current: &Option<RecentTrackEntry>) -> bool {
    let key = |entry: &Option<RecentTrackEntry>| {
        entry
            .as_ref()
            .map(|e| (e.name.clone(), e.artist.name.clone()))
    };
    last.map_or(true, |prev| key(prev) != key(current))
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl Fn(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text(value));
    }
    Ok(())
}

fn run_auth(store: &CredentialStore, profile: Option<&str>, command: AuthCommand) -> Result<()> {
    match command {
        AuthCommand::SetKey { key } => {
            let key = key.trim();
            anyhow::ensure!(!key.is_empty(), "API key must not be empty");
            store.store_api_key(KEY_SERVICE, profile, key)?;
            println!("API key stored in the OS keyring.");
        }
        AuthCommand::Clear => {
            store.delete_api_key(KEY_SERVICE, profile)?;
            println!("API key removed from the OS keyring.");
        }
        AuthCommand::Status => match store.resolve_api_key(KEY_SERVICE, profile) {
            Ok((_, source)) => println!("API key found ({}).", source.describe()),
            Err(SecretsError::NotFound { .. }) => println!("No API key configured."),
            Err(e) => return Err(e.into()),
        },
    }
    Ok(())
}
