pub mod config;
pub mod logging;
pub mod models;
pub mod paths;
pub mod redact;
pub mod secrets;
pub mod service;

pub use config::{Config, ConfigError, LastFmSettings, LogLevel, LoggingConfig, ValidationError};
pub use logging::{init_logging, LoggingError, LoggingGuard};
pub use models::{
    AlbumRef, ArtistRef, Image, PageInfo, Period, RecentTrackEntry, RecentTracksPage,
    RequestParameters, TopTrack, TopTracksPage, UserProfile,
};
pub use paths::{AppDirs, DirsError};
pub use secrets::{CredentialStore, KeySource, SecretsError};
pub use service::{MusicService, ServiceError, ServiceResult};

pub const APP_NAME: &str = "nowplaying";
pub const APP_AUTHOR: &str = "Nowplaying";
pub const APP_QUALIFIER: &str = "io";
