use crate::models::{RecentTrackEntry, RecentTracksPage, RequestParameters, TopTracksPage, UserProfile};
use thiserror::Error;

/// Failures surfaced by a music service client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The service reported that the queried identity does not exist.
    #[error("username '{username}' not found")]
    UsernameNotFound { username: String },
    /// The most recent entry is historical, not live playback. Callers should
    /// treat this as an ordinary "no data" state.
    #[error("no currently playing track")]
    NoCurrentlyPlayingTrack,
    /// Non-success HTTP response, body kept verbatim.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Error payload delivered with a success status.
    #[error("api error {code}: {message}")]
    Api { code: u32, message: String },
    #[error("network error: {message}")]
    Network { message: String },
    #[error("failed to decode response: {message}")]
    Decode { message: String },
    #[error("music service is not configured (missing API key)")]
    NotConfigured,
    #[error("{message}")]
    Other { message: String },
}

impl ServiceError {
    /// True for outcomes that mean "nothing to show" rather than a fault.
    pub fn is_no_data(&self) -> bool {
        matches!(self, ServiceError::NoCurrentlyPlayingTrack)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Read-only listening data for one subject identity.
///
/// Implementations are shared by reference; the identity may change between
/// calls and each request uses the value current when it is built.
#[async_trait::async_trait]
pub trait MusicService: Send + Sync {
    /// Stable service identifier (e.g., "lastfm").
    fn id(&self) -> &str;

    fn identity(&self) -> String;

    fn set_identity(&self, identity: &str);

    async fn user_profile(&self) -> ServiceResult<UserProfile>;

    async fn top_tracks(&self, params: RequestParameters) -> ServiceResult<TopTracksPage>;

    async fn recent_tracks(&self, params: RequestParameters) -> ServiceResult<RecentTracksPage>;

    /// The live entry, or `ServiceError::NoCurrentlyPlayingTrack`.
    async fn currently_playing(&self) -> ServiceResult<RecentTrackEntry>;
}
