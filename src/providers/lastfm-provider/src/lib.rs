mod mapping;
pub mod models;
mod request;

use mapping::{map_recent_track, map_recent_tracks, map_top_tracks, map_user_profile};
use nowplaying_core::config::DEFAULT_USERNAME;
use nowplaying_core::models::{
    RecentTrackEntry, RecentTracksPage, RequestParameters, TopTracksPage, UserProfile,
};
use nowplaying_core::redact::redact_secrets;
use nowplaying_core::service::{MusicService, ServiceError, ServiceResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use url::Url;

pub use request::RequestMethod;

const USER_NOT_FOUND: &str = "User not found";

/// API key and endpoint, fixed for the lifetime of a client.
#[derive(Clone)]
pub struct ServiceCredentials {
    api_key: String,
    base_url: Url,
}

impl ServiceCredentials {
    pub fn new(api_key: impl Into<String>, base_url: &str) -> ServiceResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ServiceError::Other {
            message: format!("invalid base_url: {e}"),
        })?;
        Self::from_url(api_key, base_url)
    }

    pub fn from_url(api_key: impl Into<String>, base_url: Url) -> ServiceResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ServiceError::NotConfigured);
        }
        Ok(Self { api_key, base_url })
    }
}

impl fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCredentials")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// Last.fm client scoped to one subject identity.
///
/// Issues exactly one GET per call: no retries, caching or internal timeout.
/// The identity can be swapped at any time; a request uses whatever value is
/// current when it is built.
pub struct LastFmClient {
    id: String,
    client: Client,
    credentials: ServiceCredentials,
    identity: RwLock<String>,
}

impl fmt::Debug for LastFmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LastFmClient")
            .field("credentials", &self.credentials)
            .field("identity", &self.identity())
            .finish()
    }
}

impl LastFmClient {
    /// An empty or missing identity falls back to the placeholder username.
    pub fn new(credentials: ServiceCredentials, identity: Option<&str>) -> Self {
        Self::with_http_client(credentials, identity, Client::new())
    }

    pub fn with_http_client(
        credentials: ServiceCredentials,
        identity: Option<&str>,
        client: Client,
    ) -> Self {
        let identity = identity
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_USERNAME)
            .to_string();
        Self {
            id: "lastfm".into(),
            client,
            credentials,
            identity: RwLock::new(identity),
        }
    }

    pub fn identity(&self) -> String {
        self.identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// No validation: a bad name surfaces as `UsernameNotFound` on the next call.
    pub fn set_identity(&self, identity: &str) {
        let mut guard = self
            .identity
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = identity.to_string();
        tracing::debug!(identity, "identity changed");
    }

    /// The exact URL a call would hit for the current identity.
    pub fn build_request_url(&self, method: RequestMethod, params: &RequestParameters) -> Url {
        request::build_url(
            &self.credentials.base_url,
            &self.credentials.api_key,
            method,
            &self.identity(),
            params,
        )
    }

    pub async fn user_profile(&self) -> ServiceResult<UserProfile> {
        let response = self
            .fetch(RequestMethod::GetUserInfo, &RequestParameters::default())
            .await?;
        Ok(map_user_profile(response))
    }

    pub async fn top_tracks(&self, params: RequestParameters) -> ServiceResult<TopTracksPage> {
        let response = self
            .fetch(RequestMethod::GetUserTopTracks, &params)
            .await?;
        Ok(map_top_tracks(response))
    }

    pub async fn recent_tracks(
        &self,
        params: RequestParameters,
    ) -> ServiceResult<RecentTracksPage> {
        let response = self.fetch(RequestMethod::GetRecentTracks, &params).await?;
        Ok(map_recent_tracks(response))
    }

    /// First recent entry when it is flagged as playing now.
    pub async fn currently_playing(&self) -> ServiceResult<RecentTrackEntry> {
        let response: models::RecentTracksResponse = self
            .fetch(
                RequestMethod::GetRecentTracks,
                &RequestParameters::with_limit(1),
            )
            .await?;
        let first = Vec::from(response.recenttracks.track).into_iter().next();
        match first.map(map_recent_track) {
            Some(entry) if entry.now_playing => Ok(entry),
            _ => Err(ServiceError::NoCurrentlyPlayingTrack),
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: RequestMethod,
        params: &RequestParameters,
    ) -> ServiceResult<T> {
        let identity = self.identity();
        let url = request::build_url(
            &self.credentials.base_url,
            &self.credentials.api_key,
            method,
            &identity,
            params,
        );
        tracing::debug!(%method, url = %redact_secrets(url.as_str()), "sending request");

        let resp = self.client.get(url).send().await.map_err(|e| {
            let message = redact_secrets(&e.to_string()).into_owned();
            tracing::warn!(%method, error = %message, "request failed before a response");
            ServiceError::Network { message }
        })?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| ServiceError::Network {
            message: redact_secrets(&e.to_string()).into_owned(),
        })?;

        if !status.is_success() {
            tracing::warn!(
                %method,
                status = status.as_u16(),
                body = %redact_secrets(&body),
                "request rejected"
            );
            return Err(classify_failure(status.as_u16(), body, &identity));
        }

        if let Some(err) = embedded_error(&body, &identity) {
            tracing::warn!(%method, body = %redact_secrets(&body), "error payload in success response");
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(%method, error = %e, "response did not match expected shape");
            ServiceError::Decode {
                message: format!("{method}: {e}"),
            }
        })
    }
}

/// Map a non-success response to the error taxonomy. Only the literal
/// "User not found" message is interpreted; everything else is passed on
/// with the body untouched.
fn classify_failure(status: u16, body: String, identity: &str) -> ServiceError {
    let parsed = serde_json::from_str::<models::ErrorBody>(&body).ok();
    match parsed.and_then(|b| b.message) {
        Some(message) if message == USER_NOT_FOUND => ServiceError::UsernameNotFound {
            username: identity.to_string(),
        },
        _ => ServiceError::Http { status, body },
    }
}

fn embedded_error(body: &str, identity: &str) -> Option<ServiceError> {
    let parsed: models::ErrorBody = serde_json::from_str(body).ok()?;
    let code = parsed.error?;
    let message = parsed.message.unwrap_or_default();
    if message == USER_NOT_FOUND {
        return Some(ServiceError::UsernameNotFound {
            username: identity.to_string(),
        });
    }
    Some(ServiceError::Api { code, message })
}

#[async_trait::async_trait]
impl MusicService for LastFmClient {
    fn id(&self) -> &str {
        &self.id
    }

    fn identity(&self) -> String {
        LastFmClient::identity(self)
    }

    fn set_identity(&self, identity: &str) {
        LastFmClient::set_identity(self, identity)
    }

    async fn user_profile(&self) -> ServiceResult<UserProfile> {
        LastFmClient::user_profile(self).await
    }

    async fn top_tracks(&self, params: RequestParameters) -> ServiceResult<TopTracksPage> {
        LastFmClient::top_tracks(self, params).await
    }

    async fn recent_tracks(&self, params: RequestParameters) -> ServiceResult<RecentTracksPage> {
        LastFmClient::recent_tracks(self, params).await
    }

    async fn currently_playing(&self) -> ServiceResult<RecentTrackEntry> {
        LastFmClient::currently_playing(self).await
    }
}

/// Holds at most one client; the first initialisation wins and later
/// arguments are ignored.
pub struct InstanceSlot {
    cell: OnceLock<Arc<LastFmClient>>,
}

impl InstanceSlot {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    pub fn get_or_init(
        &self,
        credentials: &ServiceCredentials,
        identity: Option<&str>,
    ) -> Arc<LastFmClient> {
        self.cell
            .get_or_init(|| {
                tracing::debug!(?identity, "creating shared client");
                Arc::new(LastFmClient::new(credentials.clone(), identity))
            })
            .clone()
    }
}

impl Default for InstanceSlot {
    fn default() -> Self {
        Self::new()
    }
}

static SHARED: InstanceSlot = InstanceSlot::new();

/// Process-wide client. Created by the first call; subsequent calls return
/// the same instance and ignore both arguments.
pub fn get_instance(credentials: &ServiceCredentials, identity: Option<&str>) -> Arc<LastFmClient> {
    SHARED.get_or_init(credentials, identity)
}
