use lastfm_provider::{LastFmClient, ServiceCredentials};
use nowplaying_core::models::{Period, RequestParameters};
use nowplaying_core::service::{MusicService, ServiceError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-api-key";

const USER_INFO: &str = include_str!("fixtures/user_info.json");
const TOP_TRACKS: &str = include_str!("fixtures/top_tracks.json");
const RECENT_NOW_PLAYING: &str = include_str!("fixtures/recent_tracks_now_playing.json");
const RECENT_HISTORY: &str = include_str!("fixtures/recent_tracks_history.json");

fn client_for(server: &MockServer, identity: &str) -> LastFmClient {
    let credentials = ServiceCredentials::new(API_KEY, &format!("{}/2.0/", server.uri()))
        .expect("credentials");
    LastFmClient::new(credentials, Some(identity))
}

fn api_call(lastfm_method: &str, user: &str) -> wiremock::MockBuilder {
    Mock::given(method("GET"))
        .and(path("/2.0/"))
        .and(query_param("method", lastfm_method))
        .and(query_param("user", user))
        .and(query_param("api_key", API_KEY))
        .and(query_param("format", "json"))
}

async fn received_query_keys(server: &MockServer) -> Vec<Vec<String>> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|req| req.url.query_pairs().map(|(k, _)| k.into_owned()).collect())
        .collect()
}

#[tokio::test]
async fn user_profile_is_fetched_and_normalized() {
    let server = MockServer::start().await;
    api_call("user.getInfo", "alice")
        .respond_with(ResponseTemplate::new(200).set_body_string(USER_INFO))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "alice");
    let profile = client.user_profile().await.expect("profile");

    assert_eq!(profile.name, "alice");
    assert_eq!(profile.real_name.as_deref(), Some("Alice"));
    assert!(profile.subscriber);
    assert_eq!(profile.playcount, 48_213);
    assert_eq!(profile.playlists, 2);
    assert_eq!(profile.registered_at, Some(1_546_300_800));
    assert_eq!(
        received_query_keys(&server).await,
        [["method", "user", "api_key", "format"]]
    );
}

#[tokio::test]
async fn unknown_user_maps_to_username_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2.0/"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string(r#"{"error":6,"message":"User not found","links":[]}"#),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, "ghost");

    let err = client.user_profile().await.expect_err("should fail");
    assert_eq!(
        err,
        ServiceError::UsernameNotFound {
            username: "ghost".into()
        }
    );

    let err = client
        .recent_tracks(RequestParameters::default())
        .await
        .expect_err("should fail");
    assert!(matches!(err, ServiceError::UsernameNotFound { ref username } if username == "ghost"));

    let err = client
        .top_tracks(RequestParameters::default())
        .await
        .expect_err("should fail");
    assert!(matches!(err, ServiceError::UsernameNotFound { .. }));
}

#[tokio::test]
async fn other_failures_pass_through_unchanged() {
    let server = MockServer::start().await;
    let body = r#"{"error":10,"message":"Invalid API key - You must be granted a valid key by last.fm"}"#;
    Mock::given(method("GET"))
        .and(path("/2.0/"))
        .respond_with(ResponseTemplate::new(403).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "alice");
    let err = client.user_profile().await.expect_err("should fail");

    assert_eq!(
        err,
        ServiceError::Http {
            status: 403,
            body: body.to_string()
        }
    );
}

#[tokio::test]
async fn top_tracks_send_only_present_parameters() {
    let server = MockServer::start().await;
    api_call("user.getTopTracks", "alice")
        .and(query_param("period", "7day"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TOP_TRACKS))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "alice");
    let params = RequestParameters {
        period: Some(Period::SevenDays),
        limit: Some(2),
        ..Default::default()
    };
    let page = client.top_tracks(params).await.expect("top tracks");

    assert_eq!(page.user, "alice");
    assert_eq!(page.page.page, 1);
    assert_eq!(page.page.total_pages, 150);
    assert_eq!(page.page.total, 300);
    assert_eq!(page.tracks.len(), 2);
    assert_eq!(page.tracks[0].rank, 1);
    assert_eq!(page.tracks[0].playcount, 312);
    assert_eq!(page.tracks[0].duration_seconds, Some(290));
    assert_eq!(page.tracks[1].duration_seconds, None);
    assert_eq!(page.tracks[1].artist.name, "Slowdive");

    assert_eq!(
        received_query_keys(&server).await,
        [["method", "user", "period", "limit", "api_key", "format"]]
    );
}

#[tokio::test]
async fn top_tracks_drop_recent_only_parameters() {
    let server = MockServer::start().await;
    api_call("user.getTopTracks", "alice")
        .respond_with(ResponseTemplate::new(200).set_body_string(TOP_TRACKS))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "alice");
    let params = RequestParameters {
        limit: Some(2),
        from: Some(1_600_000_000),
        to: Some(1_700_000_000),
        extended: Some(true),
        ..Default::default()
    };
    client.top_tracks(params).await.expect("top tracks");

    assert_eq!(
        received_query_keys(&server).await,
        [["method", "user", "limit", "api_key", "format"]]
    );
}

#[tokio::test]
async fn extended_recent_tracks_request_numeric_flag() {
    let server = MockServer::start().await;
    api_call("user.getRecentTracks", "alice")
        .and(query_param("extended", "1"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RECENT_HISTORY))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "alice");
    let params = RequestParameters {
        page: Some(3),
        extended: Some(true),
        ..Default::default()
    };
    let page = client.recent_tracks(params).await.expect("recent tracks");

    assert_eq!(page.tracks.len(), 1);
    assert_eq!(page.page.total, 4820);
    assert!(!page.tracks[0].now_playing);
}

#[tokio::test]
async fn currently_playing_returns_live_entry() {
    let server = MockServer::start().await;
    api_call("user.getRecentTracks", "alice")
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RECENT_NOW_PLAYING))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server, "alice");
    let playing = client.currently_playing().await.expect("now playing");
    let first = client
        .recent_tracks(RequestParameters::with_limit(1))
        .await
        .expect("recent tracks")
        .tracks
        .remove(0);

    assert!(playing.now_playing);
    assert_eq!(playing.name, "Reckoner");
    assert_eq!(playing, first);
}

#[tokio::test]
async fn historical_first_entry_means_nothing_playing() {
    let server = MockServer::start().await;
    api_call("user.getRecentTracks", "alice")
        .respond_with(ResponseTemplate::new(200).set_body_string(RECENT_HISTORY))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "alice");
    let err = client.currently_playing().await.expect_err("nothing playing");

    assert_eq!(err, ServiceError::NoCurrentlyPlayingTrack);
    assert!(err.is_no_data());
}

#[tokio::test]
async fn empty_history_means_nothing_playing() {
    let server = MockServer::start().await;
    let body = r#"{"recenttracks":{"track":[],"@attr":{"user":"alice","totalPages":"0","page":"1","perPage":"1","total":"0"}}}"#;
    api_call("user.getRecentTracks", "alice")
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = client_for(&server, "alice");
    assert_eq!(
        client.currently_playing().await,
        Err(ServiceError::NoCurrentlyPlayingTrack)
    );
}

#[tokio::test]
async fn identity_change_applies_to_next_request() {
    let server = MockServer::start().await;
    api_call("user.getInfo", "bob")
        .respond_with(
            ResponseTemplate::new(200).set_body_string(USER_INFO.replace("\"alice\"", "\"bob\"")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "alice");
    let service: &dyn MusicService = &client;
    service.set_identity("bob");

    assert_eq!(service.identity(), "bob");
    let profile = service.user_profile().await.expect("profile");
    assert_eq!(profile.name, "bob");
}

#[tokio::test]
async fn mismatched_shape_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2.0/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"unexpected":true}"#))
        .mount(&server)
        .await;

    let client = client_for(&server, "alice");
    let err = client.user_profile().await.expect_err("decode failure");
    assert!(matches!(err, ServiceError::Decode { ref message } if message.starts_with("user.getInfo")));
}

#[tokio::test]
async fn error_payload_with_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2.0/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"error":29,"message":"Rate Limit Exceeded"}"#),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, "alice");
    assert_eq!(
        client.user_profile().await,
        Err(ServiceError::Api {
            code: 29,
            message: "Rate Limit Exceeded".into()
        })
    );
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("local addr").port()
    };
    let credentials = ServiceCredentials::new(API_KEY, &format!("http://127.0.0.1:{port}/2.0/"))
        .expect("credentials");
    let client = LastFmClient::new(credentials, Some("alice"));

    let err = client.user_profile().await.expect_err("connection refused");
    match err {
        ServiceError::Network { message } => assert!(!message.contains(API_KEY)),
        other => panic!("unexpected error: {other}"),
    }
}
