use nowplaying_core::models::RequestParameters;
use std::fmt;
use url::Url;

/// The remote operations this client issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    GetUserInfo,
    GetUserTopTracks,
    GetRecentTracks,
}

impl RequestMethod {
    pub const ALL: [RequestMethod; 3] = [
        RequestMethod::GetUserInfo,
        RequestMethod::GetUserTopTracks,
        RequestMethod::GetRecentTracks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::GetUserInfo => "user.getInfo",
            RequestMethod::GetUserTopTracks => "user.getTopTracks",
            RequestMethod::GetRecentTracks => "user.getRecentTracks",
        }
    }

    /// The subset of `params` this method accepts; the rest never reach the wire.
    pub fn accepted(&self, params: &RequestParameters) -> RequestParameters {
        match self {
            RequestMethod::GetUserInfo => RequestParameters::default(),
            RequestMethod::GetUserTopTracks => RequestParameters {
                period: params.period,
                limit: params.limit,
                page: params.page,
                ..RequestParameters::default()
            },
            RequestMethod::GetRecentTracks => RequestParameters {
                period: None,
                ..*params
            },
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `base?method=..&user=..[&params..]&api_key=..&format=json`, every pair
/// form-urlencoded. Parameters the method does not accept are dropped. Any
/// query already present on `base` is kept in front.
pub(crate) fn build_url(
    base: &Url,
    api_key: &str,
    method: RequestMethod,
    identity: &str,
    params: &RequestParameters,
) -> Url {
    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("method", method.as_str())
            .append_pair("user", identity);
        for (key, value) in method.accepted(params).to_pairs() {
            query.append_pair(key, &value);
        }
        query
            .append_pair("api_key", api_key)
            .append_pair("format", "json");
    }
    url
}
