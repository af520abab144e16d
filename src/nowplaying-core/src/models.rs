use serde::{Deserialize, Serialize};
use std::fmt;

/// An artwork URL published by the service at a given size label
/// (`small`, `medium`, `large`, `extralarge`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub size: String,
    pub url: String,
}

/// Picks the largest non-empty image, relying on the service listing sizes
/// from smallest to largest.
pub fn largest_image(images: &[Image]) -> Option<&Image> {
    images.iter().rev().find(|image| !image.url.is_empty())
}

/// Normalized `user.getInfo` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub real_name: Option<String>,
    pub url: String,
    pub country: Option<String>,
    pub age: Option<u32>,
    pub subscriber: bool,
    pub playcount: u64,
    pub playlists: u64,
    /// Registration time in unix seconds.
    pub registered_at: Option<i64>,
    pub images: Vec<Image>,
}

/// Artist as attached to a track.
///
/// Simple recent-track entries only carry `name` and `mbid`; the extended
/// variant and top-track entries also fill in `url` and `images`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
    pub mbid: Option<String>,
    pub url: Option<String>,
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRef {
    pub title: String,
    pub mbid: Option<String>,
}

/// One ranked entry from `user.getTopTracks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopTrack {
    pub name: String,
    pub mbid: Option<String>,
    pub url: String,
    pub artist: ArtistRef,
    pub images: Vec<Image>,
    pub duration_seconds: Option<u32>,
    pub rank: u32,
    pub playcount: u64,
}

/// One entry from `user.getRecentTracks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentTrackEntry {
    pub name: String,
    pub mbid: Option<String>,
    pub url: String,
    pub artist: ArtistRef,
    pub album: Option<AlbumRef>,
    pub images: Vec<Image>,
    pub streamable: bool,
    /// Live playback state rather than a historical scrobble.
    pub now_playing: bool,
    /// Scrobble time in unix seconds; absent while the track is playing.
    pub scrobbled_at: Option<i64>,
    /// Only present when the request asked for extended data.
    pub loved: Option<bool>,
}

impl RecentTrackEntry {
    pub fn is_extended(&self) -> bool {
        self.loved.is_some()
    }
}

/// Pagination metadata reported alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PageInfo {
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub total: u32,
}

impl PageInfo {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopTracksPage {
    pub user: String,
    pub tracks: Vec<TopTrack>,
    pub page: PageInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentTracksPage {
    pub user: String,
    pub tracks: Vec<RecentTrackEntry>,
    pub page: PageInfo,
}

/// Time range accepted by `user.getTopTracks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Period {
    #[default]
    #[serde(rename = "overall")]
    Overall,
    #[serde(rename = "7day")]
    SevenDays,
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "3month")]
    ThreeMonths,
    #[serde(rename = "6month")]
    SixMonths,
    #[serde(rename = "12month")]
    TwelveMonths,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::Overall,
        Period::SevenDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::TwelveMonths,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Overall => "overall",
            Period::SevenDays => "7day",
            Period::OneMonth => "1month",
            Period::ThreeMonths => "3month",
            Period::SixMonths => "6month",
            Period::TwelveMonths => "12month",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                format!("unknown period '{s}', expected one of overall, 7day, 1month, 3month, 6month, 12month")
            })
    }
}

/// Optional query parameters shared by the listing methods.
///
/// Unset fields never reach the wire. Field order here is the order in which
/// present parameters are written to the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequestParameters {
    pub period: Option<Period>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
    /// Lower bound, unix seconds.
    pub from: Option<i64>,
    /// Upper bound, unix seconds.
    pub to: Option<i64>,
    /// Ask for the richer artist record and the "loved" flag.
    pub extended: Option<bool>,
}

impl RequestParameters {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Present parameters as wire key/value pairs, in declared order.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(period) = self.period {
            pairs.push(("period", period.as_str().to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(from) = self.from {
            pairs.push(("from", from.to_string()));
        }
        if let Some(to) = self.to {
            pairs.push(("to", to.to_string()));
        }
        if let Some(extended) = self.extended {
            pairs.push(("extended", if extended { "1" } else { "0" }.to_string()));
        }
        pairs
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
