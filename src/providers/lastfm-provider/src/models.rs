//! Wire shapes of the Last.fm 2.0 JSON API.
//!
//! The service encodes most numbers as strings, booleans as `"0"`/`"1"` or
//! `"true"`, and collapses one-element lists into a bare object; the helpers
//! in [`de`] absorb those quirks so mapping can work with real types.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default, deserialize_with = "de::opt_number")]
    pub error: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub size: String,
    #[serde(rename = "#text", default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct UserInfoResponse {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub realname: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "de::flag")]
    pub subscriber: bool,
    #[serde(default, deserialize_with = "de::number")]
    pub playcount: u64,
    #[serde(default, deserialize_with = "de::number")]
    pub playlists: u64,
    #[serde(default)]
    pub image: Vec<Image>,
    #[serde(default)]
    pub registered: Option<Registered>,
}

#[derive(Debug, Deserialize)]
pub struct Registered {
    #[serde(default, deserialize_with = "de::opt_number")]
    pub unixtime: Option<i64>,
}

/// Artist record: `{name, url, mbid, image}` on top tracks and extended
/// recent tracks, `{"#text", mbid}` on plain recent tracks.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Artist {
    Detailed {
        name: String,
        #[serde(default)]
        mbid: Option<String>,
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        image: Vec<Image>,
    },
    Simple {
        #[serde(rename = "#text")]
        text: String,
        #[serde(default)]
        mbid: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub struct Album {
    #[serde(rename = "#text", default)]
    pub text: String,
    #[serde(default)]
    pub mbid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageAttr {
    #[serde(default)]
    pub user: String,
    #[serde(default, deserialize_with = "de::number")]
    pub page: u32,
    #[serde(rename = "perPage", default, deserialize_with = "de::number")]
    pub per_page: u32,
    #[serde(rename = "totalPages", default, deserialize_with = "de::number")]
    pub total_pages: u32,
    #[serde(default, deserialize_with = "de::number")]
    pub total: u32,
}

#[derive(Debug, Deserialize)]
pub struct TopTracksResponse {
    pub toptracks: TopTracks,
}

#[derive(Debug, Deserialize)]
pub struct TopTracks {
    #[serde(default)]
    pub track: MaybeMany<TopTrack>,
    #[serde(rename = "@attr")]
    pub attr: PageAttr,
}

#[derive(Debug, Deserialize)]
pub struct TopTrack {
    pub name: String,
    #[serde(default)]
    pub mbid: Option<String>,
    #[serde(default)]
    pub url: String,
    pub artist: Artist,
    #[serde(default)]
    pub image: Vec<Image>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub duration: Option<u32>,
    #[serde(default, deserialize_with = "de::number")]
    pub playcount: u64,
    #[serde(rename = "@attr")]
    pub attr: RankAttr,
}

#[derive(Debug, Deserialize)]
pub struct RankAttr {
    #[serde(deserialize_with = "de::number")]
    pub rank: u32,
}

#[derive(Debug, Deserialize)]
pub struct RecentTracksResponse {
    pub recenttracks: RecentTracks,
}

#[derive(Debug, Deserialize)]
pub struct RecentTracks {
    #[serde(default)]
    pub track: MaybeMany<RecentTrack>,
    #[serde(rename = "@attr")]
    pub attr: PageAttr,
}

#[derive(Debug, Deserialize)]
pub struct RecentTrack {
    pub name: String,
    #[serde(default)]
    pub mbid: Option<String>,
    #[serde(default)]
    pub url: String,
    pub artist: Artist,
    #[serde(default)]
    pub album: Option<Album>,
    #[serde(default)]
    pub image: Vec<Image>,
    #[serde(default, deserialize_with = "de::flag")]
    pub streamable: bool,
    #[serde(default)]
    pub date: Option<PlayedAt>,
    /// Only sent when `extended=1` was requested.
    #[serde(default, deserialize_with = "de::opt_flag")]
    pub loved: Option<bool>,
    #[serde(rename = "@attr", default)]
    pub attr: Option<NowPlayingAttr>,
}

#[derive(Debug, Deserialize)]
pub struct PlayedAt {
    #[serde(default, deserialize_with = "de::opt_number")]
    pub uts: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct NowPlayingAttr {
    #[serde(default, deserialize_with = "de::flag")]
    pub nowplaying: bool,
}

/// A list the service may flatten to a single object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MaybeMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for MaybeMany<T> {
    fn default() -> Self {
        MaybeMany::Many(Vec::new())
    }
}

impl<T> From<MaybeMany<T>> for Vec<T> {
    fn from(value: MaybeMany<T>) -> Self {
        match value {
            MaybeMany::Many(items) => items,
            MaybeMany::One(item) => vec![item],
        }
    }
}

pub(crate) mod de {
    use serde::de::{Deserializer, Error};
    use serde::Deserialize;
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Bool(bool),
        Int(i64),
        Uint(u64),
        Float(f64),
        Text(String),
        Null(()),
    }

    impl Loose {
        fn into_text(self) -> Option<String> {
            match self {
                Loose::Bool(b) => Some(b.to_string()),
                Loose::Int(i) => Some(i.to_string()),
                Loose::Uint(u) => Some(u.to_string()),
                Loose::Float(f) if f.fract() == 0.0 => Some(format!("{f:.0}")),
                Loose::Float(f) => Some(f.to_string()),
                Loose::Text(s) if s.trim().is_empty() => None,
                Loose::Text(s) => Some(s.trim().to_string()),
                Loose::Null(()) => None,
            }
        }
    }

    pub fn opt_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match Loose::deserialize(deserializer)?.into_text() {
            Some(text) => text.parse().map(Some).map_err(D::Error::custom),
            None => Ok(None),
        }
    }

    /// Missing or empty values become `T::default()`.
    pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr + Default,
        T::Err: std::fmt::Display,
    {
        opt_number(deserializer).map(Option::unwrap_or_default)
    }

    pub fn opt_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Loose::deserialize(deserializer)?.into_text().as_deref() {
            None => Ok(None),
            Some("1") | Some("true") => Ok(Some(true)),
            Some("0") | Some("false") => Ok(Some(false)),
            Some(other) => Err(D::Error::custom(format!(
                "unexpected value for boolean flag: {other}"
            ))),
        }
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        opt_flag(deserializer).map(|v| v.unwrap_or(false))
    }
}
