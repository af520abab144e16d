use crate::models::{self, Artist, PageAttr};
use nowplaying_core::models::{
    AlbumRef, ArtistRef, Image, PageInfo, RecentTrackEntry, RecentTracksPage, TopTrack,
    TopTracksPage, UserProfile,
};

/// The service sends `""` for unknown MusicBrainz ids and missing text.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn map_images(images: Vec<models::Image>) -> Vec<Image> {
    images
        .into_iter()
        .map(|i| Image {
            size: i.size,
            url: i.url,
        })
        .collect()
}

fn map_artist(artist: Artist) -> ArtistRef {
    match artist {
        Artist::Detailed {
            name,
            mbid,
            url,
            image,
        } => ArtistRef {
            name,
            mbid: non_empty(mbid),
            url: non_empty(url),
            images: map_images(image),
        },
        Artist::Simple { text, mbid } => ArtistRef {
            name: text,
            mbid: non_empty(mbid),
            url: None,
            images: Vec::new(),
        },
    }
}

fn map_page(attr: &PageAttr) -> PageInfo {
    PageInfo {
        page: attr.page,
        per_page: attr.per_page,
        total_pages: attr.total_pages,
        total: attr.total,
    }
}

pub fn map_user_profile(response: models::UserInfoResponse) -> UserProfile {
    let user = response.user;
    UserProfile {
        name: user.name,
        real_name: non_empty(user.realname),
        url: user.url,
        country: non_empty(user.country).filter(|c| c != "None"),
        age: user.age.filter(|age| *age > 0),
        subscriber: user.subscriber,
        playcount: user.playcount,
        playlists: user.playlists,
        registered_at: user.registered.and_then(|r| r.unixtime),
        images: map_images(user.image),
    }
}

pub fn map_top_tracks(response: models::TopTracksResponse) -> TopTracksPage {
    let top = response.toptracks;
    let page = map_page(&top.attr);
    let tracks = Vec::from(top.track)
        .into_iter()
        .map(|t| TopTrack {
            name: t.name,
            mbid: non_empty(t.mbid),
            url: t.url,
            artist: map_artist(t.artist),
            images: map_images(t.image),
            duration_seconds: t.duration.filter(|d| *d > 0),
            rank: t.attr.rank,
            playcount: t.playcount,
        })
        .collect();
    TopTracksPage {
        user: top.attr.user,
        tracks,
        page,
    }
}

pub fn map_recent_track(track: models::RecentTrack) -> RecentTrackEntry {
    let now_playing = track.attr.map(|a| a.nowplaying).unwrap_or(false);
    RecentTrackEntry {
        name: track.name,
        mbid: non_empty(track.mbid),
        url: track.url,
        artist: map_artist(track.artist),
        album: track
            .album
            .filter(|a| !a.text.is_empty())
            .map(|a| AlbumRef {
                title: a.text,
                mbid: non_empty(a.mbid),
            }),
        images: map_images(track.image),
        streamable: track.streamable,
        now_playing,
        scrobbled_at: track.date.and_then(|d| d.uts),
        loved: track.loved,
    }
}

pub fn map_recent_tracks(response: models::RecentTracksResponse) -> RecentTracksPage {
    let recent = response.recenttracks;
    let page = map_page(&recent.attr);
    let tracks = Vec::from(recent.track)
        .into_iter()
        .map(map_recent_track)
        .collect();
    RecentTracksPage {
        user: recent.attr.user,
        tracks,
        page,
    }
}
