//! Plain-text rendering for terminal output.

use nowplaying_core::models::largest_image;
use nowplaying_core::{PageInfo, RecentTrackEntry, RecentTracksPage, TopTracksPage, UserProfile};
use std::fmt::Write;

pub fn profile(profile: &UserProfile) -> String {
    let mut out = String::new();
    match &profile.real_name {
        Some(real) => line(&mut out, format!("{} ({real})", profile.name)),
        None => line(&mut out, profile.name.clone()),
    }
    line(&mut out, format!("  url:        {}", profile.url));
    if let Some(country) = &profile.country {
        line(&mut out, format!("  country:    {country}"));
    }
    if let Some(age) = profile.age {
        line(&mut out, format!("  age:        {age}"));
    }
    line(&mut out, format!("  scrobbles:  {}", profile.playcount));
    line(&mut out, format!("  playlists:  {}", profile.playlists));
    if let Some(registered) = profile.registered_at {
        line(&mut out, format!("  registered: {registered} (unix)"));
    }
    if profile.subscriber {
        line(&mut out, "  subscriber".to_string());
    }
    if let Some(image) = largest_image(&profile.images) {
        line(&mut out, format!("  avatar:     {}", image.url));
    }
    out.trim_end().to_string()
}

pub fn top_tracks(page: &TopTracksPage) -> String {
    if page.tracks.is_empty() {
        return format!("No top tracks for {}.", page.user);
    }
    let mut out = String::new();
    for track in &page.tracks {
        line(
            &mut out,
            format!(
                "{:>3}. {} - {} ({} plays)",
                track.rank, track.artist.name, track.name, track.playcount
            ),
        );
    }
    line(&mut out, footer(&page.page));
    out.trim_end().to_string()
}

pub fn recent_tracks(page: &RecentTracksPage) -> String {
    if page.tracks.is_empty() {
        return format!("No recent tracks for {}.", page.user);
    }
    let mut out = String::new();
    for entry in &page.tracks {
        line(&mut out, recent_line(entry));
    }
    line(&mut out, footer(&page.page));
    out.trim_end().to_string()
}

pub fn now_playing(entry: Option<&RecentTrackEntry>) -> String {
    match entry {
        Some(entry) => format!("Now playing: {}", describe(entry)),
        None => "Nothing playing right now.".to_string(),
    }
}

fn recent_line(entry: &RecentTrackEntry) -> String {
    let when = match (entry.now_playing, entry.scrobbled_at) {
        (true, _) => "now".to_string(),
        (false, Some(ts)) => ts.to_string(),
        (false, None) => "-".to_string(),
    };
    let loved = if entry.loved == Some(true) { " \u{2665}" } else { "" };
    format!("{when:>10}  {}{loved}", describe(entry))
}

fn describe(entry: &RecentTrackEntry) -> String {
    let mut text = format!("{} - {}", entry.artist.name, entry.name);
    if let Some(album) = &entry.album {
        let _ = write!(text, " [{}]", album.title);
    }
    text
}

fn footer(page: &PageInfo) -> String {
    let more = if page.has_next() { ", more available" } else { "" };
    format!(
        "page {}/{} ({} total{more})",
        page.page, page.total_pages, page.total
    )
}

fn line(out: &mut String, text: String) {
    out.push_str(&text);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use nowplaying_core::{AlbumRef, ArtistRef};

    fn entry(now_playing: bool) -> RecentTrackEntry {
        RecentTrackEntry {
            name: "Reckoner".into(),
            mbid: None,
            url: String::new(),
            artist: ArtistRef {
                name: "Radiohead".into(),
                mbid: None,
                url: None,
                images: Vec::new(),
            },
            album: Some(AlbumRef {
                title: "In Rainbows".into(),
                mbid: None,
            }),
            images: Vec::new(),
            streamable: false,
            now_playing,
            scrobbled_at: (!now_playing).then_some(1_700_000_000),
            loved: Some(true),
        }
    }

    #[test]
    fn nothing_playing_has_friendly_text() {
        assert_eq!(now_playing(None), "Nothing playing right now.");
        assert_eq!(
            now_playing(Some(&entry(true))),
            "Now playing: Radiohead - Reckoner [In Rainbows]"
        );
    }

    #[test]
    fn recent_listing_marks_live_and_loved_entries() {
        let page = RecentTracksPage {
            user: "alice".into(),
            tracks: vec![entry(true), entry(false)],
            page: PageInfo {
                page: 1,
                per_page: 2,
                total_pages: 3,
                total: 6,
            },
        };
        let text = recent_tracks(&page);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].trim_start().starts_with("now"));
        assert!(lines[1].contains("1700000000"));
        assert!(lines[1].ends_with('\u{2665}'));
        assert_eq!(lines[2], "page 1/3 (6 total, more available)");
    }

    #[test]
    fn empty_pages_name_the_user() {
        let page = TopTracksPage {
            user: "alice".into(),
            tracks: Vec::new(),
            page: PageInfo::default(),
        };
        assert_eq!(top_tracks(&page), "No top tracks for alice.");
    }
}
