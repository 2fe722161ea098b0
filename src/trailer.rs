use serde::Serialize;

const EMBED_BASE: &str = "https://www.youtube-nocookie.com/embed";
const VIDEO_ID_LEN: usize = 11;

/// URL shapes that carry the video identifier right after the marker.
const ID_MARKERS: [&str; 5] = ["watch?v=", "&v=", "youtu.be/", "embed/", "/v/"];

/// Scoped notice shown inside the detail overlay when no trailer reference
/// exists; never escalated to a global error.
pub const TRAILER_UNAVAILABLE_MESSAGE: &str = "The official trailer link for this title could not be retrieved from the cinematic archives. You may want to search manually on YouTube.";

/// How the view should honor a "watch trailer" intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlaybackPlan {
    /// Inline player. The view keeps a control to dismiss the player and
    /// return to the poster without closing the detail overlay.
    Embed { url: String },
    /// A trailer link exists but no identifier could be extracted; open it in
    /// a new, unrelated browsing context (noopener/noreferrer).
    OpenExternal { url: String },
    /// No trailer reference at all; show the scoped notice, navigate nowhere.
    Unavailable { message: String },
}

/// Best-effort extraction of the 11-character video identifier from the
/// common watch/short/embed URL shapes. String in, fixed-length token out;
/// this is deliberately not a general URL parser.
pub fn extract_video_id(url: &str) -> Option<String> {
    let url = url.trim();
    for marker in ID_MARKERS {
        let Some(pos) = url.find(marker) else {
            continue;
        };
        let rest = &url[pos + marker.len()..];
        let end = rest
            .find(|c: char| matches!(c, '#' | '&' | '?' | '/'))
            .unwrap_or(rest.len());
        let id = &rest[..end];
        if id.len() == VIDEO_ID_LEN
            && id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Some(id.to_string());
        }
    }
    None
}

/// Privacy-enhanced player URL for an extracted identifier: muted autoplay
/// (required for unattended autoplay), related content suppressed, minimal
/// branding. The page origin is declared for embedding permission only when
/// it is usable ("null" counts as unusable, e.g. opaque/file origins).
pub fn embed_url(video_id: &str, origin: Option<&str>) -> String {
    let mut url = format!(
        "{EMBED_BASE}/{video_id}?autoplay=1&mute=1&rel=0&modestbranding=1&enablejsapi=1"
    );
    if let Some(origin) = origin.filter(|o| !o.is_empty() && *o != "null") {
        let encoded = urlencoding::encode(origin);
        url.push_str(&format!("&origin={encoded}&widget_referrer={encoded}"));
    }
    url
}

pub fn resolve_playback(trailer_url: Option<&str>, origin: Option<&str>) -> PlaybackPlan {
    let Some(raw) = trailer_url.map(str::trim).filter(|u| !u.is_empty()) else {
        return PlaybackPlan::Unavailable {
            message: TRAILER_UNAVAILABLE_MESSAGE.to_string(),
        };
    };
    match extract_video_id(raw) {
        Some(id) => PlaybackPlan::Embed {
            url: embed_url(&id, origin),
        },
        None => PlaybackPlan::OpenExternal {
            url: raw.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn extracts_id_from_short_url() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn extracts_id_from_embed_url_ignoring_query() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn extracts_id_from_secondary_query_parameter() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=shared&v=dQw4w9WgXcQ#t=10")
                .as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn rejects_urls_without_a_recognizable_identifier() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/results?search_query=blade+runner+trailer"),
            None
        );
        assert_eq!(extract_video_id("https://example.com/trailers/1234"), None);
        // Wrong token length behind a known marker.
        assert_eq!(extract_video_id("https://youtu.be/short"), None);
    }

    #[test]
    fn embed_url_carries_muted_autoplay_and_privacy_host() {
        let url = embed_url("dQw4w9WgXcQ", None);
        assert_eq!(
            url,
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ?autoplay=1&mute=1&rel=0&modestbranding=1&enablejsapi=1"
        );
    }

    #[test]
    fn embed_url_declares_encoded_origin_when_usable() {
        let url = embed_url("dQw4w9WgXcQ", Some("https://app.example.com"));
        assert!(url.contains("&origin=https%3A%2F%2Fapp.example.com"));
        assert!(url.contains("&widget_referrer=https%3A%2F%2Fapp.example.com"));
    }

    #[test]
    fn embed_url_skips_null_or_empty_origin() {
        assert!(!embed_url("dQw4w9WgXcQ", Some("null")).contains("origin="));
        assert!(!embed_url("dQw4w9WgXcQ", Some("")).contains("origin="));
    }

    #[test]
    fn playback_prefers_embed_then_external_then_notice() {
        let embed = resolve_playback(Some("https://youtu.be/dQw4w9WgXcQ"), None);
        assert!(matches!(embed, PlaybackPlan::Embed { .. }));

        let external = resolve_playback(
            Some("https://www.youtube.com/results?search_query=trailer"),
            None,
        );
        assert_eq!(
            external,
            PlaybackPlan::OpenExternal {
                url: "https://www.youtube.com/results?search_query=trailer".to_string()
            }
        );

        let unavailable = resolve_playback(None, None);
        assert_eq!(
            unavailable,
            PlaybackPlan::Unavailable {
                message: TRAILER_UNAVAILABLE_MESSAGE.to_string()
            }
        );
        // Whitespace-only links count as absent, not external.
        assert!(matches!(
            resolve_playback(Some("   "), None),
            PlaybackPlan::Unavailable { .. }
        ));
    }

    #[test]
    fn playback_plan_serializes_with_action_tag() {
        let plan = resolve_playback(Some("https://youtu.be/dQw4w9WgXcQ"), None);
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["action"], "embed");
        assert!(value["url"]
            .as_str()
            .unwrap()
            .starts_with("https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ"));
    }
}
