use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::models::{MediaItem, MediaType, Person, StreamingPlatform};

/// One list element as the provider returns it, before the local id stamp.
/// Optional fields default so a missing key and an explicit null read the
/// same; a missing required field is a deserialization error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawItem {
    title: String,
    #[serde(rename = "type")]
    kind: MediaType,
    #[serde(default)]
    year: Option<String>,
    #[serde(default)]
    genres: Vec<String>,
    summary: String,
    #[serde(default)]
    review_score: Option<f32>,
    #[serde(default)]
    review_snippet: Option<String>,
    streaming_platforms: Vec<StreamingPlatform>,
    #[serde(default)]
    poster_url: Option<String>,
    #[serde(default)]
    poster_source: Option<String>,
    #[serde(default)]
    poster_source_url: Option<String>,
    cast: Vec<RawPerson>,
    director: RawPerson,
    duration: String,
    #[serde(default)]
    full_reason: Option<String>,
    #[serde(default)]
    trailer_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPerson {
    name: String,
    #[serde(default)]
    photo_url: Option<String>,
}

/// Normalize a parsed batch into view-layer items, stamping ids from the
/// element index and the request-time timestamp. A blank title fails the
/// whole batch; structural validation already passed, so this is the one
/// semantic check the view relies on.
pub(crate) fn into_media_items(raw: Vec<RawItem>, batch_ts: i64) -> Result<Vec<MediaItem>> {
    raw.into_iter()
        .enumerate()
        .map(|(index, item)| {
            if item.title.trim().is_empty() {
                return Err(anyhow!("Recommendation {} has an empty title", index));
            }
            Ok(MediaItem {
                id: format!("rec-{}-{}", index, batch_ts),
                title: item.title,
                kind: item.kind,
                year: non_empty(item.year),
                genres: item.genres,
                summary: item.summary,
                review_score: item.review_score,
                review_snippet: non_empty(item.review_snippet),
                streaming_platforms: item.streaming_platforms,
                poster_url: non_empty(item.poster_url),
                poster_source: non_empty(item.poster_source),
                poster_source_url: non_empty(item.poster_source_url),
                cast: item.cast.into_iter().map(person).collect(),
                director: person(item.director),
                duration: item.duration,
                full_reason: non_empty(item.full_reason),
                trailer_url: non_empty(item.trailer_url),
            })
        })
        .collect()
}

fn person(raw: RawPerson) -> Person {
    Person {
        name: raw.name,
        photo_url: non_empty(raw.photo_url),
    }
}

/// Collapse blank strings into the explicit absence marker so the view never
/// mistakes an empty value for real data.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_batch(value: serde_json::Value) -> Vec<RawItem> {
        serde_json::from_value(value).expect("raw batch deserialize")
    }

    fn minimal_item(title: &str) -> serde_json::Value {
        json!({
            "title": title,
            "type": "Movie",
            "summary": "A summary.",
            "streamingPlatforms": [],
            "cast": [],
            "director": { "name": "Someone" },
            "duration": "100 min"
        })
    }

    #[test]
    fn missing_optionals_surface_as_explicit_absence() {
        let items = into_media_items(raw_batch(json!([minimal_item("Heat")])), 42).unwrap();
        let item = &items[0];
        assert_eq!(item.review_score, None);
        assert_eq!(item.review_snippet, None);
        assert_eq!(item.poster_url, None);
        assert_eq!(item.trailer_url, None);
        assert_eq!(item.year, None);
        assert_eq!(item.director.photo_url, None);
        assert!(item.genres.is_empty());
    }

    #[test]
    fn blank_optional_strings_collapse_to_absence() {
        let mut value = minimal_item("Heat");
        value["trailerUrl"] = json!("  ");
        value["cast"] = json!([{ "name": "Al Pacino", "photoUrl": "" }]);
        let items = into_media_items(raw_batch(json!([value])), 42).unwrap();
        assert_eq!(items[0].trailer_url, None);
        assert_eq!(items[0].cast[0].photo_url, None);
    }

    #[test]
    fn ids_are_unique_and_keep_provider_order() {
        let batch = json!([minimal_item("First"), minimal_item("Second"), minimal_item("Third")]);
        let items = into_media_items(raw_batch(batch), 1700000000000).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].id, "rec-0-1700000000000");
        assert_eq!(items[1].id, "rec-1-1700000000000");
        assert_eq!(items[2].id, "rec-2-1700000000000");
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn blank_title_fails_the_batch() {
        let batch = json!([minimal_item("Good"), minimal_item("   ")]);
        let err = into_media_items(raw_batch(batch), 7).unwrap_err();
        assert!(err.to_string().contains("empty title"));
    }

    #[test]
    fn missing_required_field_is_a_parse_error() {
        let mut value = minimal_item("Heat");
        value.as_object_mut().unwrap().remove("director");
        let parsed: Result<Vec<RawItem>, _> = serde_json::from_value(json!([value]));
        assert!(parsed.is_err());
    }

    #[test]
    fn populated_fields_pass_through_unchanged() {
        let mut value = minimal_item("Heat");
        value["year"] = json!("1995");
        value["genres"] = json!(["Crime", "Thriller"]);
        value["reviewScore"] = json!(8.5);
        value["streamingPlatforms"] =
            json!([{ "name": "Netflix", "url": "https://netflix.com/heat" }]);
        value["cast"] = json!([
            { "name": "Al Pacino", "photoUrl": "https://example.com/pacino.jpg" },
            { "name": "Robert De Niro" }
        ]);
        let items = into_media_items(raw_batch(json!([value])), 7).unwrap();
        let item = &items[0];
        assert_eq!(item.year.as_deref(), Some("1995"));
        assert_eq!(item.genres, vec!["Crime", "Thriller"]);
        assert_eq!(item.review_score, Some(8.5));
        assert_eq!(item.streaming_platforms[0].name, "Netflix");
        assert_eq!(
            item.cast[0].photo_url.as_deref(),
            Some("https://example.com/pacino.jpg")
        );
        assert_eq!(item.cast[1].photo_url, None);
    }
}
