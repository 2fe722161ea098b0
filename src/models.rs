use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fixed genre vocabulary offered as selectable filters, in display order.
/// Selections are validated against this set; the provider receives the tags
/// verbatim as a hint, not a hard filter.
pub const AVAILABLE_GENRES: [&str; 31] = [
    "Action",
    "Adventure",
    "Animation",
    "Biography",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Family",
    "Fantasy",
    "History",
    "Horror",
    "Music",
    "Musical",
    "Mystery",
    "Romance",
    "Sci-Fi",
    "Sport",
    "Thriller",
    "War",
    "Western",
    "Superhero",
    "Cyberpunk",
    "Dystopian",
    "Noir",
    "Post-Apocalyptic",
    "Heist",
    "Psychological",
    "Supernatural",
    "Space",
    "Satire",
];

static GENRE_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| AVAILABLE_GENRES.into_iter().collect());

pub fn is_known_genre(name: &str) -> bool {
    GENRE_SET.contains(name)
}

/// Serialized as the wire discriminator `type` with the two display values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "Movie")]
    Movie,
    #[serde(rename = "TV Show")]
    TvShow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub name: String,
    /// `None` means the provider found no usable photo. Never an empty
    /// string; the view needs to tell "no photo" apart from a blank value.
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingPlatform {
    pub name: String,
    pub url: String,
}

/// One recommended title as handed to the view layer.
///
/// The id is stamped locally after receipt (batch index plus request-time
/// timestamp). It is unique within one batch and meaningless outside the
/// in-memory session; it must not be persisted or compared across searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: MediaType,
    #[serde(default)]
    pub year: Option<String>,
    /// Ordered as returned; not deduplicated against the fixed vocabulary.
    #[serde(default)]
    pub genres: Vec<String>,
    pub summary: String,
    #[serde(default)]
    pub review_score: Option<f32>,
    #[serde(default)]
    pub review_snippet: Option<String>,
    pub streaming_platforms: Vec<StreamingPlatform>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub poster_source: Option<String>,
    #[serde(default)]
    pub poster_source_url: Option<String>,
    pub cast: Vec<Person>,
    pub director: Person,
    /// Free text, e.g. "142 min" or "3 seasons".
    pub duration: String,
    #[serde(default)]
    pub full_reason: Option<String>,
    /// Provider-supplied watch link; not guaranteed to be canonical.
    #[serde(default)]
    pub trailer_url: Option<String>,
}
