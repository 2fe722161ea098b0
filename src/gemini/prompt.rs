/// How many titles one search asks for.
pub(crate) const RESULT_COUNT: usize = 6;

/// Natural-language instruction sent with every request. The genre clause is
/// a hint to the provider, not a hard filter, and is only present when the
/// user selected at least one tag.
pub(crate) fn build_prompt(query: &str, selected_genres: &[String]) -> String {
    let genre_context = if selected_genres.is_empty() {
        String::new()
    } else {
        format!(
            "The user is specifically interested in these genres: {}.",
            selected_genres.join(", ")
        )
    };

    format!(
        r#"Find {RESULT_COUNT} highly relevant movies or TV shows based on: "{query}".
Context: {genre_context}

IMAGE & VIDEO GUIDELINES:
1. POSTER: Primarily use the googleSearch tool to find official posters from IMDb (imdb.com).
2. TRAILER: Use the googleSearch tool to find the official YouTube trailer.
   CRITICAL: 'trailerUrl' MUST be a direct watch link.
3. CAST & DIRECTOR PHOTOS: Use the googleSearch tool to find official headshots or high-quality portraits for the director and each main cast member.
   - 'photoUrl' should be a direct link to the image.
   - If no specific photo is found, use null.
4. IMAGE URL: 'posterUrl' should be a direct link to the high-resolution poster image.
5. SOURCE PAGE: 'posterSourceUrl' should be the direct IMDb title page URL.
6. CREDIT: Set 'posterSource' to "IMDb".
7. FLEXIBILITY: Prioritize content relevance. If assets are missing, use null.

Return the data in the specified JSON schema."#
    )
}
