use serde_json::{json, Value};

/// Output contract declared with every request, in the provider's response
/// schema dialect. Field names and the required set are the wire contract
/// the view layer was built against: required fields must always be
/// populated, everything else defaults to explicit null rather than a
/// fabricated placeholder.
pub(crate) fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "type": { "type": "STRING", "enum": ["Movie", "TV Show"] },
                "year": { "type": "STRING" },
                "genres": { "type": "ARRAY", "items": { "type": "STRING" } },
                "summary": { "type": "STRING" },
                "reviewScore": { "type": "NUMBER" },
                "reviewSnippet": { "type": "STRING" },
                "streamingPlatforms": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "name": { "type": "STRING" },
                            "url": { "type": "STRING" }
                        }
                    }
                },
                "posterUrl": { "type": "STRING" },
                "posterSource": { "type": "STRING" },
                "posterSourceUrl": { "type": "STRING" },
                "cast": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "name": { "type": "STRING" },
                            "photoUrl": { "type": "STRING", "nullable": true }
                        },
                        "required": ["name"]
                    }
                },
                "director": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "photoUrl": { "type": "STRING", "nullable": true }
                    },
                    "required": ["name"]
                },
                "duration": { "type": "STRING" },
                "fullReason": { "type": "STRING" },
                "trailerUrl": { "type": "STRING", "description": "Direct YouTube watch URL" }
            },
            "required": [
                "title", "type", "summary", "streamingPlatforms", "cast",
                "director", "duration"
            ]
        }
    })
}
