use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A previously uploaded image, as listed by `GET /uploads`.
///
/// Server-owned: the client never edits items, it re-fetches the full list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub filename: String,
    pub url: String,
    /// Upload time. `None` when the server sent something unparseable.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl GalleryItem {
    /// Lowercased text the search box matches against.
    pub fn search_text(&self) -> String {
        format!(
            "{} {}",
            self.filename.to_lowercase(),
            self.url.to_lowercase()
        )
    }
}

/// Response of `GET /uploads`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GalleryResponse {
    #[serde(default)]
    pub images: Vec<GalleryItem>,
}

/// Accepts RFC 3339, or a naive ISO-8601 local time which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}
