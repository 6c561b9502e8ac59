use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Proposer name used when a song record does not carry one.
pub const DEFAULT_PROPOSER_NAME: &str = "익명";

/// Proposal comment used when a song record does not carry one.
pub const DEFAULT_PROPOSAL_COMMENT: &str = "반주곡 신청";

/// Genre vocabulary of the catalog and the two-character type code each
/// genre maps to. Keys match exactly (case-sensitive) after trimming.
pub const GENRE_CATALOG_CODES: &[(&str, &str)] = &[
    ("가요", "10"),
    ("POP", "20"),
    ("팝", "20"),
    ("J-POP", "30"),
    ("일본곡", "30"),
    ("중국곡", "40"),
    ("동요", "50"),
    ("CCM", "60"),
];

/// Look up the catalog-type code for a genre name.
pub fn catalog_code_for_genre(genre: &str) -> Option<&'static str> {
    let genre = genre.trim();
    GENRE_CATALOG_CODES
        .iter()
        .find(|(name, _)| *name == genre)
        .map(|(_, code)| *code)
}

/// One song to recommend or propose. Read-only input to the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRecord {
    #[serde(default, alias = "songTitle")]
    pub title: Option<String>,

    #[serde(default)]
    pub singer: Option<String>,

    /// Catalog index, when already known.
    #[serde(default, deserialize_with = "deserialize_index")]
    pub idx: Option<u64>,

    #[serde(default)]
    pub genre: Option<String>,

    /// Explicit catalog-type code; wins over `genre`.
    #[serde(default, alias = "dt_code")]
    pub dt_code: Option<String>,

    #[serde(default, alias = "po_name")]
    pub po_name: Option<String>,

    #[serde(default, alias = "po_content")]
    pub po_content: Option<String>,
}

impl SongRecord {
    pub fn new(title: impl Into<String>, singer: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            singer: Some(singer.into()),
            ..Self::default()
        }
    }

    /// Title and singer, if both are present and non-empty.
    pub fn title_and_singer(&self) -> Option<(&str, &str)> {
        let title = non_empty(self.title.as_deref())?;
        let singer = non_empty(self.singer.as_deref())?;
        Some((title, singer))
    }

    /// The catalog index given in the record. Zero counts as absent.
    pub fn given_index(&self) -> Option<u64> {
        self.idx.filter(|idx| *idx != 0)
    }

    /// Catalog-type code from the explicit field, else from the genre table.
    pub fn resolve_catalog_code(&self) -> Option<String> {
        if let Some(code) = non_empty(self.dt_code.as_deref()) {
            return Some(code.to_string());
        }
        non_empty(self.genre.as_deref())
            .and_then(catalog_code_for_genre)
            .map(str::to_string)
    }

    pub fn proposer_name(&self) -> &str {
        self.po_name.as_deref().unwrap_or(DEFAULT_PROPOSER_NAME)
    }

    pub fn proposal_comment(&self) -> &str {
        self.po_content.as_deref().unwrap_or(DEFAULT_PROPOSAL_COMMENT)
    }
}

impl fmt::Display for SongRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {}",
            self.title.as_deref().unwrap_or("?"),
            self.singer.as_deref().unwrap_or("?")
        )
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Settings files written by hand carry the index either as a number or as
/// a numeric string.
fn deserialize_index<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawIndex {
        Number(u64),
        Text(String),
    }

    match Option::<RawIndex>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawIndex::Number(n)) => Ok(Some(n)),
        Some(RawIndex::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse()
                .map(Some)
                .map_err(|e| serde::de::Error::custom(format!("invalid idx '{text}': {e}")))
        }
    }
}
