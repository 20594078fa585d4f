use serde::{Deserialize, Deserializer, Serialize};

pub const PAGE_SIZE: usize = 12;

pub const DEFAULT_BASE_URL: &str = "https://api.artic.edu/api/v1";

/// One artwork as returned by the `/artworks` listing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Record {
    pub id: u64,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub place_of_origin: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub artist_display: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub inscriptions: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub date_start: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub date_end: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageResult {
    pub records: Vec<Record>,
    pub total: usize,
}

impl PageResult {
    pub fn empty(total: usize) -> Self {
        Self {
            records: Vec::new(),
            total,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtworksEnvelope {
    #[serde(default)]
    pub(crate) data: Vec<Record>,
    pub(crate) pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Pagination {
    pub(crate) total: usize,
}

impl From<ArtworksEnvelope> for PageResult {
    fn from(envelope: ArtworksEnvelope) -> Self {
        Self {
            records: envelope.data,
            total: envelope.pagination.total,
        }
    }
}

fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

/// `ceil(total / page_size)`; zero when `page_size` is zero.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

pub fn page_offset(page: usize, page_size: usize) -> usize {
    page.saturating_sub(1).saturating_mul(page_size)
}
