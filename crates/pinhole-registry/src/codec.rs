//! Persisted layout of the registry.
//!
//! Two keys are written together on every mutation:
//!
//! ```text
//! pinhole:links     → JSON array of ShortLink, in creation order
//! pinhole:mappings  → JSON object { shortcode: originalUrl }
//! ```
//!
//! The link collection is the source of truth. The mappings object is a
//! projection of it, kept for readers that only need code → URL.

use pinhole_core::{Result, ShortCode, ShortLink, StorageError};
use std::collections::{BTreeMap, HashSet};

/// Key holding the full link collection.
pub const LINKS_KEY: &str = "pinhole:links";
/// Key holding the derived shortcode → URL mapping.
pub const MAPPINGS_KEY: &str = "pinhole:mappings";

pub(crate) type Mappings = BTreeMap<ShortCode, String>;

/// Serializes `links` into the entries to hand to the store.
pub(crate) fn encode(links: &[ShortLink]) -> Result<Vec<(String, String)>> {
    let collection = serde_json::to_string(links)
        .map_err(|e| StorageError::Serialization(format!("{LINKS_KEY}: {e}")))?;
    let mappings = serde_json::to_string(&mappings_of(links))
        .map_err(|e| StorageError::Serialization(format!("{MAPPINGS_KEY}: {e}")))?;

    Ok(vec![
        (LINKS_KEY.to_string(), collection),
        (MAPPINGS_KEY.to_string(), mappings),
    ])
}

pub(crate) fn mappings_of(links: &[ShortLink]) -> Mappings {
    links
        .iter()
        .map(|link| (link.shortcode().clone(), link.original_url().to_string()))
        .collect()
}

/// Parses the stored collection. A missing key is an empty registry;
/// anything unparseable or inconsistent is an error.
pub(crate) fn decode_links(raw: Option<&str>) -> Result<Vec<ShortLink>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    let links: Vec<ShortLink> = serde_json::from_str(raw)
        .map_err(|e| StorageError::InvalidData(format!("{LINKS_KEY}: {e}")))?;

    let mut seen = HashSet::with_capacity(links.len());
    for link in &links {
        link.check_integrity()
            .map_err(|e| StorageError::InvalidData(format!("{LINKS_KEY}: {e}")))?;
        if !seen.insert(link.shortcode().as_str()) {
            return Err(StorageError::InvalidData(format!(
                "{LINKS_KEY}: shortcode '{}' appears more than once",
                link.shortcode()
            ))
            .into());
        }
    }

    Ok(links)
}

/// Parses the stored mapping. Unlike the collection, a bad mapping is not
/// fatal: the caller rebuilds it from the links.
pub(crate) fn decode_mappings(raw: Option<&str>) -> std::result::Result<Option<Mappings>, String> {
    raw.map(|raw| serde_json::from_str(raw).map_err(|e| e.to_string()))
        .transpose()
}
