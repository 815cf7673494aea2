use crate::error::{LinkError, Result};
use crate::shortcode::ShortCode;
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

const ALLOWED_SCHEMES: [&str; 2] = ["http://", "https://"];
const MAX_MINUTES: i64 = i64::MAX / 60;

/// How long a link stays nominally active, in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Validity(i64);

impl Validity {
    /// Validity applied when the caller does not pick one.
    pub const DEFAULT_MINUTES: i64 = 30;

    /// Fails with [`LinkError::InvalidValidity`] unless `minutes > 0`.
    pub fn minutes(minutes: i64) -> Result<Self> {
        if minutes <= 0 || minutes > MAX_MINUTES {
            return Err(LinkError::InvalidValidity(minutes));
        }
        Ok(Self(minutes))
    }

    pub fn as_minutes(&self) -> i64 {
        self.0
    }

    pub fn as_duration(&self) -> SignedDuration {
        SignedDuration::from_mins(self.0)
    }
}

impl Default for Validity {
    fn default() -> Self {
        Self(Self::DEFAULT_MINUTES)
    }
}

/// Derived lifecycle state of a [`ShortLink`]. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Active,
    Expired,
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkStatus::Active => f.write_str("active"),
            LinkStatus::Expired => f.write_str("expired"),
        }
    }
}

/// One recorded visit to a short link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub timestamp: Timestamp,
    /// Origin of the visit. Opaque to the engine.
    pub source: String,
    /// Coarse geographic label. Opaque to the engine.
    pub location: String,
}

impl ClickEvent {
    pub fn new(
        timestamp: Timestamp,
        source: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            source: source.into(),
            location: location.into(),
        }
    }
}

/// A persisted short link: target URL, timestamps and click history.
///
/// Everything but `clicks` is fixed at creation. Clicks can only be
/// appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortLink {
    original_url: String,
    short_url: String,
    shortcode: ShortCode,
    created_at: Timestamp,
    expires_at: Timestamp,
    clicks: Vec<ClickEvent>,
}

impl ShortLink {
    /// Builds a fresh link with no clicks.
    ///
    /// The URL is checked here and nowhere else; links read back from
    /// storage are trusted.
    pub fn new(
        original_url: impl Into<String>,
        shortcode: ShortCode,
        base_url: &str,
        created_at: Timestamp,
        validity: Validity,
    ) -> Result<Self> {
        let original_url = original_url.into();
        validate_url(&original_url)?;

        let expires_at = created_at
            .checked_add(validity.as_duration())
            .map_err(|_| LinkError::InvalidValidity(validity.as_minutes()))?;

        Ok(Self {
            original_url,
            short_url: shortcode.to_url(base_url),
            shortcode,
            created_at,
            expires_at,
            clicks: Vec::new(),
        })
    }

    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    pub fn short_url(&self) -> &str {
        &self.short_url
    }

    pub fn shortcode(&self) -> &ShortCode {
        &self.shortcode
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    pub fn clicks(&self) -> &[ClickEvent] {
        &self.clicks
    }

    pub fn status_at(&self, now: Timestamp) -> LinkStatus {
        if now > self.expires_at {
            LinkStatus::Expired
        } else {
            LinkStatus::Active
        }
    }

    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.status_at(now) == LinkStatus::Expired
    }

    /// Appends a click. Existing clicks are never touched.
    pub fn push_click(&mut self, click: ClickEvent) {
        self.clicks.push(click);
    }

    /// Checks the invariants a record must hold after being read back.
    pub fn check_integrity(&self) -> std::result::Result<(), String> {
        if self.shortcode.is_empty() {
            return Err("short link has an empty shortcode".to_string());
        }
        if self.expires_at <= self.created_at {
            return Err(format!(
                "short link '{}' expires at {} which is not after its creation at {}",
                self.shortcode, self.expires_at, self.created_at
            ));
        }
        Ok(())
    }
}

/// Accepts only `http://` and `https://` URLs with something after the scheme.
pub fn validate_url(url: &str) -> Result<()> {
    let scheme = ALLOWED_SCHEMES
        .iter()
        .find(|scheme| {
            url.get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        })
        .ok_or_else(|| {
            LinkError::InvalidUrl(format!("URL must start with http:// or https://: {url}"))
        })?;

    if url.len() == scheme.len() {
        return Err(LinkError::InvalidUrl(format!("URL has no host: {url}")));
    }

    Ok(())
}
