use crate::error::Result;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use std::sync::Arc;

/// What a short code points at, as seen by the redirect path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    /// The original URL that was shortened.
    pub original_url: String,
    /// When the link nominally expires.
    pub expires_at: Timestamp,
}

/// A read-only view over the shortcode index.
///
/// The redirector only needs this much; it never sees click history or
/// mutation methods.
#[async_trait]
pub trait LinkLookup: Send + Sync + 'static {
    /// Returns the target for `code`, or `None` if no link holds it.
    async fn lookup(&self, code: &ShortCode) -> Result<Option<LinkTarget>>;
}

#[async_trait]
impl<L: LinkLookup + ?Sized> LinkLookup for Arc<L> {
    async fn lookup(&self, code: &ShortCode) -> Result<Option<LinkTarget>> {
        (**self).lookup(code).await
    }
}
