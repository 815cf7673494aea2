use std::sync::Arc;

use crate::redirector::Redirector;
use async_trait::async_trait;
use pinhole_core::{Clock, LinkError, LinkLookup, Result, ShortCode, SystemClock};
use tracing::{debug, trace};

/// Whether resolution looks at a link's expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryPolicy {
    /// Any code present in the index resolves, expired or not.
    #[default]
    Ignore,
    /// Codes whose link has expired resolve as `NotFound`.
    Enforce,
}

/// Service for handling short-link redirects.
///
/// Uses a read-only lookup to map codes to targets. Resolution is a pure
/// read: recording the visit is the click tracker's job.
#[derive(Debug, Clone)]
pub struct RedirectorService<L, C = SystemClock> {
    lookup: Arc<L>,
    clock: C,
    policy: ExpiryPolicy,
}

impl<L: LinkLookup> RedirectorService<L, SystemClock> {
    /// Creates a resolver that ignores expiry.
    pub fn new(lookup: Arc<L>) -> Self {
        Self::with_clock(lookup, SystemClock, ExpiryPolicy::default())
    }

    /// Creates a resolver with an explicit expiry policy.
    pub fn with_policy(lookup: Arc<L>, policy: ExpiryPolicy) -> Self {
        Self::with_clock(lookup, SystemClock, policy)
    }
}

impl<L: LinkLookup, C: Clock> RedirectorService<L, C> {
    pub fn with_clock(lookup: Arc<L>, clock: C, policy: ExpiryPolicy) -> Self {
        Self {
            lookup,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> ExpiryPolicy {
        self.policy
    }

    /// Resolves a short code to its original URL.
    ///
    /// # Returns
    ///
    /// * `Ok(url)` - The original URL the caller should navigate to
    /// * `Err(LinkError::NotFound)` - No link holds the code (or, under
    ///   [`ExpiryPolicy::Enforce`], its link has expired)
    /// * `Err(e)` - The lookup itself failed
    pub async fn resolve(&self, code: &ShortCode) -> Result<String> {
        Redirector::resolve(self, code).await
    }

    /// Resolves a navigation path of shape `/{shortcode}`.
    pub async fn resolve_path(&self, path: &str) -> Result<String> {
        let code = ShortCode::from_path(path).ok_or_else(|| LinkError::NotFound(path.to_string()))?;
        self.resolve(&code).await
    }
}

#[async_trait]
impl<L: LinkLookup, C: Clock> Redirector for RedirectorService<L, C> {
    async fn resolve(&self, code: &ShortCode) -> Result<String> {
        trace!(code = %code, "resolving short code");

        let Some(target) = self.lookup.lookup(code).await? else {
            debug!(code = %code, "short code not found");
            return Err(LinkError::NotFound(code.to_string()));
        };

        if self.policy == ExpiryPolicy::Enforce && self.clock.now() > target.expires_at {
            debug!(code = %code, expires_at = %target.expires_at, "short link has expired");
            return Err(LinkError::NotFound(code.to_string()));
        }

        debug!(code = %code, url = %target.original_url, "resolved short code");
        Ok(target.original_url)
    }
}
