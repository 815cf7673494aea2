use async_trait::async_trait;
use pinhole_core::{Result, ShortCode};

#[async_trait]
pub trait Redirector: Send + Sync + 'static {
    /// Resolves a short code to the URL to navigate to.
    /// Fails with `NotFound` if no link holds the code.
    async fn resolve(&self, code: &ShortCode) -> Result<String>;
}
