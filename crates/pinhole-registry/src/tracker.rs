use crate::registry::LinkRegistry;
use pinhole_core::{Clock, KeyValueStore, Result, ShortCode, ShortLink};
use pinhole_generator::Generator;
use typed_builder::TypedBuilder;

/// Source label used when the caller has no real visit context.
pub const DEFAULT_SOURCE: &str = "localhost";
/// Location label used when the caller has no geolocation.
pub const DEFAULT_LOCATION: &str = "India";

/// Records visits against a [`LinkRegistry`].
///
/// `source` and `location` are stored exactly as given.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ClickTracker {
    #[builder(default = DEFAULT_SOURCE.to_string(), setter(into))]
    default_source: String,
    #[builder(default = DEFAULT_LOCATION.to_string(), setter(into))]
    default_location: String,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClickTracker {
    /// Appends a click to the link holding `code` and returns the updated
    /// link. Fails with `NotFound` for unknown codes; expired links still
    /// accept clicks.
    pub async fn record<S, G, C>(
        &self,
        registry: &LinkRegistry<S, G, C>,
        code: &ShortCode,
        source: &str,
        location: &str,
    ) -> Result<ShortLink>
    where
        S: KeyValueStore,
        G: Generator,
        C: Clock,
    {
        registry.append_click(code, source, location).await
    }

    /// Like [`ClickTracker::record`], with the tracker's default labels.
    pub async fn record_default<S, G, C>(
        &self,
        registry: &LinkRegistry<S, G, C>,
        code: &ShortCode,
    ) -> Result<ShortLink>
    where
        S: KeyValueStore,
        G: Generator,
        C: Clock,
    {
        self.record(registry, code, &self.default_source, &self.default_location)
            .await
    }

    pub fn default_source(&self) -> &str {
        &self.default_source
    }

    pub fn default_location(&self) -> &str {
        &self.default_location
    }
}
