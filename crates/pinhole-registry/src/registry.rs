use crate::codec::{self, LINKS_KEY, MAPPINGS_KEY};
use async_trait::async_trait;
use pinhole_core::link::validate_url;
use pinhole_core::{
    ClickEvent, Clock, KeyValueStore, LinkError, LinkLookup, LinkTarget, Result, ShortCode,
    ShortLink, SystemClock, Validity,
};
use pinhole_generator::{assign_code, Generator};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;
use tracing::{debug, info, trace, warn};
use typed_builder::TypedBuilder;

/// Base URL short links are rendered against when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Configures a [`LinkRegistry`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct RegistrySettings {
    /// Prefix of every `shortUrl`, e.g. `https://pin.example`.
    #[builder(default = DEFAULT_BASE_URL.to_string(), setter(into))]
    pub base_url: String,
    /// Validity used when a create request does not name one.
    #[builder(default)]
    pub default_validity: Validity,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Parameters for creating a short link.
#[derive(Debug, Clone, TypedBuilder)]
pub struct CreateLink {
    /// The URL the short link redirects to.
    #[builder(setter(into))]
    pub original_url: String,
    /// Lifetime in minutes. `None` falls back to the registry default; an
    /// explicit non-positive value is rejected.
    #[builder(default, setter(strip_option))]
    pub validity_minutes: Option<i64>,
    /// Code the user asked for, if any.
    #[builder(default, setter(strip_option, into))]
    pub preferred_code: Option<String>,
}

#[derive(Debug, Default)]
struct RegistryState {
    /// Creation order.
    links: Vec<ShortLink>,
    /// Position of each code in `links`.
    index: HashMap<ShortCode, usize>,
}

impl RegistryState {
    fn from_links(links: Vec<ShortLink>) -> Self {
        let index = index_of(&links);
        Self { links, index }
    }

    fn get(&self, code: &str) -> Option<&ShortLink> {
        self.index.get(code).map(|&position| &self.links[position])
    }
}

fn index_of(links: &[ShortLink]) -> HashMap<ShortCode, usize> {
    links
        .iter()
        .enumerate()
        .map(|(position, link)| (link.shortcode().clone(), position))
        .collect()
}

/// Owns every [`ShortLink`] and keeps the store in step with them.
///
/// The collection is read once in [`LinkRegistry::open`]; afterwards each
/// mutation builds the next collection, writes it (together with the derived
/// shortcode mapping) in one `set_many`, and only then swaps it in. A
/// failed write leaves both the store and the registry as they were.
///
/// Mutations hold the state's write lock across the store write, so
/// concurrent callers are applied one at a time and none is lost.
pub struct LinkRegistry<S, G, C = SystemClock> {
    store: S,
    generator: G,
    clock: C,
    settings: RegistrySettings,
    state: RwLock<RegistryState>,
}

impl<S: KeyValueStore, G: Generator> LinkRegistry<S, G, SystemClock> {
    /// Loads the registry from `store` using the system clock.
    pub async fn open(store: S, generator: G, settings: RegistrySettings) -> Result<Self> {
        Self::open_with_clock(store, generator, SystemClock, settings).await
    }
}

impl<S: KeyValueStore, G: Generator, C: Clock> LinkRegistry<S, G, C> {
    /// Loads the registry from `store`.
    ///
    /// Fails if the stored collection cannot be parsed. A stored mapping
    /// that is missing, unreadable, or out of step with the collection is
    /// rewritten from the collection.
    pub async fn open_with_clock(
        store: S,
        generator: G,
        clock: C,
        settings: RegistrySettings,
    ) -> Result<Self> {
        let raw_links = store.get(LINKS_KEY).await?;
        let links = codec::decode_links(raw_links.as_deref())?;

        let expected = codec::mappings_of(&links);
        let raw_mappings = store.get(MAPPINGS_KEY).await?;
        let stale = match codec::decode_mappings(raw_mappings.as_deref()) {
            Ok(Some(stored)) => stored != expected,
            Ok(None) => !links.is_empty(),
            Err(e) => {
                warn!(key = MAPPINGS_KEY, error = %e, "stored mapping is unreadable");
                true
            }
        };

        if stale {
            warn!(links = links.len(), "rebuilding shortcode mapping from link collection");
            store.set_many(codec::encode(&links)?).await?;
        }

        info!(links = links.len(), "link registry loaded");

        Ok(Self {
            store,
            generator,
            clock,
            settings,
            state: RwLock::new(RegistryState::from_links(links)),
        })
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Creates a short link and persists it.
    pub async fn create(&self, params: CreateLink) -> Result<ShortLink> {
        validate_url(&params.original_url)?;

        let validity = match params.validity_minutes {
            Some(minutes) => Validity::minutes(minutes)?,
            None => self.settings.default_validity,
        };

        let mut state = self.state.write().await;

        let code = assign_code(
            &self.generator,
            params.preferred_code.as_deref(),
            &state.index,
        )?;

        let link = ShortLink::new(
            params.original_url,
            code,
            &self.settings.base_url,
            self.clock.now(),
            validity,
        )?;

        let mut next = state.links.clone();
        next.push(link.clone());
        self.persist(&next).await?;

        state.index.insert(link.shortcode().clone(), next.len() - 1);
        state.links = next;

        info!(
            code = %link.shortcode(),
            url = %link.original_url(),
            expires_at = %link.expires_at(),
            "short link created"
        );
        Ok(link)
    }

    /// Returns every link in creation order.
    pub async fn list(&self) -> Vec<ShortLink> {
        self.state.read().await.links.clone()
    }

    /// Returns the link holding `code`.
    pub async fn find_by_code(&self, code: &ShortCode) -> Result<ShortLink> {
        self.state
            .read()
            .await
            .get(code.as_str())
            .cloned()
            .ok_or_else(|| LinkError::NotFound(code.to_string()))
    }

    /// Returns every code currently held, expired ones included.
    pub async fn codes(&self) -> BTreeSet<ShortCode> {
        self.state.read().await.index.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.links.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.links.is_empty()
    }

    /// Removes the link holding `code`, freeing the code for reuse.
    ///
    /// Returns `true` if a link was removed.
    pub async fn delete(&self, code: &ShortCode) -> Result<bool> {
        let removed = self.retain(|link| link.shortcode() != code).await?;
        if removed > 0 {
            info!(code = %code, "short link deleted");
        }
        Ok(removed > 0)
    }

    /// Removes every link that has expired by now. Returns how many went.
    pub async fn purge_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let removed = self.retain(|link| !link.is_expired_at(now)).await?;
        info!(removed, "expired short links purged");
        Ok(removed)
    }

    /// Appends a click to the link holding `code`. Only the click tracker
    /// mutates clicks.
    pub(crate) async fn append_click(
        &self,
        code: &ShortCode,
        source: &str,
        location: &str,
    ) -> Result<ShortLink> {
        let mut state = self.state.write().await;

        let position = *state
            .index
            .get(code.as_str())
            .ok_or_else(|| LinkError::NotFound(code.to_string()))?;

        let click = ClickEvent::new(self.clock.now(), source, location);

        let mut next = state.links.clone();
        next[position].push_click(click);
        self.persist(&next).await?;

        let link = next[position].clone();
        state.links = next;

        debug!(
            code = %code,
            clicks = link.clicks().len(),
            source,
            location,
            "click recorded"
        );
        Ok(link)
    }

    async fn retain<F>(&self, keep: F) -> Result<usize>
    where
        F: Fn(&ShortLink) -> bool,
    {
        let mut state = self.state.write().await;

        let next: Vec<ShortLink> = state.links.iter().filter(|link| keep(link)).cloned().collect();
        let removed = state.links.len() - next.len();
        if removed == 0 {
            return Ok(0);
        }

        self.persist(&next).await?;
        *state = RegistryState::from_links(next);
        Ok(removed)
    }

    async fn persist(&self, links: &[ShortLink]) -> Result<()> {
        let entries = codec::encode(links)?;
        self.store.set_many(entries).await.map_err(|e| {
            warn!(error = %e, "failed to persist link registry");
            LinkError::from(e)
        })?;
        trace!(links = links.len(), "link registry persisted");
        Ok(())
    }
}

#[async_trait]
impl<S: KeyValueStore, G: Generator, C: Clock> LinkLookup for LinkRegistry<S, G, C> {
    async fn lookup(&self, code: &ShortCode) -> Result<Option<LinkTarget>> {
        Ok(self
            .state
            .read()
            .await
            .get(code.as_str())
            .map(|link| LinkTarget {
                original_url: link.original_url().to_string(),
                expires_at: link.expires_at(),
            }))
    }
}
