use crate::cli::Command;
use anyhow::Context;
use pinhole_core::{Clock, KeyValueStore, LinkError, ShortCode, SystemClock};
use pinhole_generator::Generator;
use pinhole_redirector::{ExpiryPolicy, RedirectorService};
use pinhole_registry::{ClickTracker, CreateLink, LinkRegistry};
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// One invocation of the CLI: a loaded registry plus the resolver and
/// tracker that work against it.
pub struct Session<S, G, C = SystemClock> {
    registry: Arc<LinkRegistry<S, G, C>>,
    resolver: RedirectorService<LinkRegistry<S, G, C>, C>,
    tracker: ClickTracker,
}

impl<S, G, C> Session<S, G, C>
where
    S: KeyValueStore,
    G: Generator,
    C: Clock + Clone,
{
    pub fn new(registry: Arc<LinkRegistry<S, G, C>>, policy: ExpiryPolicy) -> Self {
        let resolver =
            RedirectorService::with_clock(Arc::clone(&registry), registry.clock().clone(), policy);
        Self {
            registry,
            resolver,
            tracker: ClickTracker::default(),
        }
    }

    /// Runs `command`, writing its result to `out`.
    pub async fn execute(&self, command: Command, out: &mut impl Write) -> anyhow::Result<()> {
        debug!(?command, "executing command");

        match command {
            Command::Create {
                url,
                validity,
                code,
            } => {
                let params = CreateLink {
                    original_url: url.clone(),
                    validity_minutes: validity,
                    preferred_code: code,
                };
                let link = self
                    .registry
                    .create(params)
                    .await
                    .with_context(|| format!("failed to shorten {url}"))?;
                writeln!(out, "{}", link.short_url())?;
            }
            Command::List => {
                let now = self.registry.clock().now();
                for link in self.registry.list().await {
                    writeln!(
                        out,
                        "{}\t{}\t{}\t{}\t{}",
                        link.shortcode(),
                        link.status_at(now),
                        link.clicks().len(),
                        link.expires_at(),
                        link.original_url()
                    )?;
                }
            }
            Command::Show { code } => {
                let link = self.registry.find_by_code(&ShortCode::new(code)).await?;
                writeln!(out, "{}", serde_json::to_string_pretty(&link)?)?;
            }
            Command::Resolve { code } => {
                let url = self.resolver.resolve(&ShortCode::new(code)).await?;
                writeln!(out, "{url}")?;
            }
            Command::Click {
                code,
                source,
                location,
            } => {
                let code = ShortCode::new(code);
                let link = self
                    .tracker
                    .record(&self.registry, &code, &source, &location)
                    .await?;
                writeln!(out, "{}\t{}", code, link.clicks().len())?;
            }
            Command::Open { path } => {
                let code = ShortCode::from_path(&path)
                    .ok_or_else(|| LinkError::NotFound(path.clone()))?;
                let url = self.resolver.resolve(&code).await?;
                self.tracker
                    .record_default(&self.registry, &code)
                    .await
                    .with_context(|| format!("failed to record visit to {code}"))?;
                writeln!(out, "{url}")?;
            }
            Command::Delete { code } => {
                let code = ShortCode::new(code);
                if !self.registry.delete(&code).await? {
                    return Err(LinkError::NotFound(code.to_string()).into());
                }
                writeln!(out, "{code}")?;
            }
            Command::Purge => {
                let removed = self.registry.purge_expired().await?;
                writeln!(out, "{removed}")?;
            }
        }

        Ok(())
    }
}
