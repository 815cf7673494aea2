//! Redirect resolution for short links.
//!
//! This crate provides a [`RedirectorService`] that maps a short code, or a
//! `/{shortcode}` navigation path, to the URL the caller should navigate to.
//! It reads through the [`LinkLookup`](pinhole_core::LinkLookup) view and
//! never mutates anything.
//!
//! # Example
//!
//! ```rust,no_run
//! use pinhole_core::ShortCode;
//! use pinhole_generator::UuidGenerator;
//! use pinhole_redirector::RedirectorService;
//! use pinhole_registry::{CreateLink, LinkRegistry, RegistrySettings};
//! use pinhole_storage::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(
//!     LinkRegistry::open(MemoryStore::new(), UuidGenerator::new(), RegistrySettings::default())
//!         .await?,
//! );
//! let link = registry
//!     .create(CreateLink::builder().original_url("https://example.com").build())
//!     .await?;
//!
//! let redirector = RedirectorService::new(Arc::clone(&registry));
//! let target = redirector.resolve(link.shortcode()).await?;
//! println!("Redirect to: {}", target);
//! # Ok(())
//! # }
//! ```

pub mod redirector;
pub mod service;

pub use redirector::Redirector;
pub use service::{ExpiryPolicy, RedirectorService};
