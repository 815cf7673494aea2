//! Short-link registry and click tracking.
//!
//! This crate owns the link collection: it creates links, keeps the
//! persisted copy in step with memory, and records visits. Core types are
//! re-exported from `pinhole_core`.

pub mod codec;
pub mod registry;
pub mod tracker;

pub use codec::{LINKS_KEY, MAPPINGS_KEY};
pub use pinhole_core::{ClickEvent, LinkError, LinkStatus, ShortCode, ShortLink};
pub use registry::{CreateLink, LinkRegistry, RegistrySettings, DEFAULT_BASE_URL};
pub use tracker::ClickTracker;
