//! Core types and traits for the Pinhole short-link engine.
//!
//! This crate provides the data model shared by the registry, the
//! redirector and the storage adapters, together with the narrow
//! key-value interface the engine persists through.

pub mod clock;
pub mod error;
pub mod link;
pub mod lookup;
pub mod shortcode;
pub mod store;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-util"))]
pub use clock::ManualClock;
pub use error::{LinkError, Result, StorageError};
pub use link::{ClickEvent, LinkStatus, ShortLink, Validity};
pub use lookup::{LinkLookup, LinkTarget};
pub use shortcode::ShortCode;
pub use store::KeyValueStore;
