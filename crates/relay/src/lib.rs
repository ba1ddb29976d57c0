//! Relay-backed image resolver.
//!
//! Third-party images can't be read directly from a page because of
//! cross-origin restrictions, so image URLs are routed through a relay that
//! fetches them server-side and answers with a JSON envelope whose
//! `contents` field holds the image as a base64 data URI.

pub mod relay;

pub use relay::{RelayConfig, RelayResolver, DEFAULT_RELAY_URL, DEFAULT_TIMEOUT_SECS};
