//! Lookup field resolution: strategies, normalization, admission and caching.

mod cache;
mod dispatch;
mod fingerprint;
mod normalize;
mod orchestrator;
mod settings;
mod strategy;
mod transport;

#[cfg(test)]
mod testing;

pub use cache::LookupSnapshot;
pub use dispatch::{DispatchPermit, DispatchQueue};
pub use normalize::{extract_items, item_id, map_to_option, matches_brand, normalize_options};
pub use orchestrator::{LOOKUP_CANCELLED_MESSAGE, LookupFuture, LookupOrchestrator};
pub use settings::{DEFAULT_DISPATCH_SPACING_MS, DEFAULT_MAX_CONCURRENT, LookupSettings};
pub use strategy::{FACTORY_EXHAUSTED_MESSAGE, OPTIONS_EXHAUSTED_MESSAGE, resolve_entity, resolve_factory, resolve_lookup};
pub use transport::LookupTransport;
