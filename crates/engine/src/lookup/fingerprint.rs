//! Cache keys for lookup configurations.

use std::hash::{DefaultHasher, Hash, Hasher};

use stitch_types::LookupConfig;

/// Stable key identifying a lookup configuration.
///
/// Two fields declaring the same configuration share a fingerprint, which is
/// what lets their in-flight resolutions be shared. The endpoint is kept
/// readable in front of the hash for log output.
pub(crate) fn config_fingerprint(config: &LookupConfig) -> String {
    let mut hasher = DefaultHasher::new();
    config.hash(&mut hasher);
    format!("{}:{:016x}", config.endpoint.trim(), hasher.finish())
}
