use std::time::Duration;

use serde::{Deserialize, Serialize};
use stitch_types::EmptyResultPolicy;

pub const DEFAULT_MAX_CONCURRENT: usize = 3;
pub const DEFAULT_DISPATCH_SPACING_MS: u64 = 500;

/// Tuning for lookup dispatch and the fallback policies of the strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupSettings {
    /// Resolutions allowed in flight at once.
    pub max_concurrent: usize,
    /// Minimum gap between two dispatches, in milliseconds.
    pub dispatch_spacing_ms: u64,
    pub empty_result_policy: EmptyResultPolicy,
    /// Endpoint tried after a failed authenticated `catalogs` request.
    /// Unset by default: retrying `catalogs` itself cannot change the outcome.
    pub catalog_retry_endpoint: Option<String>,
    /// Endpoints probed, in order, by the factory strategy.
    pub factory_endpoints: Vec<String>,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            dispatch_spacing_ms: DEFAULT_DISPATCH_SPACING_MS,
            empty_result_policy: EmptyResultPolicy::default(),
            catalog_retry_endpoint: None,
            factory_endpoints: vec!["factory".to_string(), "factories".to_string()],
        }
    }
}

impl LookupSettings {
    pub fn dispatch_spacing(&self) -> Duration {
        Duration::from_millis(self.dispatch_spacing_ms)
    }
}
