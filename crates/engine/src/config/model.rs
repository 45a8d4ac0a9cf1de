//! Data models for the stitch configuration file.

use std::{sync::Arc, time::Duration};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stitch_api::{ApiError, CredentialSource, StitchClient};
use stitch_types::LookupConfig;

use crate::lookup::LookupSettings;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Top-level configuration: API connection, lookup tuning and the form's
/// lookup field declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchConfig {
    pub api: ApiSettings,
    pub lookups: LookupSettings,
    /// Lookup declarations keyed by field path, in declaration order.
    pub fields: IndexMap<String, LookupConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Defaults to `stitch/<version>; <os>` when unset.
    pub user_agent: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build a client for these settings.
    pub fn build_client(&self, credentials: Arc<dyn CredentialSource>) -> Result<StitchClient, ApiError> {
        let mut builder = StitchClient::builder(&self.base_url)
            .timeout(self.timeout())
            .credentials(credentials);
        if let Some(user_agent) = self.user_agent.as_deref().filter(|value| !value.trim().is_empty()) {
            builder = builder.user_agent(user_agent);
        }
        builder.build()
    }
}
