//! Configuration validation.

use stitch_types::LookupStrategyKind;
use thiserror::Error;
use tracing::debug;

use super::StitchConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("lookups.max_concurrent must be at least 1")]
    ZeroConcurrency,
    #[error("lookups.factory_endpoints must list at least one endpoint")]
    NoFactoryEndpoints,
    #[error("Field '{field}' has an empty endpoint")]
    EmptyEndpoint { field: String },
    #[error("Field '{field}' has an empty entity name")]
    EmptyEntityName { field: String },
}

/// Validate the entire configuration.
pub fn validate_config(config: &StitchConfig) -> Result<(), ValidationError> {
    if config.lookups.max_concurrent == 0 {
        return Err(ValidationError::ZeroConcurrency);
    }
    if config.lookups.factory_endpoints.iter().all(|endpoint| endpoint.trim().is_empty()) {
        return Err(ValidationError::NoFactoryEndpoints);
    }
    for (field, lookup) in &config.fields {
        let needs_endpoint = matches!(lookup.strategy_kind(), LookupStrategyKind::Entity);
        if needs_endpoint && lookup.endpoint.trim().is_empty() {
            return Err(ValidationError::EmptyEndpoint { field: field.clone() });
        }
        if lookup.options.is_none() && lookup.entity_name.trim().is_empty() && lookup.endpoint.trim().is_empty() {
            return Err(ValidationError::EmptyEntityName { field: field.clone() });
        }
        debug!(field = %field, "validated lookup field");
    }
    Ok(())
}
