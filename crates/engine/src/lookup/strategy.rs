//! Lookup resolution strategies.
//!
//! Each strategy turns a [`LookupConfig`] into a [`LookupResult`] and owns its
//! fallback policy. Failures never escape: every error is folded into
//! `LookupResult::Error` here.

use serde_json::Value;
use stitch_types::{EmptyResultPolicy, LookupConfig, LookupOption, LookupResult, LookupStrategyKind};
use tracing::{debug, warn};

use super::{
    LookupSettings, LookupTransport,
    normalize::{extract_items, matches_brand, options_from_items},
};

pub const FACTORY_EXHAUSTED_MESSAGE: &str = "Unable to load factory options";
pub const OPTIONS_EXHAUSTED_MESSAGE: &str = "Unable to load options";

const CATALOGS_ENDPOINT: &str = "catalogs";

/// Outcome of the last attempt a strategy made before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastAttempt {
    Succeeded,
    Failed,
}

/// Resolve options for `config` with the strategy its shape selects.
pub async fn resolve_lookup(transport: &dyn LookupTransport, config: &LookupConfig, settings: &LookupSettings) -> LookupResult {
    match config.strategy_kind() {
        LookupStrategyKind::Inline => {
            let options = config.options.clone().unwrap_or_default();
            LookupResult::Options(options)
        }
        LookupStrategyKind::Static(set) => LookupResult::Options(set.options()),
        LookupStrategyKind::Factory => resolve_factory(transport, config, settings).await,
        LookupStrategyKind::Entity => resolve_entity(transport, config, settings).await,
    }
}

/// Probe the factory endpoints in order; the first non-empty result wins.
///
/// A failed probe never stops the next one.
pub async fn resolve_factory(transport: &dyn LookupTransport, config: &LookupConfig, settings: &LookupSettings) -> LookupResult {
    let mut last_attempt = LastAttempt::Failed;
    for endpoint in &settings.factory_endpoints {
        match transport.fetch(endpoint, true).await {
            Ok(payload) => {
                let options = options_for_payload(&payload, config);
                debug!(endpoint = %endpoint, option_count = options.len(), "factory probe completed");
                if !options.is_empty() {
                    return LookupResult::Options(options);
                }
                last_attempt = LastAttempt::Succeeded;
            }
            Err(error) => {
                warn!(endpoint = %endpoint, error = %error, "factory probe failed");
                last_attempt = LastAttempt::Failed;
            }
        }
    }
    exhausted(settings.empty_result_policy, last_attempt, FACTORY_EXHAUSTED_MESSAGE)
}

/// Resolve a generic entity endpoint: authenticated first, then anonymous.
///
/// The anonymous retry only happens when the authenticated attempt failed
/// outright; an authenticated success with no usable records is final.
pub async fn resolve_entity(transport: &dyn LookupTransport, config: &LookupConfig, settings: &LookupSettings) -> LookupResult {
    let endpoint = config.endpoint.trim();

    let mut authenticated = transport.fetch(endpoint, true).await;
    if let Err(error) = &authenticated
        && endpoint.eq_ignore_ascii_case(CATALOGS_ENDPOINT)
        && let Some(retry_endpoint) = settings.catalog_retry_endpoint.as_deref()
    {
        warn!(endpoint = %endpoint, retry_endpoint = %retry_endpoint, error = %error, "catalog lookup failed, retrying");
        authenticated = transport.fetch(retry_endpoint, true).await;
    }

    let last_attempt = match authenticated {
        Ok(payload) => {
            let options = options_for_payload(&payload, config);
            debug!(endpoint = %endpoint, option_count = options.len(), "authenticated lookup completed");
            if !options.is_empty() {
                return LookupResult::Options(options);
            }
            LastAttempt::Succeeded
        }
        Err(error) => {
            warn!(endpoint = %endpoint, error = %error, "authenticated lookup failed, retrying without auth");
            match transport.fetch(endpoint, false).await {
                Ok(payload) => {
                    let options = options_for_payload(&payload, config);
                    debug!(endpoint = %endpoint, option_count = options.len(), "anonymous lookup completed");
                    if !options.is_empty() {
                        return LookupResult::Options(options);
                    }
                    LastAttempt::Succeeded
                }
                Err(error) => {
                    warn!(endpoint = %endpoint, error = %error, "anonymous lookup failed");
                    LastAttempt::Failed
                }
            }
        }
    };
    exhausted(settings.empty_result_policy, last_attempt, OPTIONS_EXHAUSTED_MESSAGE)
}

fn options_for_payload(payload: &Value, config: &LookupConfig) -> Vec<LookupOption> {
    let mut items = extract_items(payload, Some(&config.entity_name));
    if let Some(brand) = config.brand_filter.as_deref().filter(|brand| !brand.trim().is_empty()) {
        items.retain(|item| matches_brand(item, brand));
    }
    options_from_items(&items, config)
}

fn exhausted(policy: EmptyResultPolicy, last_attempt: LastAttempt, message: &str) -> LookupResult {
    match (policy, last_attempt) {
        (EmptyResultPolicy::Empty, LastAttempt::Succeeded) => LookupResult::Options(Vec::new()),
        _ => LookupResult::Error(message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::testing::ScriptedTransport;
    use serde_json::json;
    use stitch_types::StaticOptionSet;

    fn run<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime")
            .block_on(future)
    }

    #[test]
    fn static_strategy_makes_no_request() {
        let transport = ScriptedTransport::new();
        let config = LookupConfig::new("measurement-types", "MeasurementType");
        let result = run(resolve_lookup(&transport, &config, &LookupSettings::default()));
        assert_eq!(result, LookupResult::Options(StaticOptionSet::MeasurementType.options()));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn inline_options_are_returned_verbatim() {
        let transport = ScriptedTransport::new();
        let options = vec![LookupOption::new("s", "Small"), LookupOption::new("m", "Medium")];
        let config = LookupConfig::new("", "Size").with_options(options.clone());
        let result = run(resolve_lookup(&transport, &config, &LookupSettings::default()));
        assert_eq!(result, LookupResult::Options(options));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn factory_strategy_moves_past_empty_first_probe() {
        let transport = ScriptedTransport::new()
            .respond("factory", true, json!({ "factoryInfo": [] }))
            .respond(
                "factories",
                true,
                json!({ "factoriesInfo": [
                    { "_id": "f1", "factoryName": "Kathmandu Unit" },
                    { "_id": "f2", "factoryName": "Pokhara Unit" }
                ] }),
            );
        let config = LookupConfig::new("factories", "Factory");
        let result = run(resolve_lookup(&transport, &config, &LookupSettings::default()));
        assert_eq!(
            result,
            LookupResult::Options(vec![
                LookupOption::new("f1", "Kathmandu Unit"),
                LookupOption::new("f2", "Pokhara Unit"),
            ])
        );
    }

    #[test]
    fn factory_strategy_survives_failed_first_probe() {
        let transport = ScriptedTransport::new()
            .fail("factory", true, "boom")
            .respond("factories", true, json!([{ "id": 1, "name": "Birgunj" }]));
        let config = LookupConfig::new("factory", "Factory");
        let result = run(resolve_lookup(&transport, &config, &LookupSettings::default()));
        assert_eq!(result, LookupResult::Options(vec![LookupOption::new("1", "Birgunj")]));
        assert_eq!(
            transport.calls(),
            vec![("factory".to_string(), true), ("factories".to_string(), true)]
        );
    }

    #[test]
    fn factory_strategy_stops_at_first_success() {
        let transport = ScriptedTransport::new().respond("factory", true, json!([{ "_id": "f1", "factoryName": "Kathmandu Unit" }]));
        let config = LookupConfig::new("orders", "Factory").factory();
        let result = run(resolve_lookup(&transport, &config, &LookupSettings::default()));
        assert_eq!(result.options().map(<[LookupOption]>::len), Some(1));
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn factory_named_entity_endpoint_is_fetched_directly() {
        let transport = ScriptedTransport::new().respond(
            "factory-orders",
            true,
            json!([{ "_id": "o1", "factoryName": "Kathmandu Unit", "name": "Order 1" }]),
        );
        let config = LookupConfig::new("factory-orders", "Order");
        let result = run(resolve_lookup(&transport, &config, &LookupSettings::default()));
        assert_eq!(result, LookupResult::Options(vec![LookupOption::new("o1", "Kathmandu Unit")]));
        assert_eq!(transport.calls(), vec![("factory-orders".to_string(), true)]);
    }

    #[test]
    fn factory_strategy_reports_exhaustion() {
        let transport = ScriptedTransport::new().respond("factory", true, json!([]));
        let config = LookupConfig::new("factories", "Factory");
        let result = run(resolve_lookup(&transport, &config, &LookupSettings::default()));
        assert_eq!(result, LookupResult::Error(FACTORY_EXHAUSTED_MESSAGE.to_string()));
    }

    #[test]
    fn entity_strategy_recovers_with_anonymous_retry() {
        let transport = ScriptedTransport::new()
            .fail("customers", true, "Unauthorized")
            .respond("customers", false, json!({ "data": [{ "_id": "c1", "name": "Asha" }] }));
        let config = LookupConfig::new("customers", "Customer");
        let result = run(resolve_lookup(&transport, &config, &LookupSettings::default()));
        assert_eq!(result, LookupResult::Options(vec![LookupOption::new("c1", "Asha")]));
        assert_eq!(
            transport.calls(),
            vec![("customers".to_string(), true), ("customers".to_string(), false)]
        );
    }

    #[test]
    fn entity_strategy_does_not_retry_after_empty_success() {
        let transport = ScriptedTransport::new()
            .respond("customers", true, json!({ "data": [] }))
            .respond("customers", false, json!([{ "_id": "c1", "name": "Asha" }]));
        let config = LookupConfig::new("customers", "Customer");
        let result = run(resolve_lookup(&transport, &config, &LookupSettings::default()));
        assert_eq!(result, LookupResult::Error(OPTIONS_EXHAUSTED_MESSAGE.to_string()));
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn entity_strategy_reports_exhaustion_when_both_attempts_fail() {
        let transport = ScriptedTransport::new();
        let config = LookupConfig::new("employees", "Employee");
        let result = run(resolve_lookup(&transport, &config, &LookupSettings::default()));
        assert_eq!(result.error(), Some(OPTIONS_EXHAUSTED_MESSAGE));
    }

    #[test]
    fn catalog_retry_is_skipped_unless_configured() {
        let transport = ScriptedTransport::new().respond("catalogs", false, json!([{ "_id": "k1", "catalogName": "Wool Suit" }]));
        let config = LookupConfig::new("catalogs", "Catalog");
        let result = run(resolve_lookup(&transport, &config, &LookupSettings::default()));
        assert_eq!(result, LookupResult::Options(vec![LookupOption::new("k1", "Wool Suit")]));
        assert_eq!(
            transport.calls(),
            vec![("catalogs".to_string(), true), ("catalogs".to_string(), false)]
        );
    }

    #[test]
    fn configured_catalog_retry_runs_before_anonymous_attempt() {
        let transport = ScriptedTransport::new().respond(
            "catalogs/active",
            true,
            json!({ "items": [{ "_id": "k1", "catalogName": "Wool Suit", "codeNumber": "C12" }] }),
        );
        let settings = LookupSettings {
            catalog_retry_endpoint: Some("catalogs/active".to_string()),
            ..LookupSettings::default()
        };
        let config = LookupConfig::new("catalogs", "Catalog");
        let result = run(resolve_lookup(&transport, &config, &settings));
        assert_eq!(result, LookupResult::Options(vec![LookupOption::new("k1", "Wool Suit - C12")]));
        assert_eq!(
            transport.calls(),
            vec![("catalogs".to_string(), true), ("catalogs/active".to_string(), true)]
        );
    }

    #[test]
    fn brand_filter_limits_entity_options() {
        let transport = ScriptedTransport::new().respond(
            "catalogs",
            true,
            json!([
                { "_id": "k1", "catalogName": "Wool Suit", "brand": "Heritage" },
                { "_id": "k2", "catalogName": "Denim", "brand": "Modern" }
            ]),
        );
        let config = LookupConfig::new("catalogs", "Catalog").with_brand_filter("heritage");
        let result = run(resolve_lookup(&transport, &config, &LookupSettings::default()));
        assert_eq!(result, LookupResult::Options(vec![LookupOption::new("k1", "Wool Suit")]));
    }

    #[test]
    fn empty_policy_distinguishes_empty_success_from_failure() {
        let settings = LookupSettings {
            empty_result_policy: EmptyResultPolicy::Empty,
            ..LookupSettings::default()
        };

        let empty = ScriptedTransport::new().respond("customers", true, json!({ "data": [] }));
        let config = LookupConfig::new("customers", "Customer");
        assert_eq!(
            run(resolve_lookup(&empty, &config, &settings)),
            LookupResult::Options(Vec::new())
        );

        let failing = ScriptedTransport::new();
        assert_eq!(
            run(resolve_lookup(&failing, &config, &settings)),
            LookupResult::Error(OPTIONS_EXHAUSTED_MESSAGE.to_string())
        );

        let factory = ScriptedTransport::new().respond("factories", true, json!([]));
        assert_eq!(
            run(resolve_lookup(&factory, &LookupConfig::new("factories", "Factory"), &settings)),
            LookupResult::Options(Vec::new())
        );
    }
}
