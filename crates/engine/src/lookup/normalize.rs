//! Entity response normalization.
//!
//! The upstream API wraps collections in several envelope shapes and names
//! display fields differently per entity. All of that guesswork lives here:
//! [`extract_items`] finds the record array, [`map_to_option`] turns one
//! record into a [`LookupOption`], and [`normalize_options`] combines both.

use indexmap::IndexMap;
use serde_json::Value;
use stitch_types::{LookupConfig, LookupOption};

/// Envelope keys probed in order before the entity-specific `<entity>Info` key.
const ENVELOPE_KEYS: &[&str] = &["data", "items", "results", "factoriesInfo", "factoryInfo"];
/// Envelopes nested deeper than this are not unwrapped.
const MAX_ENVELOPE_DEPTH: usize = 2;

const FACTORY_LABEL_FIELDS: &[&str] = &["factoryName", "name", "title", "label", "displayName", "factory_id", "factoryId"];
const DEFAULT_LABEL_FIELDS: &[&str] = &["name", "title", "label", "displayName"];

/// Extract the raw record array from a response envelope.
///
/// Bare arrays are returned unchanged. Objects are probed for `data`,
/// `items`, `results`, `factoriesInfo`, `factoryInfo` and finally
/// `<entity_name lowercased>Info`; the first present key wins. A winning key
/// that holds an object is unwrapped once more (`{"data": {"items": [...]}}`).
/// Anything else yields an empty list.
pub fn extract_items(payload: &Value, entity_name: Option<&str>) -> Vec<Value> {
    extract_items_at_depth(payload, entity_name, 0)
}

fn extract_items_at_depth(payload: &Value, entity_name: Option<&str>, depth: usize) -> Vec<Value> {
    let map = match payload {
        Value::Array(items) => return items.clone(),
        Value::Object(map) => map,
        _ => return Vec::new(),
    };

    let entity_key = entity_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| format!("{}Info", name.to_lowercase()));
    let candidate = ENVELOPE_KEYS
        .iter()
        .find_map(|key| map.get(*key))
        .or_else(|| entity_key.as_deref().and_then(|key| map.get(key)));

    match candidate {
        Some(Value::Array(items)) => items.clone(),
        Some(nested @ Value::Object(_)) if depth < MAX_ENVELOPE_DEPTH => extract_items_at_depth(nested, entity_name, depth + 1),
        _ => Vec::new(),
    }
}

/// Canonical identifier of a record: `_id` first, then `id`, stringified.
pub fn item_id(item: &Value) -> Option<String> {
    ["_id", "id"].iter().find_map(|key| stringify_id(item.get(*key)?))
}

fn stringify_id(value: &Value) -> Option<String> {
    let id = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Object(map) => return map.get("$oid").and_then(stringify_id),
        _ => return None,
    };
    if id.is_empty() { None } else { Some(id) }
}

fn non_empty_string<'a>(item: &'a Value, field: &str) -> Option<&'a str> {
    item.get(field).and_then(Value::as_str).map(str::trim).filter(|text| !text.is_empty())
}

fn first_label(item: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|field| non_empty_string(item, field))
        .map(str::to_string)
}

fn catalog_label(item: &Value) -> Option<String> {
    let name = non_empty_string(item, "catalogName").or_else(|| non_empty_string(item, "name"))?;
    let code = match item.get("codeNumber") {
        Some(Value::String(code)) if !code.trim().is_empty() => Some(code.trim().to_string()),
        Some(Value::Number(code)) => Some(code.to_string()),
        _ => None,
    };
    Some(match code {
        Some(code) => format!("{name} - {code}"),
        None => name.to_string(),
    })
}

/// Map one raw record to an option, or `None` when it has no identifier.
///
/// Label precedence:
/// 1. catalog endpoints: `catalogName` (or `name`) plus `" - " + codeNumber`
/// 2. factory endpoints or factory lookups: the factory field list
/// 3. otherwise `display_field` when configured, else `name`, `title`,
///    `label`, `displayName`
/// 4. fallback: `"<entity_name or Item> <id>"`
pub fn map_to_option(item: &Value, config: &LookupConfig) -> Option<LookupOption> {
    let id = item_id(item)?;

    let label = if config.targets_catalogs() {
        catalog_label(item)
    } else if config.targets_factories() {
        first_label(item, FACTORY_LABEL_FIELDS)
    } else {
        match config.display_field.as_deref().map(str::trim).filter(|field| !field.is_empty()) {
            Some(display_field) => first_label(item, &[display_field]),
            None => first_label(item, DEFAULT_LABEL_FIELDS),
        }
    };

    let label = label.unwrap_or_else(|| {
        let entity = config.entity_name.trim();
        let entity = if entity.is_empty() { "Item" } else { entity };
        format!("{entity} {id}")
    });
    Some(LookupOption { id, label })
}

/// Extract, map, and deduplicate a payload into options.
///
/// Records without an identifier are skipped. Duplicate ids keep their first
/// occurrence and original order.
pub fn normalize_options(payload: &Value, config: &LookupConfig) -> Vec<LookupOption> {
    options_from_items(&extract_items(payload, Some(&config.entity_name)), config)
}

pub(crate) fn options_from_items(items: &[Value], config: &LookupConfig) -> Vec<LookupOption> {
    let mut unique: IndexMap<String, LookupOption> = IndexMap::new();
    for option in items.iter().filter_map(|item| map_to_option(item, config)) {
        unique.entry(option.id.clone()).or_insert(option);
    }
    unique.into_values().collect()
}

/// True when `item` belongs to `brand` (case-insensitive).
///
/// Checks `brand`, `brandName` and `brandId`; an object-valued `brand` is
/// matched on its `_id`, `id` or `name`.
pub fn matches_brand(item: &Value, brand: &str) -> bool {
    let brand = brand.trim();
    let matches = |value: &Value| match value {
        Value::String(text) => text.trim().eq_ignore_ascii_case(brand),
        Value::Number(number) => number.to_string() == brand,
        _ => false,
    };
    ["brand", "brandName", "brandId"].iter().any(|key| match item.get(*key) {
        Some(Value::Object(nested)) => ["_id", "id", "name"]
            .iter()
            .filter_map(|nested_key| nested.get(*nested_key))
            .any(&matches),
        Some(value) => matches(value),
        None => false,
    })
}
