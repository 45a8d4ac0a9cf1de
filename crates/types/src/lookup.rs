use serde::{Deserialize, Serialize};

/// A single selectable value for a lookup field.
///
/// `id` is always the stringified entity identifier and `label` is never
/// empty; the normalizer synthesizes `"<Entity> <id>"` when the source item
/// carries no usable display field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupOption {
    pub id: String,
    pub label: String,
}

impl LookupOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Built-in option sets that never touch the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaticOptionSet {
    MeasurementType,
}

impl StaticOptionSet {
    /// Match an endpoint or entity name against the known static sets.
    ///
    /// Matching ignores case and the separators commonly seen in form
    /// declarations, so `measurementType`, `measurement-types` and
    /// `measurement_type` all select [`StaticOptionSet::MeasurementType`].
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|character| !matches!(character, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.trim_end_matches('s') {
            "measurementtype" => Some(Self::MeasurementType),
            _ => None,
        }
    }

    pub fn options(self) -> Vec<LookupOption> {
        match self {
            Self::MeasurementType => vec![
                LookupOption::new("body", "Body Measurement"),
                LookupOption::new("garment", "Garment Measurement"),
            ],
        }
    }
}

/// Declares how one form field resolves its options.
///
/// Field names accept both the snake_case form used in configuration files
/// and the camelCase form used by form declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Resource path segment, e.g. `customers` or `catalogs`.
    #[serde(default)]
    pub endpoint: String,
    /// Entity label used for fallback option labels and envelope guessing.
    #[serde(default, alias = "entityName")]
    pub entity_name: String,
    /// Preferred label field for generic entities.
    #[serde(default, alias = "displayField", skip_serializing_if = "Option::is_none")]
    pub display_field: Option<String>,
    /// Restrict generic entity results to a single brand.
    #[serde(default, alias = "brandFilter", skip_serializing_if = "Option::is_none")]
    pub brand_filter: Option<String>,
    /// Force factory label precedence and multi-endpoint probing.
    #[serde(default, alias = "isFactoryLookup")]
    pub is_factory_lookup: bool,
    /// Inline options; when present no request is made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<LookupOption>>,
}

impl LookupConfig {
    pub fn new(endpoint: impl Into<String>, entity_name: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            entity_name: entity_name.into(),
            ..Self::default()
        }
    }

    pub fn with_display_field(mut self, display_field: impl Into<String>) -> Self {
        self.display_field = Some(display_field.into());
        self
    }

    pub fn with_brand_filter(mut self, brand: impl Into<String>) -> Self {
        self.brand_filter = Some(brand.into());
        self
    }

    pub fn factory(mut self) -> Self {
        self.is_factory_lookup = true;
        self
    }

    pub fn with_options(mut self, options: Vec<LookupOption>) -> Self {
        self.options = Some(options);
        self
    }

    /// True when the endpoint addresses the catalog collection.
    pub fn targets_catalogs(&self) -> bool {
        self.endpoint.to_ascii_lowercase().contains("catalog")
    }

    /// True when factory label precedence applies.
    pub fn targets_factories(&self) -> bool {
        let endpoint = self.endpoint.to_ascii_lowercase();
        self.is_factory_lookup || endpoint.contains("factory") || endpoint.contains("factories")
    }

    /// True when options come from probing the factory endpoints rather than
    /// from `endpoint` itself: the flag is set, or the endpoint is exactly
    /// `factory` or `factories`.
    pub fn probes_factory_endpoints(&self) -> bool {
        let endpoint = self.endpoint.trim().trim_matches('/');
        self.is_factory_lookup || endpoint.eq_ignore_ascii_case("factory") || endpoint.eq_ignore_ascii_case("factories")
    }

    /// Select the resolution strategy implied by this configuration.
    ///
    /// Inline options and known static sets win over everything else; then
    /// factory lookups; everything else is a generic entity lookup.
    pub fn strategy_kind(&self) -> LookupStrategyKind {
        if self.options.is_some() {
            return LookupStrategyKind::Inline;
        }
        if let Some(set) = StaticOptionSet::from_name(&self.endpoint).or_else(|| StaticOptionSet::from_name(&self.entity_name)) {
            return LookupStrategyKind::Static(set);
        }
        if self.probes_factory_endpoints() {
            return LookupStrategyKind::Factory;
        }
        LookupStrategyKind::Entity
    }
}

/// Resolution policy selected by [`LookupConfig::strategy_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategyKind {
    Inline,
    Static(StaticOptionSet),
    Factory,
    Entity,
}

/// Outcome of resolving one field: options or an error message, never both.
///
/// Serializes as `{"options": [...]}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupResult {
    Options(Vec<LookupOption>),
    Error(String),
}

impl LookupResult {
    pub fn options(&self) -> Option<&[LookupOption]> {
        match self {
            Self::Options(options) => Some(options),
            Self::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Options(_) => None,
            Self::Error(message) => Some(message),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// How a resolution that succeeded but mapped zero options is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyResultPolicy {
    /// Collapse "no options" into the strategy's exhaustion message.
    #[default]
    Error,
    /// Report an empty option list when the last attempt succeeded.
    Empty,
}
