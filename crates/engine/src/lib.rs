//! # Stitch Engine
//!
//! Resolves the option lists behind a form's lookup fields (customers,
//! catalogs, factories and so on) against the dashboard API.
//!
//! ## Key Features
//!
//! - **Strategies**: static sets, inline options, multi-endpoint factory
//!   probing, and authenticated-then-anonymous entity lookups
//! - **Normalization**: envelope unwrapping and label selection into
//!   `{ id, label }` options
//! - **Admission**: at most three resolutions in flight, 500 ms apart
//! - **Caching**: per-field results keyed by configuration fingerprint, with
//!   stale responses discarded
//!
//! ## Usage
//!
//! ```rust
//! use stitch_engine::load_config_from_path;
//!
//! let temp_dir = tempfile::tempdir()?;
//! let config_path = temp_dir.path().join("config.yaml");
//! std::fs::write(&config_path, r#"
//! fields:
//!   order.customer:
//!     endpoint: customers
//!     entityName: Customer
//! "#)?;
//!
//! let config = load_config_from_path(&config_path)?;
//! for (field_path, lookup) in &config.fields {
//!     println!("{field_path} -> {}", lookup.endpoint);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`lookup`**: strategies, normalizer, dispatch queue, field cache and the
//!   [`LookupOrchestrator`] tying them together
//! - **`config`**: configuration model, file loading and validation

pub mod config;
pub mod lookup;

pub use config::{
    ApiSettings, StitchConfig, ValidationError, default_config_path, load_config, load_config_from_path, validate_config,
};
pub use lookup::{LookupOrchestrator, LookupSettings, LookupSnapshot, LookupTransport, normalize_options, resolve_lookup};
