//! Shared type definitions for Stitch lookup fields.
//!
//! These types describe the boundary between form fields and the lookup
//! engine: what a field asks for ([`LookupConfig`]), what it receives back
//! ([`LookupResult`]), and the option records themselves ([`LookupOption`]).

pub mod lookup;

pub use lookup::{EmptyResultPolicy, LookupConfig, LookupOption, LookupResult, LookupStrategyKind, StaticOptionSet};
