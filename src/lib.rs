//! Price Scout API Library
//!
//! Compares prices for a named product across vendors and determines the
//! cheapest effective price for a specific user, given that user's enrolled
//! payment instruments. Vendor quotes come from an unreliable text-completion
//! oracle and are defensively validated; when the oracle is unavailable or
//! returns garbage, a deterministic-shape mock generator takes over so a
//! comparison request never hard-fails.
//!
//! # Modules
//!
//! - `cache`: Integrity-checked quote cache entries.
//! - `catalog`: Static catalog of popular payment instrument templates.
//! - `config`: Configuration management.
//! - `discount`: The two discount policies (per-quote stacking, flat-bonus).
//! - `errors`: Error handling types.
//! - `generator`: Synthetic quote generation (oracle fallback).
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.
//! - `oracle`: Price oracle client.
//! - `orchestrator`: The comparison pipeline.
//! - `prompts`: Oracle prompt construction and brand detection.
//! - `registry`: The user's enrolled-instrument registry.
//! - `sanitizer`: Validation/repair of raw quote documents.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod discount;
pub mod errors;
pub mod generator;
pub mod handlers;
pub mod models;
pub mod oracle;
pub mod orchestrator;
pub mod prompts;
pub mod registry;
pub mod sanitizer;
