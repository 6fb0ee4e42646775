//! Version management layer for catalog dependency suggestions
//!
//! This module fetches package metadata from an npm-compatible registry,
//! memoizes it per package name, and turns declared ranges into update
//! suggestions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registry   │────▶│    Cache    │◀────│   Client    │
//! │  (fetch)    │     │  (memoize)  │     │  (derive)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                                ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Descriptor  │────▶│ Suggestion  │◀────│    Range    │
//! │  (parse)    │     │  (flag)     │     │  (match)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: In-memory, first-caller-wins metadata cache
//! - [`client`]: Latest and satisfying version lookups on top of the cache
//! - [`descriptor`]: Operator / bare version split and replacement text
//! - [`range`]: npm range matching
//! - [`registry`]: Registry trait for fetching metadata from remote sources
//! - [`registries`]: Concrete registry implementations (npm)
//! - [`suggestion`]: Update suggestions and the per-dependency flag
//! - [`error`]: Error types for registry operations
//! - [`semver`]: Shared semver utilities
//! - [`types`]: Common types like `PackageMetadata`

pub mod cache;
pub mod client;
pub mod descriptor;
pub mod error;
pub mod range;
pub mod registries;
pub mod registry;
pub mod semver;
pub mod suggestion;
pub mod types;
