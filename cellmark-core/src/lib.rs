//! Core types for the cellmark grid engine.
//!
//! The crate addresses the globe with two grid schemes, resolves regions
//! into finest-grid cells owned by map features, and defines the traits
//! that connect it to feature storage and scoring. Constructors that take
//! raw coordinates return `Result` to surface invalid input early.

#![forbid(unsafe_code)]

mod error;
mod feature;
mod geometry;
pub mod grid;
mod query;
mod resolver;
mod scorer;
mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::GridError;
pub use feature::{Feature, FeatureProjection, GeometryKind, NameLookup, TagNameLookup, Tags};
pub use geometry::{GeoArea, GeoPoint, MAX_LATITUDE, MAX_LONGITUDE};
pub use grid::{CellAddress, CellCodec, GridConfig, PlusCodeCodec, Precision, TilePath};
pub use query::{FeatureQuery, GeometryQuery};
pub use resolver::{CellEntries, CellEntry, CellResolver, FeatureKinds, ResolverConfig};
pub use scorer::{MIN_SCORE, Scorer};
pub use store::{FeatureStore, IndexedFeatureStore};
