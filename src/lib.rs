//! Facade crate for the cellmark grid engine.
//!
//! This crate re-exports grid addressing, feature resolution, scoring and
//! named locks. Scoring and locking sit behind the `scorer` and `sync`
//! feature flags.

#![forbid(unsafe_code)]

pub use cellmark_core::{
    CellAddress, CellCodec, CellEntries, CellEntry, CellResolver, Feature, FeatureKinds,
    FeatureProjection, FeatureQuery, FeatureStore, GeoArea, GeoPoint, GeometryKind,
    GeometryQuery, GridConfig, GridError, IndexedFeatureStore, MIN_SCORE, NameLookup,
    PlusCodeCodec, Precision, ResolverConfig, Scorer, TagNameLookup, Tags, TilePath, grid,
};

#[cfg(feature = "test-support")]
pub use cellmark_core::test_support;

#[cfg(feature = "scorer")]
pub use cellmark_scorer::{AreaScorer, ScoreConfig, ScoreReport, ScoreReportError, ScoreRow};

#[cfg(feature = "sync")]
pub use cellmark_sync::{LockPoolError, NamedLockGuard, NamedLockPool};
