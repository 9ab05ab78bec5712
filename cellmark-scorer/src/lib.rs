//! Size-based scoring for map features.
//!
//! [`AreaScorer`] turns a feature into game points by counting how many
//! scoring cells its geometry covers. Polygons score by area, lines by
//! length, and points always score one. The cell size defaults to the
//! finest plus-code cell, `1/8000` of a degree.
//!
//! # Examples
//!
//! ```
//! use geo::{Geometry, LineString};
//! use cellmark_core::{Feature, Scorer};
//! use cellmark_scorer::{AreaScorer, ScoreConfig};
//!
//! let step = ScoreConfig::default().cell_resolution_degrees;
//! let trail = LineString::from(vec![(0.0, 0.0), (0.0, 25.0 * step)]);
//! let feature = Feature::new(1, Geometry::LineString(trail), "trail");
//!
//! assert_eq!(AreaScorer::default().score(&feature), 25);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod measure;
mod types;

pub use error::ScoreReportError;
pub use types::{ScoreConfig, ScoreReport, ScoreRow};

use cellmark_core::{Feature, GeoArea, GeometryKind, MIN_SCORE, Scorer};
use geo::Intersects;

use crate::measure::Extent;

/// [`Scorer`] that measures features in scoring cells.
///
/// - Polygons score `round(area / cell_area)`.
/// - Lines score `round(length / cell_resolution)`.
/// - Points score [`MIN_SCORE`].
///
/// Every feature scores at least [`MIN_SCORE`]. Geometry collections are
/// scored as points and logged at `warn`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AreaScorer {
    config: ScoreConfig,
}

impl AreaScorer {
    /// Construct a scorer with an explicit cell size.
    #[must_use]
    pub const fn new(config: ScoreConfig) -> Self {
        Self { config }
    }

    /// Borrow the scoring configuration.
    #[must_use]
    pub const fn config(&self) -> &ScoreConfig {
        &self.config
    }

    /// Score only the part of `feature` that lies inside `region`.
    ///
    /// Returns `0` when the feature does not touch the region. Otherwise
    /// polygons are intersected with the region and lines clipped to it
    /// before measuring. Features that only touch the region boundary
    /// score [`MIN_SCORE`].
    ///
    /// # Examples
    /// ```
    /// use geo::{Geometry, Point};
    /// use cellmark_core::{Feature, GeoArea};
    /// use cellmark_scorer::AreaScorer;
    ///
    /// let bench = Feature::new(1, Geometry::Point(Point::new(0.5, 0.5)), "bench");
    /// let scorer = AreaScorer::default();
    /// assert_eq!(scorer.score_within_region(&bench, &GeoArea::from_bounds(0.0, 0.0, 1.0, 1.0)), 1);
    /// assert_eq!(scorer.score_within_region(&bench, &GeoArea::from_bounds(2.0, 2.0, 3.0, 3.0)), 0);
    /// ```
    #[must_use]
    pub fn score_within_region(&self, feature: &Feature, region: &GeoArea) -> u64 {
        if !region.as_rect().intersects(&feature.geometry) {
            return 0;
        }
        self.score_extent(feature, measure::clipped_extent(&feature.geometry, region))
    }

    /// Score every feature, keeping input order.
    #[must_use]
    pub fn score_report<'a, I>(&self, features: I) -> ScoreReport
    where
        I: IntoIterator<Item = &'a Feature>,
    {
        ScoreReport::new(
            features
                .into_iter()
                .map(|feature| ScoreRow {
                    name: feature.name.clone(),
                    score: self.score(feature),
                    id: feature.id,
                })
                .collect(),
        )
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "scores divide measured size by the cell size"
    )]
    fn score_extent(&self, feature: &Feature, extent: Extent) -> u64 {
        match extent {
            Extent::Area(area) => Self::sanitise(area / self.config.cell_area()),
            Extent::Length(length) => {
                Self::sanitise(length / self.config.cell_resolution_degrees)
            }
            Extent::Unit => {
                if feature.kind() == GeometryKind::Other {
                    log::warn!(
                        "feature {} has no single geometry kind; scoring it as a point",
                        feature.id
                    );
                }
                MIN_SCORE
            }
        }
    }
}

impl Scorer for AreaScorer {
    fn score(&self, feature: &Feature) -> u64 {
        self.score_extent(feature, measure::extent(&feature.geometry))
    }
}
