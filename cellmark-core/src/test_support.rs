//! Test-only helpers: an in-memory `FeatureStore` and feature builders used
//! by unit, behaviour, and property tests.

use geo::{Geometry, Intersects, Point, Rect, coord};

use crate::{Feature, FeatureStore, GeoArea, MIN_SCORE, Scorer};

/// In-memory `FeatureStore` implementation used in tests.
///
/// The store performs a linear scan and is intended only for small datasets.
#[derive(Default, Debug)]
pub struct MemoryStore {
    features: Vec<Feature>,
}

impl MemoryStore {
    /// Create a store containing a single feature.
    #[must_use]
    pub fn with_feature(feature: Feature) -> Self {
        Self::with_features(std::iter::once(feature))
    }

    /// Create a store from a collection of features.
    #[must_use]
    pub fn with_features<I>(features: I) -> Self
    where
        I: IntoIterator<Item = Feature>,
    {
        Self {
            features: features.into_iter().collect(),
        }
    }
}

impl FeatureStore for MemoryStore {
    fn features_in_area(&self, area: &GeoArea) -> Box<dyn Iterator<Item = Feature> + Send + '_> {
        let rect = *area.as_rect();
        Box::new(
            self.features
                .iter()
                // `Intersects` treats boundary points as inside the rectangle.
                .filter(move |feature| rect.intersects(&feature.geometry))
                .cloned(),
        )
    }
}

/// Point feature at `(latitude, longitude)`.
#[must_use]
pub fn point_feature(id: u64, latitude: f64, longitude: f64, label: &str) -> Feature {
    Feature::new(id, Geometry::Point(Point::new(longitude, latitude)), label)
}

/// Axis-aligned square polygon feature with its south-west corner at
/// `(south, west)` and sides of `size` degrees.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "square corners offset by the size")]
pub fn square_feature(id: u64, south: f64, west: f64, size: f64, label: &str) -> Feature {
    let rect = Rect::new(
        coord! { x: west, y: south },
        coord! { x: west + size, y: south + size },
    );
    Feature::new(id, Geometry::Polygon(rect.to_polygon()), label)
}

/// Test `Scorer` that gives every feature the same score.
#[derive(Debug, Copy, Clone)]
pub struct ConstantScorer(pub u64);

impl Default for ConstantScorer {
    fn default() -> Self {
        Self(MIN_SCORE)
    }
}

impl Scorer for ConstantScorer {
    fn score(&self, _feature: &Feature) -> u64 {
        self.0
    }
}
