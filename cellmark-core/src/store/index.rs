//! In-memory feature store backed by an R\*-tree.

use geo::Intersects;
use rstar::{AABB, RTree, RTreeObject};

use super::FeatureStore;
use crate::{Feature, GeoArea};

/// Feature paired with its bounding envelope for the R\*-tree.
#[derive(Debug, Clone)]
struct IndexedFeature {
    envelope: AABB<[f64; 2]>,
    feature: Feature,
}

impl IndexedFeature {
    fn new(feature: Feature) -> Option<Self> {
        let bounds = feature.bounding_area()?;
        Some(Self {
            envelope: envelope_of(&bounds),
            feature,
        })
    }
}

impl RTreeObject for IndexedFeature {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn envelope_of(area: &GeoArea) -> AABB<[f64; 2]> {
    AABB::from_corners([area.west(), area.south()], [area.east(), area.north()])
}

/// Read-only store that bulk-loads features into an R\*-tree.
///
/// Envelope hits are refined with an exact [`geo::Intersects`] test, and
/// results are sorted by feature id so callers see a deterministic order.
/// Features with empty geometry have no envelope and are skipped at load.
///
/// # Examples
/// ```
/// use geo::{Geometry, Point};
/// use cellmark_core::{Feature, FeatureStore, GeoArea, IndexedFeatureStore};
///
/// let store = IndexedFeatureStore::new(vec![
///     Feature::new(2, Geometry::Point(Point::new(0.5, 0.5)), "bench"),
///     Feature::new(1, Geometry::Point(Point::new(0.1, 0.1)), "bench"),
///     Feature::new(3, Geometry::Point(Point::new(5.0, 5.0)), "bench"),
/// ]);
/// let area = GeoArea::from_bounds(0.0, 0.0, 1.0, 1.0);
/// let ids: Vec<u64> = store.features_in_area(&area).map(|f| f.id).collect();
/// assert_eq!(ids, vec![1, 2]);
/// ```
#[derive(Debug)]
pub struct IndexedFeatureStore {
    index: RTree<IndexedFeature>,
}

impl IndexedFeatureStore {
    /// Build the index from a collection of features.
    #[must_use]
    pub fn new<I>(features: I) -> Self
    where
        I: IntoIterator<Item = Feature>,
    {
        let entries: Vec<IndexedFeature> = features
            .into_iter()
            .filter_map(|feature| {
                let id = feature.id;
                let entry = IndexedFeature::new(feature);
                if entry.is_none() {
                    log::debug!("skipping feature {id} with empty geometry");
                }
                entry
            })
            .collect();
        Self {
            index: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.size()
    }

    /// Report whether the index holds no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.size() == 0
    }
}

impl FeatureStore for IndexedFeatureStore {
    fn features_in_area(&self, area: &GeoArea) -> Box<dyn Iterator<Item = Feature> + Send + '_> {
        let rect = *area.as_rect();
        let mut features: Vec<Feature> = self
            .index
            .locate_in_envelope_intersecting(&envelope_of(area))
            .filter(|entry| rect.intersects(&entry.feature.geometry))
            .map(|entry| entry.feature.clone())
            .collect();
        // Deterministic order for callers that rank by candidate position.
        features.sort_unstable_by_key(|feature| feature.id);
        Box::new(features.into_iter())
    }
}
