//! Data access traits for map features.
//!
//! The [`FeatureStore`] trait is the read-only boundary to whatever
//! persistence layer holds ingested features. The resolver never talks to
//! storage directly; callers fetch candidates through a store and pass
//! them in.

use crate::{Feature, GeoArea};

mod index;

pub use index::IndexedFeatureStore;

/// Read-only access to persisted features.
///
/// Implementers are expected to keep features in a spatial index such as an
/// R\*-tree. Areas use WGS84 degrees.
///
/// Antimeridian note: areas crossing the antimeridian are not modelled.
/// Callers that need such queries MUST split the area in two and query
/// each half.
///
/// # Examples
///
/// ```rust
/// use geo::{Geometry, Intersects, Point};
/// use cellmark_core::{Feature, FeatureStore, GeoArea};
///
/// struct VecStore {
///     features: Vec<Feature>,
/// }
///
/// impl FeatureStore for VecStore {
///     fn features_in_area(
///         &self,
///         area: &GeoArea,
///     ) -> Box<dyn Iterator<Item = Feature> + Send + '_> {
///         let rect = *area.as_rect();
///         Box::new(
///             self.features
///                 .iter()
///                 .filter(move |feature| rect.intersects(&feature.geometry))
///                 .cloned(),
///         )
///     }
/// }
///
/// let bench = Feature::new(1, Geometry::Point(Point::new(0.0, 0.0)), "bench");
/// let store = VecStore { features: vec![bench.clone()] };
/// let area = GeoArea::from_bounds(-1.0, -1.0, 1.0, 1.0);
/// assert_eq!(store.features_in_area(&area).collect::<Vec<_>>(), vec![bench]);
/// ```
pub trait FeatureStore {
    /// Return every feature whose geometry intersects `area`.
    ///
    /// Containment includes boundary points.
    fn features_in_area(&self, area: &GeoArea) -> Box<dyn Iterator<Item = Feature> + Send + '_>;
}

#[cfg(test)]
mod tests {
    use super::FeatureStore;
    use crate::{Feature, GeoArea, test_support::MemoryStore};
    use geo::{Geometry, Point};
    use rstest::{fixture, rstest};

    fn bench_at(id: u64, longitude: f64, latitude: f64) -> Feature {
        Feature::new(id, Geometry::Point(Point::new(longitude, latitude)), "bench")
    }

    #[fixture]
    fn unit_area() -> GeoArea {
        GeoArea::from_bounds(-1.0, -1.0, 1.0, 1.0)
    }

    #[rstest]
    fn returns_features_inside_area(unit_area: GeoArea) {
        let feature = bench_at(1, 0.0, 0.0);
        let store = MemoryStore::with_feature(feature.clone());
        let found: Vec<_> = store.features_in_area(&unit_area).collect();
        assert_eq!(found, vec![feature]);
    }

    #[rstest]
    fn returns_empty_when_no_features(unit_area: GeoArea) {
        let store = MemoryStore::default();
        assert_eq!(store.features_in_area(&unit_area).count(), 0);
    }

    #[rstest]
    #[case(-1.0, 0.0)] // west edge
    #[case(1.0, 0.0)] // east edge
    #[case(0.0, -1.0)] // south edge
    #[case(0.0, 1.0)] // north edge
    #[case(1.0, 1.0)] // north-east corner
    fn includes_feature_on_area_boundary(
        unit_area: GeoArea,
        #[case] longitude: f64,
        #[case] latitude: f64,
    ) {
        let feature = bench_at(42, longitude, latitude);
        let store = MemoryStore::with_feature(feature.clone());
        let found: Vec<_> = store.features_in_area(&unit_area).collect();
        assert_eq!(found, vec![feature]);
    }

    #[rstest]
    #[case(-1.000_000_1, 0.0)]
    #[case(0.0, 1.000_000_1)]
    fn excludes_feature_just_outside_area(
        unit_area: GeoArea,
        #[case] longitude: f64,
        #[case] latitude: f64,
    ) {
        let store = MemoryStore::with_feature(bench_at(7, longitude, latitude));
        assert_eq!(store.features_in_area(&unit_area).count(), 0);
    }
}
