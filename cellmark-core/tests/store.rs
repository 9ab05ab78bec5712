//! Integration tests for the indexed feature store feeding the resolver.

use cellmark_core::{CellResolver, Feature, FeatureStore, GeoArea, IndexedFeatureStore};
use geo::{Geometry, LineString, Point, Rect, coord};
use rstest::{fixture, rstest};

const CELL: f64 = 0.000_125;

fn square(id: u64, south: f64, west: f64, size: f64, label: &str) -> Feature {
    let rect = Rect::new(
        coord! { x: west, y: south },
        coord! { x: west + size, y: south + size },
    );
    Feature::new(id, Geometry::Polygon(rect.to_polygon()), label)
}

#[fixture]
fn store() -> IndexedFeatureStore {
    IndexedFeatureStore::new(vec![
        square(3, 51.0, -0.2, 0.1, "district"),
        Feature::new(
            2,
            Geometry::LineString(LineString::from(vec![
                (-0.15, 51.050_03),
                (-0.14, 51.050_03),
            ])),
            "trail",
        )
        .with_name("Tow Path"),
        Feature::new(1, Geometry::Point(Point::new(-0.149_9, 51.050_06)), "bench"),
        square(4, 40.0, 10.0, 1.0, "forest"),
    ])
}

#[rstest]
fn store_returns_features_sorted_by_id(store: IndexedFeatureStore) {
    let area = GeoArea::from_bounds(51.04, -0.16, 51.06, -0.13);
    let ids: Vec<u64> = store.features_in_area(&area).map(|f| f.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(store.len(), 4);
}

#[rstest]
fn resolver_reads_candidates_from_store(store: IndexedFeatureStore) {
    // Two finest cells along the trail, one holding the bench.
    let area = GeoArea::from_bounds(51.05, -0.15, 51.05 + CELL, -0.15 + 2.0 * CELL);
    let cells = CellResolver::default()
        .resolve_all_in(&store, &area)
        .expect("area is on the globe");

    assert!(!cells.is_empty());
    assert!(
        cells
            .values()
            .all(|entries| entries.features.last().map(|f| f.id) == Some(3))
    );
    let bench_cell = cells
        .values()
        .find(|entries| entries.features.iter().any(|f| f.id == 1))
        .expect("bench cell resolved");
    let names: Vec<Option<&str>> = bench_cell
        .features
        .iter()
        .map(|f| f.name.as_deref())
        .collect();
    assert_eq!(names, vec![None, Some("Tow Path"), None]);
}

#[rstest]
fn single_resolution_from_store_prefers_lines_over_polygons(store: IndexedFeatureStore) {
    let area = GeoArea::from_bounds(51.049_9, -0.145, 51.050_1, -0.144_9);
    let cells = CellResolver::default()
        .resolve_single_in(&store, &area)
        .expect("area is on the globe");
    assert!(!cells.is_empty());
    assert!(cells.values().any(|entry| entry.feature.id == 2));
}
