//! Resolve a region into finest-grid cells and the features that own them.
//!
//! The resolver walks the region one cell at a time, starting from the
//! south-west corner of the cell that contains the region's south-west
//! corner. Running coordinates are rounded to nine decimal places after
//! every step so that long walks neither skip nor repeat a boundary cell.
//!
//! Each visited cell is tested in its decoded form, so neighbouring cells
//! share their edges exactly and a feature on an edge is given to one side.
//!
//! Features are ranked by specificity: the smaller a feature's area, the
//! more specific it is. Lines and points have no area and so outrank every
//! polygon. Ties keep candidate order.

use std::{cmp::Ordering, collections::BTreeMap};

use crate::{
    CellAddress, CellCodec, Feature, FeatureProjection, FeatureStore, GeoArea, GeoPoint,
    GeometryKind, GeometryQuery, GridError, PlusCodeCodec, Precision, query::FeatureQuery,
};

/// Decimal places kept on the running coordinate between steps.
const STEP_ROUNDING_SCALE: f64 = 1e9;

/// Slack, in cells, around each row when narrowing candidates, so features
/// on a decoded cell edge are never filtered out.
const ROW_MARGIN: f64 = 1e-3;

/// Which geometry kinds take part in resolution.
///
/// Geometry collections are always considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct FeatureKinds {
    /// Consider point and multi-point features.
    pub points: bool,
    /// Consider line features.
    pub lines: bool,
    /// Consider polygon features.
    pub polygons: bool,
}

impl FeatureKinds {
    /// Every geometry kind.
    pub const ALL: Self = Self {
        points: true,
        lines: true,
        polygons: true,
    };

    /// Report whether features of `kind` take part.
    #[must_use]
    pub const fn allows(&self, kind: GeometryKind) -> bool {
        match kind {
            GeometryKind::Point => self.points,
            GeometryKind::Line => self.lines,
            GeometryKind::Polygon => self.polygons,
            GeometryKind::Other => true,
        }
    }
}

impl Default for FeatureKinds {
    fn default() -> Self {
        Self::ALL
    }
}

/// Settings for a [`CellResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ResolverConfig {
    /// Size of the cells walked; `Cell10` unless overridden.
    pub precision: Precision,
    /// Geometry kinds considered before ranking.
    pub kinds: FeatureKinds,
}

impl ResolverConfig {
    /// Finest cells, ignoring point features.
    ///
    /// Line and polygon ranking is unaffected.
    #[must_use]
    pub const fn excluding_points() -> Self {
        Self {
            precision: Precision::FINEST,
            kinds: FeatureKinds {
                points: false,
                lines: true,
                polygons: true,
            },
        }
    }
}

/// The representative feature of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellEntry {
    /// Cell the feature represents.
    pub address: CellAddress,
    /// Most specific feature intersecting the cell.
    pub feature: FeatureProjection,
}

/// Every feature intersecting one cell, most specific first.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellEntries {
    /// Cell the features intersect.
    pub address: CellAddress,
    /// Projections ordered by ascending area, ties in candidate order.
    pub features: Vec<FeatureProjection>,
}

/// Partition regions into grid cells and pick the features that own them.
///
/// The codec and the intersection query are pluggable; the defaults are
/// [`PlusCodeCodec`] and [`GeometryQuery`].
///
/// # Examples
/// ```
/// use geo::{Geometry, Point};
/// use cellmark_core::{CellResolver, Feature, GeoArea, ResolverConfig};
///
/// let resolver = CellResolver::with_config(ResolverConfig::default());
/// let fountain = Feature::new(1, Geometry::Point(Point::new(0.000_06, 0.000_06)), "fountain");
/// let area = GeoArea::from_bounds(0.0, 0.0, 0.000_25, 0.000_25);
/// let cells = resolver.resolve_single(&area, &[fountain]).unwrap();
/// assert_eq!(cells.len(), 1);
/// assert_eq!(cells.values().next().unwrap().feature.id, 1);
/// ```
#[derive(Debug, Clone)]
pub struct CellResolver<C = PlusCodeCodec, Q = GeometryQuery> {
    codec: C,
    query: Q,
    config: ResolverConfig,
}

impl CellResolver {
    /// Resolver with the bundled codec and query.
    #[must_use]
    pub const fn with_config(config: ResolverConfig) -> Self {
        Self::new(PlusCodeCodec, GeometryQuery, config)
    }
}

impl Default for CellResolver {
    fn default() -> Self {
        Self::with_config(ResolverConfig::default())
    }
}

impl<C, Q> CellResolver<C, Q>
where
    C: CellCodec,
    Q: FeatureQuery,
{
    /// Resolver with a custom codec and intersection query.
    #[must_use]
    pub const fn new(codec: C, query: Q, config: ResolverConfig) -> Self {
        Self {
            codec,
            query,
            config,
        }
    }

    /// Settings in use.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Map every occupied cell of `area` to its most specific feature.
    ///
    /// Cells without an intersecting feature are omitted.
    ///
    /// # Errors
    /// Returns [`GridError::InvalidCoordinate`] when `area` leaves the
    /// globe.
    pub fn resolve_single(
        &self,
        area: &GeoArea,
        features: &[Feature],
    ) -> Result<BTreeMap<CellAddress, CellEntry>, GridError> {
        let mut cells = BTreeMap::new();
        self.walk(area, features, |address, hits| {
            let most_specific = hits
                .iter()
                .min_by(|a, b| compare_specificity(a, b))
                .map(|feature| feature.projection());
            if let Some(feature) = most_specific {
                cells.insert(address.clone(), CellEntry { address, feature });
            }
        })?;
        Ok(cells)
    }

    /// Map every occupied cell of `area` to all of its features.
    ///
    /// Each list holds exactly the intersecting features, ordered by
    /// ascending area so the most specific feature comes first.
    ///
    /// # Errors
    /// Returns [`GridError::InvalidCoordinate`] when `area` leaves the
    /// globe.
    pub fn resolve_all(
        &self,
        area: &GeoArea,
        features: &[Feature],
    ) -> Result<BTreeMap<CellAddress, CellEntries>, GridError> {
        let mut cells = BTreeMap::new();
        self.walk(area, features, |address, mut hits| {
            hits.sort_by(|a, b| compare_specificity(a, b));
            let projections = hits.iter().map(|feature| feature.projection()).collect();
            cells.insert(
                address.clone(),
                CellEntries {
                    address,
                    features: projections,
                },
            );
        })?;
        Ok(cells)
    }

    /// [`CellResolver::resolve_single`] over the features `store` holds for
    /// `area`.
    ///
    /// # Errors
    /// As [`CellResolver::resolve_single`].
    pub fn resolve_single_in<S>(
        &self,
        store: &S,
        area: &GeoArea,
    ) -> Result<BTreeMap<CellAddress, CellEntry>, GridError>
    where
        S: FeatureStore + ?Sized,
    {
        let features: Vec<Feature> = store.features_in_area(area).collect();
        self.resolve_single(area, &features)
    }

    /// [`CellResolver::resolve_all`] over the features `store` holds for
    /// `area`.
    ///
    /// # Errors
    /// As [`CellResolver::resolve_all`].
    pub fn resolve_all_in<S>(
        &self,
        store: &S,
        area: &GeoArea,
    ) -> Result<BTreeMap<CellAddress, CellEntries>, GridError>
    where
        S: FeatureStore + ?Sized,
    {
        let features: Vec<Feature> = store.features_in_area(area).collect();
        self.resolve_all(area, &features)
    }

    /// Visit every cell of `area` that has at least one intersecting
    /// candidate, passing the hits in candidate order.
    #[expect(
        clippy::float_arithmetic,
        reason = "cell edges advance by the cell resolution"
    )]
    fn walk<'f, F>(
        &self,
        area: &GeoArea,
        features: &'f [Feature],
        mut visit: F,
    ) -> Result<(), GridError>
    where
        F: FnMut(CellAddress, Vec<&'f Feature>),
    {
        let precision = self.config.precision;
        let candidates: Vec<(&Feature, GeoArea)> = features
            .iter()
            .filter(|feature| self.config.kinds.allows(feature.kind()))
            .filter_map(|feature| feature.bounding_area().map(|bounds| (feature, bounds)))
            .filter(|(_, bounds)| bounds.intersects(area))
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }

        area.north_east().validated()?;
        let first_cell = self.codec.encode(area.south_west(), precision)?;
        let origin = self.codec.decode(&first_cell).south_west();
        let step = precision.resolution_degrees();

        let mut rows = 0_usize;
        let mut occupied = 0_usize;
        let mut latitude = origin.latitude;
        loop {
            let row = GeoArea::from_bounds(latitude, area.west(), latitude + step, area.east())
                .expand(step * ROW_MARGIN);
            let row_candidates: Vec<&Feature> = candidates
                .iter()
                .filter(|(_, bounds)| bounds.intersects(&row))
                .map(|(feature, _)| *feature)
                .collect();
            rows += 1;

            if !row_candidates.is_empty() {
                let mut longitude = origin.longitude;
                loop {
                    let centre = GeoPoint::new(latitude + step / 2.0, longitude + step / 2.0);
                    let address = self.codec.encode(centre, precision)?;
                    let hits = self
                        .query
                        .intersecting(&self.codec.decode(&address), &row_candidates);
                    if !hits.is_empty() {
                        occupied += 1;
                        visit(address, hits);
                    }
                    longitude = round_step(longitude + step);
                    if longitude >= area.east() {
                        break;
                    }
                }
            }

            latitude = round_step(latitude + step);
            if latitude >= area.north() {
                break;
            }
        }
        log::debug!(
            "resolved {occupied} occupied cells over {rows} rows from {} candidates",
            candidates.len()
        );
        Ok(())
    }
}

/// Order features by ascending area; equal areas compare equal so stable
/// sorts keep candidate order.
fn compare_specificity(a: &Feature, b: &Feature) -> Ordering {
    a.area().total_cmp(&b.area())
}

#[expect(
    clippy::float_arithmetic,
    reason = "rounding to a fixed decimal scale"
)]
fn round_step(value: f64) -> f64 {
    (value * STEP_ROUNDING_SCALE).round() / STEP_ROUNDING_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{point_feature, square_feature};
    use rstest::{fixture, rstest};

    const CELL: f64 = 0.000_125;

    #[fixture]
    fn resolver() -> CellResolver {
        CellResolver::default()
    }

    /// A 2×2 block of finest cells at the origin.
    #[fixture]
    fn block() -> GeoArea {
        GeoArea::from_bounds(0.0, 0.0, 2.0 * CELL, 2.0 * CELL)
    }

    #[rstest]
    fn empty_candidates_yield_empty_maps(resolver: CellResolver, block: GeoArea) {
        assert!(resolver.resolve_single(&block, &[]).expect("resolves").is_empty());
        assert!(resolver.resolve_all(&block, &[]).expect("resolves").is_empty());
    }

    #[rstest]
    fn empty_candidates_skip_coordinate_checks(resolver: CellResolver) {
        let beyond = GeoArea::from_bounds(95.0, 0.0, 96.0, 1.0);
        assert!(resolver.resolve_single(&beyond, &[]).expect("no walk").is_empty());
    }

    #[rstest]
    fn smallest_area_wins(resolver: CellResolver, block: GeoArea) {
        let district = square_feature(1, -1.0, -1.0, 2.0, "district");
        let park = square_feature(2, 0.0, 0.0, 0.01, "park");
        let cells = resolver
            .resolve_single(&block, &[district, park])
            .expect("resolves");
        assert_eq!(cells.len(), 4);
        assert!(cells.values().all(|entry| entry.feature.id == 2));
    }

    #[rstest]
    fn ties_keep_candidate_order(resolver: CellResolver, block: GeoArea) {
        let first = point_feature(7, 0.5 * CELL, 0.5 * CELL, "bench");
        let second = point_feature(3, 0.5 * CELL, 0.5 * CELL, "statue");
        let cells = resolver
            .resolve_single(&block, &[first, second])
            .expect("resolves");
        assert_eq!(cells.len(), 1);
        assert_eq!(cells.values().next().map(|entry| entry.feature.id), Some(7));
    }

    #[rstest]
    fn resolve_all_lists_every_hit_most_specific_first(resolver: CellResolver, block: GeoArea) {
        let district = square_feature(1, -1.0, -1.0, 2.0, "district");
        let park = square_feature(2, 0.0, 0.0, 0.01, "park");
        let bench = point_feature(3, 0.5 * CELL, 0.5 * CELL, "bench");
        let cells = resolver
            .resolve_all(&block, &[district, park, bench])
            .expect("resolves");
        assert_eq!(cells.len(), 4);
        let bench_cell = cells
            .values()
            .find(|entry| entry.features.len() == 3)
            .expect("one cell holds the bench");
        let ids: Vec<u64> = bench_cell.features.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(cells.values().filter(|entry| entry.features.len() == 2).count(), 3);
    }

    #[rstest]
    fn points_excluded_mode_ignores_points(block: GeoArea) {
        let resolver = CellResolver::with_config(ResolverConfig::excluding_points());
        let park = square_feature(2, 0.0, 0.0, 0.01, "park");
        let bench = point_feature(3, 0.5 * CELL, 0.5 * CELL, "bench");
        let cells = resolver.resolve_single(&block, &[park, bench]).expect("resolves");
        assert_eq!(cells.len(), 4);
        assert!(cells.values().all(|entry| entry.feature.id == 2));
    }

    #[rstest]
    fn entries_are_keyed_by_their_address(resolver: CellResolver, block: GeoArea) {
        let park = square_feature(2, 0.0, 0.0, 0.01, "park");
        let cells = resolver.resolve_single(&block, &[park]).expect("resolves");
        assert!(cells.iter().all(|(address, entry)| *address == entry.address));
        assert!(cells.keys().all(|address| address.precision() == Precision::Cell10));
    }

    #[rstest]
    fn long_walks_visit_each_cell_once(resolver: CellResolver) {
        // 400 × 1 cells starting away from the origin to accumulate drift.
        let area = GeoArea::from_bounds(10.000_062_5, 20.0, 10.000_062_5, 20.05);
        let strip = square_feature(1, 9.0, 19.0, 2.0, "district");
        let cells = resolver.resolve_all(&area, &[strip]).expect("resolves");
        assert_eq!(cells.len(), 400);
    }

    fn decoded(address: &str) -> GeoArea {
        PlusCodeCodec.decode_str(address).expect("valid address")
    }

    #[rstest]
    fn polygon_matching_one_child_owns_one_cell(resolver: CellResolver) {
        let block = decoded("6FG22222");
        let park = Feature::new(1, geo::Geometry::Polygon(block.to_polygon()), "park");
        let pond_area = decoded("6FG22222FF");
        let pond = Feature::new(2, geo::Geometry::Polygon(pond_area.to_polygon()), "water");
        let cells = resolver.resolve_single(&block, &[park, pond]).expect("resolves");
        assert_eq!(cells.len(), 400);
        let pond_cells: Vec<&str> = cells
            .values()
            .filter(|entry| entry.feature.id == 2)
            .map(|entry| entry.address.as_str())
            .collect();
        assert_eq!(pond_cells, vec!["6FG22222FF"]);
    }

    #[rstest]
    fn point_on_a_shared_corner_owns_one_cell(resolver: CellResolver, block: GeoArea) {
        let district = square_feature(1, -1.0, -1.0, 2.0, "district");
        // The corner shared by the four cells of the block.
        let corner = decoded("6FG2222233").south_west();
        let marker = point_feature(2, corner.latitude, corner.longitude, "marker");
        let cells = resolver.resolve_single(&block, &[district, marker]).expect("resolves");
        assert_eq!(cells.len(), 4);
        let owned: Vec<&str> = cells
            .values()
            .filter(|entry| entry.feature.id == 2)
            .map(|entry| entry.address.as_str())
            .collect();
        assert_eq!(owned, vec!["6FG2222233"]);
    }

    #[rstest]
    fn rejects_areas_beyond_the_globe(resolver: CellResolver) {
        let area = GeoArea::from_bounds(89.0, 0.0, 91.0, 1.0);
        let district = square_feature(1, 88.0, 0.0, 1.5, "district");
        assert!(matches!(
            resolver.resolve_single(&area, &[district]),
            Err(GridError::InvalidCoordinate { .. })
        ));
    }

    #[rstest]
    fn kinds_filter_matches_geometry_kind() {
        let kinds = ResolverConfig::excluding_points().kinds;
        assert!(!kinds.allows(GeometryKind::Point));
        assert!(kinds.allows(GeometryKind::Line));
        assert!(kinds.allows(GeometryKind::Polygon));
        assert!(kinds.allows(GeometryKind::Other));
    }
}
