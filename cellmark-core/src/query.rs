//! Feature-intersection queries used by the resolver.

use std::cmp::Ordering;

use geo::{Coord, Geometry, LineString, Relate};

use crate::{Feature, GeoArea, MAX_LATITUDE, MAX_LONGITUDE};

/// Select the candidates that intersect a cell.
///
/// Implementations must return the matching candidates in their original
/// order; the resolver breaks ranking ties by that order.
pub trait FeatureQuery: Send + Sync {
    /// Return the subsequence of `candidates` intersecting `cell`.
    fn intersecting<'a>(&self, cell: &GeoArea, candidates: &[&'a Feature]) -> Vec<&'a Feature>;
}

/// [`FeatureQuery`] that gives every part of the plane to exactly one cell.
///
/// - Polygons must overlap the cell's interior; sharing an edge or a corner
///   is not enough.
/// - Points and lines are tested against the half-open cell
///   `[south, north) × [west, east)`, so anything lying on a shared edge
///   belongs to the cell north or east of it. The north edge at the pole
///   and the east edge at the antimeridian stay closed.
///
/// # Examples
/// ```
/// use geo::{Geometry, Point};
/// use cellmark_core::{Feature, FeatureQuery, GeoArea, GeometryQuery};
///
/// let corner = Feature::new(1, Geometry::Point(Point::new(1.0, 1.0)), "bench");
/// let south_west = GeoArea::from_bounds(0.0, 0.0, 1.0, 1.0);
/// let north_east = GeoArea::from_bounds(1.0, 1.0, 2.0, 2.0);
/// assert!(GeometryQuery.intersecting(&south_west, &[&corner]).is_empty());
/// assert_eq!(GeometryQuery.intersecting(&north_east, &[&corner]).len(), 1);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GeometryQuery;

impl FeatureQuery for GeometryQuery {
    fn intersecting<'a>(&self, cell: &GeoArea, candidates: &[&'a Feature]) -> Vec<&'a Feature> {
        candidates
            .iter()
            .copied()
            .filter(|feature| claims(cell, &feature.geometry))
            .collect()
    }
}

fn claims(cell: &GeoArea, geometry: &Geometry<f64>) -> bool {
    match geometry {
        Geometry::Point(point) => contains_half_open(cell, point.0),
        Geometry::MultiPoint(points) => points.iter().any(|point| contains_half_open(cell, point.0)),
        Geometry::Line(line) => segment_enters(cell, line.start, line.end),
        Geometry::LineString(line) => line_enters(cell, line),
        Geometry::MultiLineString(lines) => lines.iter().any(|line| line_enters(cell, line)),
        Geometry::Polygon(_)
        | Geometry::MultiPolygon(_)
        | Geometry::Rect(_)
        | Geometry::Triangle(_) => {
            let matrix = cell.as_rect().relate(geometry);
            matrix.is_intersects() && !matrix.is_touches()
        }
        Geometry::GeometryCollection(members) => {
            members.iter().any(|member| claims(cell, member))
        }
    }
}

/// North and east edges that also belong to the cell.
struct ClosedEdges {
    north: bool,
    east: bool,
}

impl ClosedEdges {
    fn of(cell: &GeoArea) -> Self {
        Self {
            north: cell.north() >= MAX_LATITUDE,
            east: cell.east() >= MAX_LONGITUDE,
        }
    }
}

fn contains_half_open(cell: &GeoArea, coord: Coord<f64>) -> bool {
    let closed = ClosedEdges::of(cell);
    let below_north = if closed.north {
        coord.y <= cell.north()
    } else {
        coord.y < cell.north()
    };
    let west_of_east = if closed.east {
        coord.x <= cell.east()
    } else {
        coord.x < cell.east()
    };
    coord.y >= cell.south() && coord.x >= cell.west() && below_north && west_of_east
}

fn line_enters(cell: &GeoArea, line: &LineString<f64>) -> bool {
    match line.0.as_slice() {
        [single] => contains_half_open(cell, *single),
        _ => line
            .lines()
            .any(|segment| segment_enters(cell, segment.start, segment.end)),
    }
}

/// Report whether the segment `start..end` meets the half-open cell.
///
/// The segment is clipped to the closed cell first. What remains misses
/// the half-open cell only when it lies wholly on an open north or east
/// edge.
fn segment_enters(cell: &GeoArea, start: Coord<f64>, end: Coord<f64>) -> bool {
    let Some((from, to)) = clip_segment(cell, start, end) else {
        return false;
    };
    let closed = ClosedEdges::of(cell);
    let on_north = !closed.north && from.y >= cell.north() && to.y >= cell.north();
    let on_east = !closed.east && from.x >= cell.east() && to.x >= cell.east();
    !(on_north || on_east)
}

/// Liang-Barsky clip of a segment to the closed cell.
#[expect(
    clippy::float_arithmetic,
    reason = "segment parameters come from edge offsets over the direction"
)]
fn clip_segment(
    cell: &GeoArea,
    start: Coord<f64>,
    end: Coord<f64>,
) -> Option<(Coord<f64>, Coord<f64>)> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let mut entry = 0.0_f64;
    let mut exit = 1.0_f64;
    let edges = [
        (-dx, start.x - cell.west()),
        (dx, cell.east() - start.x),
        (-dy, start.y - cell.south()),
        (dy, cell.north() - start.y),
    ];
    for (direction, offset) in edges {
        match direction.partial_cmp(&0.0) {
            Some(Ordering::Less) => {
                let t = offset / direction;
                if t > exit {
                    return None;
                }
                entry = entry.max(t);
            }
            Some(Ordering::Greater) => {
                let t = offset / direction;
                if t < entry {
                    return None;
                }
                exit = exit.min(t);
            }
            // Parallel to this edge: reject when wholly outside it.
            _ => {
                if offset < 0.0 {
                    return None;
                }
            }
        }
    }
    let at = |t: f64| Coord {
        x: (start.x + t * dx).clamp(cell.west(), cell.east()),
        y: (start.y + t * dy).clamp(cell.south(), cell.north()),
    };
    Some((at(entry), at(exit)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Point, Rect, coord};
    use rstest::{fixture, rstest};

    #[fixture]
    fn unit_cell() -> GeoArea {
        GeoArea::from_bounds(0.0, 0.0, 1.0, 1.0)
    }

    fn trail(id: u64, coords: Vec<(f64, f64)>) -> Feature {
        Feature::new(id, Geometry::LineString(LineString::from(coords)), "trail")
    }

    fn square(id: u64, min: (f64, f64), max: (f64, f64)) -> Feature {
        let rect = Rect::new(coord! { x: min.0, y: min.1 }, coord! { x: max.0, y: max.1 });
        Feature::new(id, Geometry::Polygon(rect.to_polygon()), "park")
    }

    #[rstest]
    fn keeps_candidate_order_and_drops_misses(unit_cell: GeoArea) {
        let far = Feature::new(1, Geometry::Point(Point::new(5.0, 5.0)), "bench");
        let east_edge = Feature::new(2, Geometry::Point(Point::new(1.0, 0.5)), "bench");
        let west_edge = Feature::new(4, Geometry::Point(Point::new(0.0, 0.5)), "bench");
        let crossing = trail(3, vec![(-1.0, 0.5), (2.0, 0.5)]);
        let hits = GeometryQuery.intersecting(&unit_cell, &[&crossing, &far, &east_edge, &west_edge]);
        let ids: Vec<u64> = hits.iter().map(|feature| feature.id).collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[rstest]
    #[case((0.0, 0.0), true)]
    #[case((1.0, 0.0), false)]
    #[case((0.0, 1.0), false)]
    #[case((1.0, 1.0), false)]
    #[case((0.5, 0.999_999), true)]
    fn points_use_half_open_cells(
        unit_cell: GeoArea,
        #[case] position: (f64, f64),
        #[case] expected: bool,
    ) {
        let bench = Feature::new(1, Geometry::Point(Point::new(position.0, position.1)), "bench");
        assert_eq!(GeometryQuery.intersecting(&unit_cell, &[&bench]).len(), usize::from(expected));
    }

    #[rstest]
    fn corner_point_belongs_to_one_of_four_cells() {
        let corner = Feature::new(1, Geometry::Point(Point::new(1.0, 1.0)), "bench");
        let owners = [(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)]
            .into_iter()
            .filter(|&(south, west)| {
                let cell = GeoArea::from_bounds(south, west, south + 1.0, west + 1.0);
                !GeometryQuery.intersecting(&cell, &[&corner]).is_empty()
            })
            .collect::<Vec<_>>();
        assert_eq!(owners, vec![(1.0, 1.0)]);
    }

    #[rstest]
    #[case(vec![(0.0, 0.0), (1.0, 0.0)], true)]
    #[case(vec![(0.0, 1.0), (1.0, 1.0)], false)]
    #[case(vec![(1.0, 0.0), (1.0, 1.0)], false)]
    #[case(vec![(0.0, 0.0), (0.0, 1.0)], true)]
    #[case(vec![(1.0, 1.0), (2.0, 2.0)], false)]
    #[case(vec![(-1.0, 2.0), (2.0, -1.0)], true)]
    #[case(vec![(0.5, 0.5)], true)]
    fn lines_use_half_open_cells(
        unit_cell: GeoArea,
        #[case] coords: Vec<(f64, f64)>,
        #[case] expected: bool,
    ) {
        let feature = trail(1, coords);
        assert_eq!(GeometryQuery.intersecting(&unit_cell, &[&feature]).len(), usize::from(expected));
    }

    #[rstest]
    fn polygons_sharing_an_edge_do_not_claim_the_cell(unit_cell: GeoArea) {
        let neighbour = square(1, (1.0, 0.0), (2.0, 1.0));
        let corner = square(2, (1.0, 1.0), (2.0, 2.0));
        let overlapping = square(3, (0.9, 0.9), (2.0, 2.0));
        let covering = square(4, (-1.0, -1.0), (2.0, 2.0));
        let inside = square(5, (0.25, 0.25), (0.75, 0.75));
        let hits = GeometryQuery.intersecting(
            &unit_cell,
            &[&neighbour, &corner, &overlapping, &covering, &inside],
        );
        let ids: Vec<u64> = hits.iter().map(|feature| feature.id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
    }

    #[rstest]
    fn edges_at_the_pole_stay_closed() {
        let cell = GeoArea::from_bounds(89.0, 179.0, 90.0, 180.0);
        let pole = Feature::new(1, Geometry::Point(Point::new(180.0, 90.0)), "marker");
        assert_eq!(GeometryQuery.intersecting(&cell, &[&pole]).len(), 1);
    }
}
