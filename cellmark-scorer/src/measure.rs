//! Planar measurements of feature geometry, optionally clipped to a region.

use cellmark_core::GeoArea;
use geo::{Area, BooleanOps, Geometry, LineString, MultiLineString, MultiPolygon};

/// Size of a geometry in the units used for scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Extent {
    /// Square degrees covered by a polygonal geometry.
    Area(f64),
    /// Degrees travelled along a linear geometry.
    Length(f64),
    /// Points, empty clips, and geometry without a single kind.
    Unit,
}

/// Measure the full geometry.
pub(crate) fn extent(geometry: &Geometry<f64>) -> Extent {
    if let Some(polygons) = as_multi_polygon(geometry) {
        return Extent::Area(polygons.unsigned_area());
    }
    if let Some(lines) = as_multi_line_string(geometry) {
        return Extent::Length(planar_length(&lines));
    }
    Extent::Unit
}

/// Measure the part of `geometry` that falls inside `region`.
///
/// Polygons are intersected with the region, lines are clipped to it.
/// Contact without any overlap, such as a shared edge, yields
/// [`Extent::Unit`].
pub(crate) fn clipped_extent(geometry: &Geometry<f64>, region: &GeoArea) -> Extent {
    let bounds = region.to_polygon();
    if let Some(polygons) = as_multi_polygon(geometry) {
        let area = polygons.intersection(&bounds).unsigned_area();
        return if area > 0.0 {
            Extent::Area(area)
        } else {
            Extent::Unit
        };
    }
    if let Some(lines) = as_multi_line_string(geometry) {
        let length = planar_length(&bounds.clip(&lines, false));
        return if length > 0.0 {
            Extent::Length(length)
        } else {
            Extent::Unit
        };
    }
    Extent::Unit
}

/// Sum of the Euclidean segment lengths in degrees.
pub(crate) fn planar_length(lines: &MultiLineString<f64>) -> f64 {
    lines
        .iter()
        .flat_map(LineString::lines)
        .map(|segment| segment.dx().hypot(segment.dy()))
        .sum()
}

fn as_multi_polygon(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon.clone()])),
        Geometry::MultiPolygon(polygons) => Some(polygons.clone()),
        Geometry::Rect(rect) => Some(MultiPolygon::new(vec![rect.to_polygon()])),
        Geometry::Triangle(triangle) => Some(MultiPolygon::new(vec![triangle.to_polygon()])),
        _ => None,
    }
}

fn as_multi_line_string(geometry: &Geometry<f64>) -> Option<MultiLineString<f64>> {
    match geometry {
        Geometry::Line(line) => Some(MultiLineString::new(vec![LineString::from(vec![
            line.start, line.end,
        ])])),
        Geometry::LineString(line) => Some(MultiLineString::new(vec![line.clone()])),
        Geometry::MultiLineString(lines) => Some(lines.clone()),
        _ => None,
    }
}
