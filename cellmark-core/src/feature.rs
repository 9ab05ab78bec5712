//! Map features and the read-only projections emitted for grid cells.
//!
//! Features are owned by the ingestion and storage collaborators. The core
//! only reads them: it measures their geometry, tests intersection with
//! cells, and copies a small [`FeatureProjection`] into its results.

use std::collections::HashMap;

use geo::{Area, BoundingRect, Geometry};

use crate::GeoArea;

/// OpenStreetMap-style free-form tags.
pub type Tags = HashMap<String, String>;

/// Coarse classification of a feature's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    /// `Point` or `MultiPoint`.
    Point,
    /// `Line`, `LineString` or `MultiLineString`.
    Line,
    /// `Polygon`, `MultiPolygon`, `Rect` or `Triangle`.
    Polygon,
    /// Geometry collections and anything else without a single kind.
    Other,
}

impl GeometryKind {
    /// Classify a geometry.
    #[must_use]
    pub const fn of(geometry: &Geometry<f64>) -> Self {
        match geometry {
            Geometry::Point(_) | Geometry::MultiPoint(_) => Self::Point,
            Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => {
                Self::Line
            }
            Geometry::Polygon(_)
            | Geometry::MultiPolygon(_)
            | Geometry::Rect(_)
            | Geometry::Triangle(_) => Self::Polygon,
            _ => Self::Other,
        }
    }
}

/// A tagged map element with geometry.
///
/// # Examples
/// ```
/// use geo::{Geometry, Point};
/// use cellmark_core::{Feature, GeometryKind};
///
/// let fountain = Feature::new(7, Geometry::Point(Point::new(0.5, 51.2)), "fountain")
///     .with_name("Old Fountain");
/// assert_eq!(fountain.kind(), GeometryKind::Point);
/// assert_eq!(fountain.area(), 0.0);
/// assert_eq!(fountain.projection().name.as_deref(), Some("Old Fountain"));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Feature {
    /// Stable identifier assigned by the storage collaborator.
    pub id: u64,
    /// Shape in WGS84 degrees (`x = longitude`, `y = latitude`).
    pub geometry: Geometry<f64>,
    /// Human-readable name, if any.
    pub name: Option<String>,
    /// Game element type, e.g. `park` or `water`.
    pub label: String,
}

impl Feature {
    /// Construct an unnamed feature.
    #[must_use]
    pub fn new(id: u64, geometry: Geometry<f64>, label: impl Into<String>) -> Self {
        Self {
            id,
            geometry,
            name: None,
            label: label.into(),
        }
    }

    /// Construct a feature whose name is looked up from `tags`.
    ///
    /// # Examples
    /// ```
    /// use geo::{Geometry, Point};
    /// use cellmark_core::{Feature, TagNameLookup, Tags};
    ///
    /// let tags = Tags::from([("name".into(), "Museum".into())]);
    /// let feature = Feature::from_tags(
    ///     1,
    ///     Geometry::Point(Point::new(0.0, 0.0)),
    ///     "tourism",
    ///     &tags,
    ///     &TagNameLookup::default(),
    /// );
    /// assert_eq!(feature.name.as_deref(), Some("Museum"));
    /// ```
    #[must_use]
    pub fn from_tags(
        id: u64,
        geometry: Geometry<f64>,
        label: impl Into<String>,
        tags: &Tags,
        names: &impl NameLookup,
    ) -> Self {
        Self {
            name: names.display_name(tags),
            ..Self::new(id, geometry, label)
        }
    }

    /// Attach a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Classification of the geometry.
    #[must_use]
    pub const fn kind(&self) -> GeometryKind {
        GeometryKind::of(&self.geometry)
    }

    /// Unsigned planar area in square degrees.
    ///
    /// Lines and points have no area and report `0.0`, so they always rank
    /// as more specific than any polygon.
    #[must_use]
    pub fn area(&self) -> f64 {
        match self.kind() {
            GeometryKind::Polygon | GeometryKind::Other => self.geometry.unsigned_area(),
            GeometryKind::Point | GeometryKind::Line => 0.0,
        }
    }

    /// Bounding box of the geometry, or `None` for empty geometry.
    #[must_use]
    pub fn bounding_area(&self) -> Option<GeoArea> {
        self.geometry.bounding_rect().map(GeoArea::from)
    }

    /// Minimal read-only view used in resolver results.
    #[must_use]
    pub fn projection(&self) -> FeatureProjection {
        FeatureProjection {
            name: self.name.clone(),
            label: self.label.clone(),
            id: self.id,
        }
    }
}

/// The `(name, label, id)` tuple copied into cell results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureProjection {
    /// Display name of the feature, if any.
    pub name: Option<String>,
    /// Game element type.
    pub label: String,
    /// Identifier of the source feature.
    pub id: u64,
}

/// Resolve a tag set to a human-readable name.
pub trait NameLookup {
    /// Return the display name for `tags`, or `None` when nothing fits.
    fn display_name(&self, tags: &Tags) -> Option<String>;
}

/// [`NameLookup`] that returns the first non-blank value of a key list.
///
/// The default list is just `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNameLookup {
    keys: Vec<String>,
}

impl TagNameLookup {
    /// Look names up by the given keys, in priority order.
    #[must_use]
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for TagNameLookup {
    fn default() -> Self {
        Self::with_keys(["name"])
    }
}

impl NameLookup for TagNameLookup {
    fn display_name(&self, tags: &Tags) -> Option<String> {
        self.keys
            .iter()
            .filter_map(|key| tags.get(key))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
            .map(str::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Point, Rect, coord, polygon};
    use rstest::rstest;

    #[rstest]
    fn polygon_area_is_planar_square_degrees() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
        ];
        let feature = Feature::new(1, Geometry::Polygon(square), "park");
        assert_eq!(feature.kind(), GeometryKind::Polygon);
        assert!((feature.area() - 4.0).abs() < 1e-12);
    }

    #[rstest]
    #[case(Geometry::Point(Point::new(1.0, 1.0)), GeometryKind::Point)]
    #[case(
        Geometry::LineString(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)])),
        GeometryKind::Line
    )]
    #[case(
        Geometry::Rect(Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 })),
        GeometryKind::Polygon
    )]
    fn classifies_geometry(#[case] geometry: Geometry<f64>, #[case] expected: GeometryKind) {
        assert_eq!(GeometryKind::of(&geometry), expected);
    }

    #[rstest]
    fn lines_have_no_area() {
        let line = LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        let feature = Feature::new(2, Geometry::LineString(line), "trail");
        assert_eq!(feature.area(), 0.0);
    }

    #[rstest]
    fn tag_lookup_prefers_earlier_keys_and_skips_blanks() {
        let lookup = TagNameLookup::with_keys(["name:en", "name"]);
        let tags = Tags::from([
            ("name:en".into(), "  ".into()),
            ("name".into(), "Parc".into()),
        ]);
        assert_eq!(lookup.display_name(&tags).as_deref(), Some("Parc"));
    }

    #[rstest]
    fn tag_lookup_returns_none_without_name() {
        let tags = Tags::from([("amenity".into(), "bench".into())]);
        assert_eq!(TagNameLookup::default().display_name(&tags), None);
    }
}
