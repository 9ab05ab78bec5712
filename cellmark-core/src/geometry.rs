//! Geographic value types shared by every addressing scheme.
//!
//! Coordinates are WGS84 degrees. [`GeoPoint`] keeps the familiar
//! `(latitude, longitude)` order while converting losslessly to
//! [`geo::Coord`] (`x = longitude`, `y = latitude`) for geometry operations.

use geo::{Coord, Intersects, Polygon, Rect};

use crate::GridError;

/// Largest valid latitude magnitude in degrees.
pub const MAX_LATITUDE: f64 = 90.0;

/// Largest valid longitude magnitude in degrees.
pub const MAX_LONGITUDE: f64 = 180.0;

/// A single WGS84 position.
///
/// # Examples
/// ```
/// use cellmark_core::GeoPoint;
///
/// let point = GeoPoint::new(51.5, -0.12);
/// assert_eq!(point.latitude, 51.5);
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    /// Degrees north of the equator.
    pub latitude: f64,
    /// Degrees east of the prime meridian.
    pub longitude: f64,
}

impl GeoPoint {
    /// Construct a point without validating the range.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Report whether both components are finite and inside ±90/±180.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-MAX_LATITUDE..=MAX_LATITUDE).contains(&self.latitude)
            && (-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&self.longitude)
    }

    /// Return `self` when valid, otherwise [`GridError::InvalidCoordinate`].
    ///
    /// # Errors
    /// Fails for non-finite or out-of-range components.
    pub fn validated(self) -> Result<Self, GridError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(GridError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        Self {
            x: point.longitude,
            y: point.latitude,
        }
    }
}

impl From<Coord<f64>> for GeoPoint {
    fn from(coord: Coord<f64>) -> Self {
        Self::new(coord.y, coord.x)
    }
}

/// Axis-aligned bounding box in degrees.
///
/// Corners are normalised on construction so `south <= north` and
/// `west <= east` always hold. Regions crossing the antimeridian are not
/// modelled; callers split them into two areas.
///
/// # Examples
/// ```
/// use cellmark_core::{GeoArea, GeoPoint};
///
/// let area = GeoArea::new(GeoPoint::new(1.0, 2.0), GeoPoint::new(0.0, 0.0));
/// assert_eq!(area.south(), 0.0);
/// assert_eq!(area.east(), 2.0);
/// assert!(area.contains(GeoPoint::new(0.5, 1.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoArea {
    rect: Rect<f64>,
}

impl GeoArea {
    /// Build the box spanned by two opposite corners.
    #[must_use]
    pub fn new(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            rect: Rect::new(Coord::from(a), Coord::from(b)),
        }
    }

    /// Build the box from its four edges.
    #[must_use]
    pub fn from_bounds(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(GeoPoint::new(south, west), GeoPoint::new(north, east))
    }

    /// Build the box after checking both corners are finite.
    ///
    /// # Errors
    /// Returns [`GridError::InvalidCoordinate`] for the first non-finite
    /// corner.
    pub fn try_new(a: GeoPoint, b: GeoPoint) -> Result<Self, GridError> {
        for corner in [a, b] {
            if !(corner.latitude.is_finite() && corner.longitude.is_finite()) {
                return Err(GridError::InvalidCoordinate {
                    latitude: corner.latitude,
                    longitude: corner.longitude,
                });
            }
        }
        Ok(Self::new(a, b))
    }

    /// Southern edge (minimum latitude).
    #[must_use]
    pub fn south(&self) -> f64 {
        self.rect.min().y
    }

    /// Western edge (minimum longitude).
    #[must_use]
    pub fn west(&self) -> f64 {
        self.rect.min().x
    }

    /// Northern edge (maximum latitude).
    #[must_use]
    pub fn north(&self) -> f64 {
        self.rect.max().y
    }

    /// Eastern edge (maximum longitude).
    #[must_use]
    pub fn east(&self) -> f64 {
        self.rect.max().x
    }

    /// South-west corner.
    #[must_use]
    pub fn south_west(&self) -> GeoPoint {
        GeoPoint::from(self.rect.min())
    }

    /// North-east corner.
    #[must_use]
    pub fn north_east(&self) -> GeoPoint {
        GeoPoint::from(self.rect.max())
    }

    /// Width in degrees of longitude.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.rect.width()
    }

    /// Height in degrees of latitude.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.rect.height()
    }

    /// Centre of the box.
    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint::from(self.rect.center())
    }

    /// Boundary-inclusive containment test.
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.south()..=self.north()).contains(&point.latitude)
            && (self.west()..=self.east()).contains(&point.longitude)
    }

    /// Report whether the boxes overlap or touch.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.rect.intersects(&other.rect)
    }

    /// Grow the box by `margin` degrees on every side.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "expanding a box offsets each edge by the margin"
    )]
    pub fn expand(&self, margin: f64) -> Self {
        Self::from_bounds(
            self.south() - margin,
            self.west() - margin,
            self.north() + margin,
            self.east() + margin,
        )
    }

    /// Borrow the underlying [`geo::Rect`].
    #[must_use]
    pub const fn as_rect(&self) -> &Rect<f64> {
        &self.rect
    }

    /// Convert to a closed polygon for boolean operations.
    #[must_use]
    pub fn to_polygon(&self) -> Polygon<f64> {
        self.rect.to_polygon()
    }
}

impl From<Rect<f64>> for GeoArea {
    fn from(rect: Rect<f64>) -> Self {
        Self { rect }
    }
}

impl From<GeoArea> for Rect<f64> {
    fn from(area: GeoArea) -> Self {
        area.rect
    }
}
