//! Generalized grid with a configurable branching factor and depth.
//!
//! The globe is split into `tile_count × tile_count` tiles of
//! `360 / tile_count` degrees, each of which is split again, `layer_count`
//! times. A location is addressed by one [`TileIndex`] per layer.

use std::{fmt, str::FromStr};

use crate::{
    GeoArea, GeoPoint, GridError,
    geometry::{MAX_LATITUDE, MAX_LONGITUDE},
};

/// Deepest nesting accepted by [`GridConfig::new`].
pub const MAX_LAYER_COUNT: u32 = 32;

const PAIR_SEPARATOR: char = '_';
const AXIS_SEPARATOR: char = '-';

/// Branching factor and depth of a generalized grid.
///
/// # Examples
/// ```
/// use cellmark_core::grid::GridConfig;
///
/// let config = GridConfig::new(20, 2).unwrap();
/// assert!((config.tile_width_degrees() - 0.9).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawGridConfig")
)]
pub struct GridConfig {
    tile_count: u32,
    layer_count: u32,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawGridConfig {
    tile_count: u32,
    layer_count: u32,
}

#[cfg(feature = "serde")]
impl TryFrom<RawGridConfig> for GridConfig {
    type Error = GridError;

    fn try_from(raw: RawGridConfig) -> Result<Self, Self::Error> {
        Self::new(raw.tile_count, raw.layer_count)
    }
}

impl GridConfig {
    /// Validate and build a configuration.
    ///
    /// # Errors
    /// Returns [`GridError::InvalidConfig`] when `tile_count < 2` or
    /// `layer_count` is outside `1..=32`.
    pub const fn new(tile_count: u32, layer_count: u32) -> Result<Self, GridError> {
        if tile_count < 2 || layer_count == 0 || layer_count > MAX_LAYER_COUNT {
            return Err(GridError::InvalidConfig {
                tile_count,
                layer_count,
            });
        }
        Ok(Self {
            tile_count,
            layer_count,
        })
    }

    /// Tiles per axis at every layer.
    #[must_use]
    pub const fn tile_count(&self) -> u32 {
        self.tile_count
    }

    /// Number of nested layers.
    #[must_use]
    pub const fn layer_count(&self) -> u32 {
        self.layer_count
    }

    /// Edge of the finest tile: `360 / tile_count^layer_count`.
    #[must_use]
    pub fn tile_width_degrees(&self) -> f64 {
        width_at_depth(self.tile_count, self.layer_count)
    }

    /// Edge of a tile at zero-based `layer`: `360 / tile_count^(layer + 1)`.
    #[must_use]
    pub fn layer_width_degrees(&self, layer: u32) -> f64 {
        width_at_depth(self.tile_count, layer.saturating_add(1))
    }

    /// Address the finest tile containing `point`.
    ///
    /// Points on the northern or eastern edge of the globe belong to the
    /// tile that ends there.
    ///
    /// # Errors
    /// Returns [`GridError::InvalidCoordinate`] for non-finite input and
    /// [`GridError::OutOfRange`] when the outermost index falls outside
    /// `[0, tile_count)`, which happens for coordinates beyond ±90/±180.
    pub fn encode(&self, point: GeoPoint) -> Result<TilePath, GridError> {
        if !(point.latitude.is_finite() && point.longitude.is_finite()) {
            return Err(GridError::InvalidCoordinate {
                latitude: point.latitude,
                longitude: point.longitude,
            });
        }
        let columns = self.axis_indices(point.longitude, -MAX_LONGITUDE, MAX_LONGITUDE)?;
        let rows = self.axis_indices(point.latitude, -MAX_LATITUDE, MAX_LATITUDE)?;
        Ok(TilePath(
            columns
                .into_iter()
                .zip(rows)
                .map(|(x, y)| TileIndex { x, y })
                .collect(),
        ))
    }

    /// Return the box of the finest tile named by `path`.
    ///
    /// # Errors
    /// Returns [`GridError::InvalidAddress`] when the path length differs
    /// from the layer count and [`GridError::OutOfRange`] for any index not
    /// below `tile_count`.
    #[expect(
        clippy::float_arithmetic,
        reason = "tile corners are sums of index times layer width"
    )]
    pub fn decode(&self, path: &TilePath) -> Result<GeoArea, GridError> {
        if path.0.len() != usize::try_from(self.layer_count).unwrap_or(usize::MAX) {
            return Err(GridError::InvalidAddress {
                address: path.to_string(),
                reason: "path length differs from the grid's layer count",
            });
        }
        let mut south = -MAX_LATITUDE;
        let mut west = -MAX_LONGITUDE;
        for (layer, tile) in (0_u32..).zip(&path.0) {
            for index in [tile.x, tile.y] {
                if index >= self.tile_count {
                    return Err(GridError::OutOfRange {
                        layer,
                        index: i64::from(index),
                        tile_count: self.tile_count,
                    });
                }
            }
            let width = self.layer_width_degrees(layer);
            west += f64::from(tile.x) * width;
            south += f64::from(tile.y) * width;
        }
        let size = self.tile_width_degrees();
        Ok(GeoArea::from_bounds(south, west, south + size, west + size))
    }

    /// Walk one axis down every layer, accumulating the tile corner exactly
    /// as [`GridConfig::decode`] does.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "indices are floored and range-checked before narrowing"
    )]
    fn axis_indices(
        &self,
        coordinate: f64,
        origin: f64,
        far_edge: f64,
    ) -> Result<Vec<u32>, GridError> {
        let tiles = f64::from(self.tile_count);
        let last = tiles - 1.0;
        let on_far_edge = coordinate >= far_edge;
        let mut corner = origin;
        let mut indices = Vec::with_capacity(usize::try_from(self.layer_count).unwrap_or(0));

        for layer in 0..self.layer_count {
            let width = self.layer_width_degrees(layer);
            let mut index = ((coordinate - corner) / width).floor();
            if on_far_edge && index > 0.0 && corner + index * width >= coordinate {
                index -= 1.0;
            }
            if layer == 0 && (coordinate < origin || coordinate > far_edge) {
                return Err(GridError::OutOfRange {
                    layer,
                    index: index as i64,
                    tile_count: self.tile_count,
                });
            }
            // Floating-point drift can push an index one step out. Both
            // edges are compared in the form `decode` computes them.
            index = index.clamp(0.0, last);
            if index > 0.0 && corner + index * width > coordinate {
                index -= 1.0;
            } else if !on_far_edge && index < last && corner + index * width + width <= coordinate {
                index += 1.0;
            }
            corner += index * width;
            indices.push(index as u32);
        }
        Ok(indices)
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "tile widths divide the full circle by a power of the tile count"
)]
fn width_at_depth(tile_count: u32, depth: u32) -> f64 {
    let exponent = i32::try_from(depth).unwrap_or(i32::MAX);
    360.0 / f64::from(tile_count).powi(exponent)
}

/// Column (`x`, longitude) and row (`y`, latitude) of a tile within its
/// parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileIndex {
    /// Column counted eastwards from the parent's western edge.
    pub x: u32,
    /// Row counted northwards from the parent's southern edge.
    pub y: u32,
}

impl TileIndex {
    /// Construct an index pair.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// One [`TileIndex`] per layer, outermost first.
///
/// Displays as its storage key, e.g. `10-5_3-19`, and parses back from
/// the same form.
///
/// # Examples
/// ```
/// use cellmark_core::grid::{TileIndex, TilePath};
///
/// let path = TilePath::new(vec![TileIndex::new(10, 5), TileIndex::new(3, 19)]);
/// assert_eq!(path.to_string(), "10-5_3-19");
/// assert_eq!("10-5_3-19".parse::<TilePath>().unwrap(), path);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TilePath(Vec<TileIndex>);

impl TilePath {
    /// Wrap a sequence of indices.
    #[must_use]
    pub const fn new(tiles: Vec<TileIndex>) -> Self {
        Self(tiles)
    }

    /// Borrow the indices.
    #[must_use]
    pub fn tiles(&self) -> &[TileIndex] {
        &self.0
    }

    /// Number of layers in the path.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Report whether the path has no layers.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, tile) in self.0.iter().enumerate() {
            if position > 0 {
                write!(f, "{PAIR_SEPARATOR}")?;
            }
            write!(f, "{}{AXIS_SEPARATOR}{}", tile.x, tile.y)?;
        }
        Ok(())
    }
}

impl FromStr for TilePath {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| GridError::InvalidAddress {
            address: s.to_owned(),
            reason,
        };
        if s.is_empty() {
            return Err(invalid("tile path is empty"));
        }
        s.split(PAIR_SEPARATOR)
            .map(|pair| {
                let (x, y) = pair
                    .split_once(AXIS_SEPARATOR)
                    .ok_or_else(|| invalid("tile pair is missing its separator"))?;
                let parse = |digits: &str| {
                    digits
                        .parse::<u32>()
                        .map_err(|_| invalid("tile index is not a non-negative integer"))
                };
                Ok(TileIndex::new(parse(x)?, parse(y)?))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// Storage key for a tile path: pairs as `x-y`, joined by `_`.
#[must_use]
pub fn name_of(path: &TilePath) -> String {
    path.to_string()
}
