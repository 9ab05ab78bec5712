//! Errors raised by grid addressing and cell resolution.

use thiserror::Error;

/// Errors returned when encoding, decoding, or resolving grid cells.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GridError {
    /// A latitude or longitude was non-finite or outside ±90/±180.
    #[error("coordinate ({latitude}, {longitude}) is outside the valid range")]
    InvalidCoordinate {
        /// Offending latitude in degrees.
        latitude: f64,
        /// Offending longitude in degrees.
        longitude: f64,
    },
    /// A cell address string could not be parsed.
    #[error("invalid cell address {address:?}: {reason}")]
    InvalidAddress {
        /// The rejected input.
        address: String,
        /// Which rule the input broke.
        reason: &'static str,
    },
    /// A generalized-grid tile index fell outside `[0, tile_count)`.
    #[error("tile index {index} at layer {layer} is outside [0, {tile_count})")]
    OutOfRange {
        /// Zero-based layer, outermost first.
        layer: u32,
        /// Computed or supplied index.
        index: i64,
        /// Tiles per axis in the configured grid.
        tile_count: u32,
    },
    /// A generalized grid was configured with unusable dimensions.
    #[error(
        "grid needs tile_count >= 2 and layer_count in 1..=32, got {tile_count}x{layer_count}"
    )]
    InvalidConfig {
        /// Requested tiles per axis.
        tile_count: u32,
        /// Requested nesting depth.
        layer_count: u32,
    },
    /// A digit count did not name a supported precision.
    #[error("unsupported cell precision of {digits} digits")]
    InvalidPrecision {
        /// Requested digit count.
        digits: u8,
    },
}
