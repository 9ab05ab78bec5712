//! Grid addressing schemes.
//!
//! Two families of address live here and are never mixed:
//!
//! - [`plus_code`]: the standard 20-symbol hierarchical grid addressed by
//!   [`CellAddress`].
//! - [`custom`]: a generalized grid with a configurable tile count and
//!   depth, addressed by [`TilePath`].

pub mod custom;
pub mod plus_code;

pub use custom::{GridConfig, MAX_LAYER_COUNT, TileIndex, TilePath, name_of};
pub use plus_code::{
    ALPHABET, CellAddress, CellCodec, PlusCodeCodec, Precision, SEPARATOR, is_well_formed,
};
