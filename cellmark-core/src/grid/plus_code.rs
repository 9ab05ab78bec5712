//! Standard hierarchical grid: pair-encoded 20-symbol location codes.
//!
//! Each pair of digits narrows a cell twentyfold in both latitude and
//! longitude, so a `Cell8` contains 400 `Cell10` children. Addresses are
//! stored without the `+` separator; parsing accepts it and any case.
//!
//! | Precision | Digits | Cell size   |
//! |-----------|--------|-------------|
//! | `Cell2`   | 2      | 20°         |
//! | `Cell4`   | 4      | 1°          |
//! | `Cell6`   | 6      | 0.05°       |
//! | `Cell8`   | 8      | 0.0025°     |
//! | `Cell10`  | 10     | 0.000125°   |

use std::{fmt, str::FromStr};

use crate::{GeoArea, GeoPoint, GridError, geometry::MAX_LATITUDE};

/// Digits of the grid alphabet, in value order.
pub const ALPHABET: &str = "23456789CFGHJMPQRVWX";

/// Separator accepted (and discarded) when parsing addresses.
pub const SEPARATOR: char = '+';

const ALPHABET_BYTES: [u8; 20] = *b"23456789CFGHJMPQRVWX";
const BASE: u64 = 20;

/// `Cell10` cells per degree on either axis.
const FINEST_CELLS_PER_DEGREE: f64 = 8000.0;

/// Value, in `Cell10` units, of one digit in each pair position.
const PAIR_PLACE_VALUES: [u64; 5] = [LEADING_PLACE_VALUE, 8_000, 400, 20, 1];

const LEADING_PLACE_VALUE: u64 = 160_000;

/// `Cell10` rows covering 180° of latitude.
const LATITUDE_UNITS: u64 = 1_440_000;

/// `Cell10` columns covering 360° of longitude.
const LONGITUDE_UNITS: u64 = 2_880_000;

/// Longest candidate accepted by [`is_well_formed`].
const MAX_CANDIDATE_DIGITS: usize = 12;

/// Nesting depth of a standard grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Precision {
    /// Two digits, 20° cells.
    Cell2,
    /// Four digits, 1° cells.
    Cell4,
    /// Six digits, 0.05° cells.
    Cell6,
    /// Eight digits, 0.0025° cells.
    Cell8,
    /// Ten digits, 0.000125° cells; the finest cell.
    Cell10,
}

impl Precision {
    /// The atomic resolution of area search.
    pub const FINEST: Self = Self::Cell10;

    /// Number of digits in an address of this precision.
    #[must_use]
    pub const fn digits(self) -> usize {
        match self {
            Self::Cell2 => 2,
            Self::Cell4 => 4,
            Self::Cell6 => 6,
            Self::Cell8 => 8,
            Self::Cell10 => 10,
        }
    }

    /// Edge length of a cell in degrees (identical on both axes).
    #[must_use]
    pub const fn resolution_degrees(self) -> f64 {
        match self {
            Self::Cell2 => 20.0,
            Self::Cell4 => 1.0,
            Self::Cell6 => 0.05,
            Self::Cell8 => 0.0025,
            Self::Cell10 => 0.000_125,
        }
    }

    /// Area of one cell in square degrees.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "cell area is the square of the edge length"
    )]
    pub const fn cell_area(self) -> f64 {
        let edge = self.resolution_degrees();
        edge * edge
    }

    /// The next finer precision, if any.
    #[must_use]
    pub const fn finer(self) -> Option<Self> {
        match self {
            Self::Cell2 => Some(Self::Cell4),
            Self::Cell4 => Some(Self::Cell6),
            Self::Cell6 => Some(Self::Cell8),
            Self::Cell8 => Some(Self::Cell10),
            Self::Cell10 => None,
        }
    }

    const fn from_digits(digits: usize) -> Option<Self> {
        match digits {
            2 => Some(Self::Cell2),
            4 => Some(Self::Cell4),
            6 => Some(Self::Cell6),
            8 => Some(Self::Cell8),
            10 => Some(Self::Cell10),
            _ => None,
        }
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self::FINEST
    }
}

impl TryFrom<u8> for Precision {
    type Error = GridError;

    fn try_from(digits: u8) -> Result<Self, Self::Error> {
        Self::from_digits(usize::from(digits)).ok_or(GridError::InvalidPrecision { digits })
    }
}

/// A validated standard-grid address such as `86HWGGGPW6`.
///
/// # Examples
/// ```
/// use cellmark_core::{CellAddress, Precision};
///
/// let cell: CellAddress = "86hwgggp+w6".parse().unwrap();
/// assert_eq!(cell.as_str(), "86HWGGGPW6");
/// assert_eq!(cell.precision(), Precision::Cell10);
/// assert_eq!(cell.parent(Precision::Cell8).unwrap().as_str(), "86HWGGGP");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct CellAddress(String);

impl CellAddress {
    /// Borrow the digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Precision implied by the digit count.
    #[must_use]
    pub fn precision(&self) -> Precision {
        Precision::from_digits(self.0.len()).unwrap_or(Precision::FINEST)
    }

    /// The enclosing cell at a coarser (or equal) precision.
    ///
    /// Returns `None` when `precision` is finer than this address.
    #[must_use]
    pub fn parent(&self, precision: Precision) -> Option<Self> {
        self.0.get(..precision.digits()).map(|digits| Self(digits.to_owned()))
    }

    /// The 400 cells of the next finer precision, row by row from the
    /// south-west. Empty for `Cell10`.
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        if self.precision().finer().is_none() {
            return Vec::new();
        }
        ALPHABET
            .chars()
            .flat_map(|row| {
                ALPHABET
                    .chars()
                    .map(move |column| Self(format!("{}{row}{column}", self.0)))
            })
            .collect()
    }

    fn digit_values(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.bytes().filter_map(digit_value)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CellAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CellAddress {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = normalise(s);
        let invalid = |reason| GridError::InvalidAddress {
            address: s.to_owned(),
            reason,
        };
        if !normalised.bytes().all(|byte| digit_value(byte).is_some()) {
            return Err(invalid("contains characters outside the grid alphabet"));
        }
        if Precision::from_digits(normalised.len()).is_none() {
            return Err(invalid(
                "length must be an even number of digits from 2 to 10",
            ));
        }
        let mut leading = normalised.bytes().filter_map(digit_value);
        let (Some(latitude), Some(longitude)) = (leading.next(), leading.next()) else {
            return Err(invalid("missing leading pair"));
        };
        if latitude * LEADING_PLACE_VALUE >= LATITUDE_UNITS
            || longitude * LEADING_PLACE_VALUE >= LONGITUDE_UNITS
        {
            return Err(invalid("leading pair lies outside the globe"));
        }
        Ok(Self(normalised))
    }
}

impl TryFrom<String> for CellAddress {
    type Error = GridError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellAddress> for String {
    fn from(address: CellAddress) -> Self {
        address.0
    }
}

/// Encode/decode primitive for the standard grid.
///
/// The resolver drives addressing exclusively through this trait so that
/// callers may substitute another implementation of the same alphabet.
pub trait CellCodec: Send + Sync {
    /// Encode the cell of `precision` containing `point`.
    ///
    /// # Errors
    /// Returns [`GridError::InvalidCoordinate`] for out-of-range input.
    fn encode(&self, point: GeoPoint, precision: Precision) -> Result<CellAddress, GridError>;

    /// Return the bounding box of a validated address.
    fn decode(&self, address: &CellAddress) -> GeoArea;

    /// Parse and decode an address string.
    ///
    /// # Errors
    /// Returns [`GridError::InvalidAddress`] when `address` is malformed.
    fn decode_str(&self, address: &str) -> Result<GeoArea, GridError> {
        Ok(self.decode(&address.parse()?))
    }
}

/// The bundled [`CellCodec`].
///
/// Coordinates are converted to whole `Cell10` units before digit
/// extraction, so every digit comes from integer arithmetic.
///
/// # Examples
/// ```
/// use cellmark_core::{CellCodec, GeoPoint, PlusCodeCodec, Precision};
///
/// let codec = PlusCodeCodec;
/// let point = GeoPoint::new(47.365_562, 8.524_994);
/// let cell = codec.encode(point, Precision::Cell10).unwrap();
/// assert_eq!(cell.as_str(), "8FVC9G8F6X");
/// assert!(codec.decode(&cell).contains(point));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlusCodeCodec;

impl CellCodec for PlusCodeCodec {
    #[expect(
        clippy::integer_division,
        clippy::integer_division_remainder_used,
        reason = "digits are extracted from whole cell units in base 20"
    )]
    fn encode(&self, point: GeoPoint, precision: Precision) -> Result<CellAddress, GridError> {
        let (mut latitude_units, mut longitude_units) =
            finest_units(point.validated()?, precision);

        let mut digits = [0_u8; 10];
        for pair in digits.rchunks_exact_mut(2) {
            if let [latitude_digit, longitude_digit] = pair {
                *latitude_digit = alphabet_byte(latitude_units % BASE);
                *longitude_digit = alphabet_byte(longitude_units % BASE);
            }
            latitude_units /= BASE;
            longitude_units /= BASE;
        }

        let encoded: String = digits
            .iter()
            .take(precision.digits())
            .map(|&byte| char::from(byte))
            .collect();
        Ok(CellAddress(encoded))
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "cell units are bounded well inside f64's exact integer range"
    )]
    fn decode(&self, address: &CellAddress) -> GeoArea {
        let mut latitude_units = 0_u64;
        let mut longitude_units = 0_u64;
        let mut span_units = LEADING_PLACE_VALUE;
        let mut values = address.digit_values();
        for place in PAIR_PLACE_VALUES {
            let (Some(latitude), Some(longitude)) = (values.next(), values.next()) else {
                break;
            };
            latitude_units += latitude * place;
            longitude_units += longitude * place;
            span_units = place;
        }
        // Both edges come from whole units so neighbouring cells share them
        // bit for bit.
        let to_latitude = |units: u64| units as f64 / FINEST_CELLS_PER_DEGREE - MAX_LATITUDE;
        let to_longitude = |units: u64| units as f64 / FINEST_CELLS_PER_DEGREE - 180.0;
        GeoArea::from_bounds(
            to_latitude(latitude_units),
            to_longitude(longitude_units),
            to_latitude(latitude_units + span_units),
            to_longitude(longitude_units + span_units),
        )
    }
}

/// Heuristic filter for free text that might be a cell address.
///
/// After upper-casing and stripping [`SEPARATOR`], the candidate must have
/// an even length from 2 to 12, use only the grid alphabet, and must not
/// read as a plain decimal number.
///
/// # Examples
/// ```
/// use cellmark_core::grid::is_well_formed;
///
/// assert!(is_well_formed("86hwgggp+w6"));
/// assert!(!is_well_formed("2345"));
/// assert!(!is_well_formed("86HWG"));
/// ```
#[must_use]
pub fn is_well_formed(candidate: &str) -> bool {
    let normalised = normalise(candidate);
    let length = normalised.len();
    normalised.bytes().all(|byte| digit_value(byte).is_some())
        && (2..=MAX_CANDIDATE_DIGITS).contains(&length)
        && length.is_multiple_of(2)
        && normalised.parse::<f64>().is_err()
}

fn normalise(candidate: &str) -> String {
    candidate
        .chars()
        .filter(|&c| c != SEPARATOR)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn digit_value(byte: u8) -> Option<u64> {
    ALPHABET_BYTES
        .iter()
        .position(|&candidate| candidate == byte)
        .and_then(|index| u64::try_from(index).ok())
}

fn alphabet_byte(value: u64) -> u8 {
    usize::try_from(value)
        .ok()
        .and_then(|index| ALPHABET_BYTES.get(index))
        .copied()
        .unwrap_or(b'2')
}

/// Convert a validated point into whole `Cell10` rows and columns.
///
/// The products are rounded to six decimals before truncation so that
/// coordinates sitting on a cell boundary land in the cell they start.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::integer_division_remainder_used,
    reason = "offsets are non-negative and bounded by the unit counts"
)]
fn finest_units(point: GeoPoint, precision: Precision) -> (u64, u64) {
    let latitude = if point.latitude >= MAX_LATITUDE {
        MAX_LATITUDE - precision.resolution_degrees()
    } else {
        point.latitude
    };
    let longitude = if point.longitude >= 180.0 {
        point.longitude - 360.0
    } else {
        point.longitude
    };
    let to_units = |offset: f64| {
        let scaled = (offset * FINEST_CELLS_PER_DEGREE * 1e6).round() / 1e6;
        scaled.floor().max(0.0) as u64
    };
    let latitude_units = to_units(latitude + MAX_LATITUDE).min(LATITUDE_UNITS - 1);
    let longitude_units = to_units(longitude + 180.0) % LONGITUDE_UNITS;
    (latitude_units, longitude_units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(47.365_562, 8.524_994, Precision::Cell10, "8FVC9G8F6X")]
    #[case(47.365_562, 8.524_994, Precision::Cell8, "8FVC9G8F")]
    #[case(47.365_562, 8.524_994, Precision::Cell2, "8F")]
    #[case(-90.0, -180.0, Precision::Cell4, "2222")]
    #[case(0.0, 0.0, Precision::Cell6, "6FG222")]
    fn encodes_known_points(
        #[case] latitude: f64,
        #[case] longitude: f64,
        #[case] precision: Precision,
        #[case] expected: &str,
    ) {
        let cell = PlusCodeCodec
            .encode(GeoPoint::new(latitude, longitude), precision)
            .expect("valid point");
        assert_eq!(cell.as_str(), expected);
    }

    #[rstest]
    fn north_pole_lands_in_top_row() {
        let cell = PlusCodeCodec
            .encode(GeoPoint::new(90.0, 0.0), Precision::Cell2)
            .expect("pole is valid");
        assert_eq!(cell.as_str(), "CF");
        let area = PlusCodeCodec.decode(&cell);
        assert!((area.north() - 90.0).abs() < 1e-9);
    }

    #[rstest]
    fn antimeridian_wraps_to_west() {
        let east = PlusCodeCodec
            .encode(GeoPoint::new(0.0, 180.0), Precision::Cell4)
            .expect("valid point");
        let west = PlusCodeCodec
            .encode(GeoPoint::new(0.0, -180.0), Precision::Cell4)
            .expect("valid point");
        assert_eq!(east, west);
    }

    #[rstest]
    #[case(90.5, 0.0)]
    #[case(0.0, -180.01)]
    #[case(f64::NAN, 0.0)]
    fn rejects_invalid_coordinates(#[case] latitude: f64, #[case] longitude: f64) {
        let result = PlusCodeCodec.encode(GeoPoint::new(latitude, longitude), Precision::Cell10);
        assert!(matches!(result, Err(GridError::InvalidCoordinate { .. })));
    }

    #[rstest]
    fn decode_returns_cell_box() {
        let area = PlusCodeCodec.decode_str("6FG22222").expect("valid address");
        assert!((area.south() - 0.0).abs() < 1e-12);
        assert!((area.west() - 0.0).abs() < 1e-12);
        assert!((area.height() - 0.0025).abs() < 1e-12);
        assert!((area.width() - 0.0025).abs() < 1e-12);
    }

    #[rstest]
    #[case("6FG2222222", "6FG2222232", "6FG2222223")]
    #[case("6FG22222", "6FG22232", "6FG22223")]
    fn neighbours_share_edges_exactly(
        #[case] cell: &str,
        #[case] north: &str,
        #[case] east: &str,
    ) {
        let area = PlusCodeCodec.decode_str(cell).expect("valid address");
        let above = PlusCodeCodec.decode_str(north).expect("valid address");
        let beside = PlusCodeCodec.decode_str(east).expect("valid address");
        assert_eq!(area.north().to_bits(), above.south().to_bits());
        assert_eq!(area.east().to_bits(), beside.west().to_bits());
    }

    #[rstest]
    fn parent_edges_match_outer_children() {
        let parent = PlusCodeCodec.decode_str("6FG22222").expect("valid address");
        let top_right = PlusCodeCodec.decode_str("6FG22222XX").expect("valid address");
        assert_eq!(parent.north().to_bits(), top_right.north().to_bits());
        assert_eq!(parent.east().to_bits(), top_right.east().to_bits());
    }

    #[rstest]
    fn boundary_point_belongs_to_the_cell_it_starts() {
        let cell = PlusCodeCodec
            .encode(GeoPoint::new(0.0025, 0.0025), Precision::Cell8)
            .expect("valid point");
        let area = PlusCodeCodec.decode(&cell);
        assert!((area.south() - 0.0025).abs() < 1e-12);
        assert!((area.west() - 0.0025).abs() < 1e-12);
    }

    #[rstest]
    #[case("86HWG", "length")]
    #[case("86HWGGGPW6AA", "alphabet")]
    #[case("86HWGGGPW622", "length")]
    #[case("XX", "globe")]
    #[case("8A", "alphabet")]
    fn rejects_malformed_addresses(#[case] input: &str, #[case] reason_fragment: &str) {
        let error = input.parse::<CellAddress>().expect_err("address should fail");
        match error {
            GridError::InvalidAddress { address, reason } => {
                assert_eq!(address, input);
                assert!(reason.contains(reason_fragment), "unexpected reason {reason}");
            }
            other => panic!("expected InvalidAddress, got {other:?}"),
        }
    }

    #[rstest]
    fn children_tile_the_parent() {
        let parent: CellAddress = "6FG22222".parse().expect("valid address");
        let children = parent.children();
        assert_eq!(children.len(), 400);
        let parent_area = PlusCodeCodec.decode(&parent);
        assert!(children.iter().all(|child| {
            child.parent(Precision::Cell8).as_ref() == Some(&parent)
                && parent_area.contains(PlusCodeCodec.decode(child).center())
        }));
    }

    #[rstest]
    fn finest_cells_have_no_children() {
        let cell: CellAddress = "6FG2222222".parse().expect("valid address");
        assert!(cell.children().is_empty());
        assert_eq!(cell.parent(Precision::Cell10), Some(cell.clone()));
    }

    #[rstest]
    #[case("86HWGGGP+W6", true)]
    #[case("86hwgggpw6", true)]
    #[case("86HWGGGPW6CF", true)]
    #[case("CF", true)]
    #[case("22", false)]
    #[case("2345.", false)]
    #[case("86HWG", false)]
    #[case("86HWGGGPW6CFGH", false)]
    #[case("HELLO!", false)]
    #[case("", false)]
    fn well_formed_filter(#[case] candidate: &str, #[case] expected: bool) {
        assert_eq!(is_well_formed(candidate), expected);
    }

    #[rstest]
    #[case(4_u8, Precision::Cell4)]
    #[case(10_u8, Precision::Cell10)]
    fn precision_from_digit_count(#[case] digits: u8, #[case] expected: Precision) {
        assert_eq!(Precision::try_from(digits), Ok(expected));
    }

    #[rstest]
    fn precision_rejects_odd_digit_count() {
        assert_eq!(
            Precision::try_from(7_u8),
            Err(GridError::InvalidPrecision { digits: 7 })
        );
    }
}
