//! Size-based feature scoring.
//!
//! The `Scorer` trait turns a [`Feature`](crate::Feature) into a whole
//! number of game points. Implementations live in downstream crates; the
//! trait sits here so stores, resolvers, and scorers share one feature
//! model.

use crate::Feature;

/// Floor applied to every scored feature.
pub const MIN_SCORE: u64 = 1;

/// Calculate a score for a feature.
///
/// Implementations must be thread-safe (`Send` + `Sync`) so scorers can run
/// across threads. The method is infallible: a feature whose size cannot
/// be measured still scores the minimum.
///
/// Implementations must:
/// - Return at least [`MIN_SCORE`] for every non-empty geometry.
/// - Never decrease the score when a polygon grows.
///
/// Use [`Scorer::sanitise`] to apply these guards to a raw measurement.
///
/// # Examples
///
/// ```rust
/// use geo::{Geometry, Point};
/// use cellmark_core::{Feature, MIN_SCORE, Scorer};
///
/// struct UnitScorer;
///
/// impl Scorer for UnitScorer {
///     fn score(&self, _feature: &Feature) -> u64 {
///         MIN_SCORE
///     }
/// }
///
/// let bench = Feature::new(1, Geometry::Point(Point::new(0.0, 0.0)), "bench");
/// assert_eq!(UnitScorer.score(&bench), 1);
/// ```
pub trait Scorer: Send + Sync {
    /// Return the score for `feature`.
    fn score(&self, feature: &Feature) -> u64;

    /// Round a raw measurement to a whole score.
    ///
    /// Returns [`MIN_SCORE`] for non-finite values and never goes
    /// below it.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        reason = "value is rounded and clamped to the u64 range first"
    )]
    fn sanitise(raw: f64) -> u64
    where
        Self: Sized,
    {
        if !raw.is_finite() {
            return MIN_SCORE;
        }
        let rounded = raw.round().clamp(0.0, u64::MAX as f64) as u64;
        rounded.max(MIN_SCORE)
    }
}
