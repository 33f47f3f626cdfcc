//! Fixed affine mappings between the raw feature/label ranges and the
//! network's working range.
//!
//! The feature transforms are forward-only; the score transform is an
//! exact inverse pair (`normalize_score` / `denormalize_score`) inside
//! the score domain.

use super::data::FEATURE_COUNT;
use super::matrix::SizeMismatch;
use super::net::InvalidDimensionError;

/// Upper bound of the study-hours range.
pub const STUDY_HOURS_MAX: f64 = 12.0;

/// Upper bound of the sleep-hours range.
pub const SLEEP_HOURS_MAX: f64 = 9.0;

/// Upper bound of the attendance range (percent).
pub const ATTENDANCE_MAX: f64 = 100.0;

/// Score range shared by the score label and the previous-score feature.
pub const SCORE_MIN: f64 = 1.0;
pub const SCORE_MAX: f64 = 5.0;

/// Maps four raw features
/// `[study_hours, sleep_hours, attendance, previous_score]` into the
/// network's working range.
///
/// # Returns
/// * `Ok([f64; 4])` with each feature scaled by its domain range;
/// * `Err(InvalidDimensionError)` if `raw` is not exactly four values.
///
/// # Examples
/// ```
/// # use mtnnet::multitask::normalize_features;
/// let normalized = normalize_features(&[7.0, 8.0, 95.0, 4.5]).unwrap();
/// assert!((normalized[2] - 0.95).abs() < 1e-9);
/// ```
pub fn normalize_features(raw: &[f64]) -> Result<[f64; FEATURE_COUNT], InvalidDimensionError> {
    if raw.len() != FEATURE_COUNT {
        return Err(InvalidDimensionError::BadInputs(SizeMismatch {
            expected: FEATURE_COUNT,
            got: raw.len(),
        }));
    }

    Ok([
        raw[0] / STUDY_HOURS_MAX,
        raw[1] / SLEEP_HOURS_MAX,
        raw[2] / ATTENDANCE_MAX,
        normalize_score(raw[3]),
    ])
}

/// Maps a raw score from [1.0, 5.0] onto [0, 1].
pub fn normalize_score(score: f64) -> f64 {
    (score - SCORE_MIN) / (SCORE_MAX - SCORE_MIN)
}

/// Inverse of `normalize_score`: maps a unit-range value back onto the
/// score range, clamping saturated outputs to the bounds.
pub fn denormalize_score(unit: f64) -> f64 {
    let score = unit * (SCORE_MAX - SCORE_MIN) + SCORE_MIN;
    score.max(SCORE_MIN).min(SCORE_MAX)
}
