//! IELTS band-score arithmetic.
//!
//! Band scores live on a closed grid: 1.0 to 9.0 in half-point steps.
//! The evaluator is instructed to stay on that grid but is not trusted to,
//! so everything it returns passes through `snap_to_band` before it reaches
//! a domain value. Zero is reserved for the locally produced empty-response
//! evaluation and never comes back from the evaluator.

/// Lowest band the evaluator may assign.
pub const MIN_BAND: f32 = 1.0;
/// Highest band the evaluator may assign.
pub const MAX_BAND: f32 = 9.0;

/// Snap an arbitrary score onto the nearest half-band within [1.0, 9.0].
/// 6.7 becomes 6.5, 6.8 becomes 7.0, 0.3 becomes 1.0, 12.0 becomes 9.0.
pub fn snap_to_band(score: f32) -> f32 {
  let snapped = (score * 2.0).round() / 2.0;
  snapped.clamp(MIN_BAND, MAX_BAND)
}

/// True if the score already sits exactly on the valid grid.
#[allow(dead_code)]
pub fn is_valid_band(score: f32) -> bool {
  (MIN_BAND..=MAX_BAND).contains(&score) && (score * 2.0).fract() == 0.0
}

/// Round to one decimal place. Used for the whole-test overall score,
/// which is a mean of two band scores and may land on a quarter point.
pub fn round1(x: f32) -> f32 {
  (x * 10.0).round() / 10.0
}

/// Whole-test overall: mean of the two per-task overalls, one decimal.
pub fn test_overall(task1_score: f32, task2_score: f32) -> f32 {
  round1((task1_score + task2_score) / 2.0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn snap_lands_on_half_bands() {
    assert_eq!(snap_to_band(6.7), 6.5);
    assert_eq!(snap_to_band(6.8), 7.0);
    assert_eq!(snap_to_band(5.25), 5.5);
    assert_eq!(snap_to_band(5.0), 5.0);
    assert!(is_valid_band(snap_to_band(3.1415)));
  }

  #[test]
  fn snap_clamps_to_grid_bounds() {
    assert_eq!(snap_to_band(0.0), 1.0);
    assert_eq!(snap_to_band(0.3), 1.0);
    assert_eq!(snap_to_band(9.5), 9.0);
    assert_eq!(snap_to_band(42.0), 9.0);
  }

  #[test]
  fn valid_band_rejects_off_grid_values() {
    assert!(is_valid_band(1.0));
    assert!(is_valid_band(6.5));
    assert!(is_valid_band(9.0));
    assert!(!is_valid_band(0.0));
    assert!(!is_valid_band(6.7));
    assert!(!is_valid_band(9.5));
  }

  #[test]
  fn test_overall_is_mean_rounded_to_one_decimal() {
    assert_eq!(test_overall(6.5, 5.0), 5.8);
    assert_eq!(test_overall(4.0, 4.0), 4.0);
    assert_eq!(test_overall(7.5, 6.0), 6.8);
    assert_eq!(test_overall(0.0, 0.0), 0.0);
  }
}
