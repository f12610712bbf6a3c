//! Numeric conversion helpers used across the project.
//!
//! These utilities guard conversions between the continuous world and the
//! integer domains used by grid cells and hit points. Out-of-range inputs are
//! clamped rather than wrapped.

/// Round a world coordinate to the nearest grid index, clamped to `i32`.
///
/// Halves round towards positive infinity, so `0.5` maps to `1` and `-1.5`
/// maps to `-1`.
///
/// # Examples
/// ```
/// use voxsim::numeric::round_to_cell;
/// assert_eq!(round_to_cell(2.4), 2);
/// assert_eq!(round_to_cell(0.5), 1);
/// assert_eq!(round_to_cell(-1.5), -1);
/// assert_eq!(round_to_cell(f32::NAN), 0);
/// ```
#[expect(
    clippy::cast_possible_truncation,
    reason = "The value is clamped to the i32 bounds before casting."
)]
#[must_use]
pub fn round_to_cell(value: f32) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let rounded = (f64::from(value) + 0.5).floor();
    rounded.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Floor a non-negative damage amount into whole hit points.
///
/// Negative and non-finite values yield `0`; values beyond `i32::MAX` clamp.
///
/// # Examples
/// ```
/// use voxsim::numeric::floor_to_damage;
/// assert_eq!(floor_to_damage(12.9), 12);
/// assert_eq!(floor_to_damage(-1.0), 0);
/// ```
#[expect(
    clippy::cast_possible_truncation,
    reason = "The floored value is clamped into the i32 domain."
)]
#[must_use]
pub fn floor_to_damage(value: f32) -> i32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    f64::from(value).floor().min(f64::from(i32::MAX)) as i32
}

/// Convert a grid index back into a world coordinate.
#[expect(
    clippy::cast_precision_loss,
    reason = "Grid indices stay far below 2^24 in practice."
)]
#[must_use]
pub fn cell_to_world(index: i32) -> f32 {
    index as f32
}

/// Convert a tick count or item count into a float for range arithmetic.
#[expect(
    clippy::cast_precision_loss,
    reason = "Tick counts used in range arithmetic are small."
)]
#[must_use]
pub fn count_to_f32(count: u32) -> f32 {
    count as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-0.4, 0)]
    #[case(-1.5, -1)]
    #[case(-2.5, -2)]
    #[case(-2.51, -3)]
    #[case(0.5, 1)]
    #[case(3.49, 3)]
    #[case(f32::INFINITY, 0)]
    #[case(1.0e12, i32::MAX)]
    fn rounds_to_nearest_cell(#[case] input: f32, #[case] expected: i32) {
        assert_eq!(round_to_cell(input), expected);
    }

    #[rstest]
    #[case(0.0, 0)]
    #[case(9.99, 9)]
    #[case(f32::NAN, 0)]
    #[case(1.0e20, i32::MAX)]
    fn floors_damage(#[case] input: f32, #[case] expected: i32) {
        assert_eq!(floor_to_damage(input), expected);
    }
}
