//! Facing and distance helpers.
//!
//! Yaw is measured around +Y with yaw `0` looking down -Z, matching the
//! first-person camera convention of the host.
use glam::{Vec2, Vec3};

/// Horizontal unit vector an entity with the given yaw looks along.
///
/// # Examples
/// ```
/// use voxsim::vector_math::forward_from_yaw;
/// let f = forward_from_yaw(0.0);
/// assert!((f.z + 1.0).abs() < 1e-6);
/// ```
#[must_use]
pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}

/// Horizontal unit vector pointing to the entity's right.
#[must_use]
pub fn right_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), 0.0, -yaw.sin())
}

/// Yaw that makes an entity at `from` face `to` horizontally.
///
/// Returns `None` when the points share the same column.
#[must_use]
pub fn yaw_towards(from: Vec3, to: Vec3) -> Option<f32> {
    let dx = to.x - from.x;
    let dz = to.z - from.z;
    if dx.abs() < f32::EPSILON && dz.abs() < f32::EPSILON {
        return None;
    }
    Some((-dx).atan2(-dz))
}

/// Distance between two points ignoring height.
#[must_use]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(b.x - a.x, b.z - a.z).length()
}

/// Whether `target` lies inside a horizontal cone of `fov` radians centred on
/// the yaw's forward direction.
///
/// Targets directly above or below the apex count as inside.
#[must_use]
pub fn within_fov(apex: Vec3, yaw: f32, fov: f32, target: Vec3) -> bool {
    let to_target = Vec2::new(target.x - apex.x, target.z - apex.z);
    let Some(dir) = to_target.try_normalize() else {
        return true;
    };
    let forward = forward_from_yaw(yaw);
    let cos_angle = dir.dot(Vec2::new(forward.x, forward.z)).clamp(-1.0, 1.0);
    cos_angle.acos() <= fov * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[rstest]
    #[case(0.0)]
    #[case(FRAC_PI_2)]
    #[case(-2.3)]
    fn yaw_towards_inverts_forward(#[case] yaw: f32) {
        let target = forward_from_yaw(yaw) * 5.0;
        let recovered = yaw_towards(Vec3::ZERO, target).expect("distinct points");
        let f = forward_from_yaw(recovered);
        assert_relative_eq!(f.x, target.x / 5.0, epsilon = 1e-5);
        assert_relative_eq!(f.z, target.z / 5.0, epsilon = 1e-5);
    }

    #[rstest]
    fn right_is_perpendicular_to_forward() {
        let yaw = 0.7;
        assert_relative_eq!(forward_from_yaw(yaw).dot(right_from_yaw(yaw)), 0.0, epsilon = 1e-6);
    }

    #[rstest]
    #[case(Vec3::new(0.0, 0.0, -4.0), true)]
    #[case(Vec3::new(3.0, 0.0, -3.0), true)]
    #[case(Vec3::new(4.0, 0.0, 0.0), false)]
    #[case(Vec3::new(0.0, 0.0, 4.0), false)]
    #[case(Vec3::new(0.0, 3.0, 0.0), true)]
    fn fov_cone_membership(#[case] target: Vec3, #[case] inside: bool) {
        assert_eq!(within_fov(Vec3::ZERO, 0.0, PI * 2.0 / 3.0, target), inside);
    }

    #[rstest]
    fn horizontal_distance_ignores_height() {
        let d = horizontal_distance(Vec3::ZERO, Vec3::new(3.0, 100.0, 4.0));
        assert_relative_eq!(d, 5.0);
    }
}
