//! Axis-aligned boxes and ray tests shared by collision and sight checks.

use glam::Vec3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Creates a box from its corners.
    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of an entity whose feet rest at `feet`.
    ///
    /// # Examples
    /// ```
    /// use glam::Vec3;
    /// use voxsim::geometry::Aabb;
    /// let b = Aabb::entity(Vec3::new(1.0, 0.5, 1.0), 0.3, 1.8);
    /// assert_eq!(b.min.y, 0.5);
    /// assert!((b.max.y - 2.3).abs() < 1e-6);
    /// ```
    #[must_use]
    pub fn entity(feet: Vec3, radius: f32, height: f32) -> Self {
        Self {
            min: Vec3::new(feet.x - radius, feet.y, feet.z - radius),
            max: Vec3::new(feet.x + radius, feet.y + height, feet.z + radius),
        }
    }

    /// Cube centred on `centre` with the given half extent.
    #[must_use]
    pub fn cube(centre: Vec3, half: f32) -> Self {
        Self {
            min: centre - Vec3::splat(half),
            max: centre + Vec3::splat(half),
        }
    }

    /// Open-interval overlap on all three axes.
    ///
    /// Boxes that merely touch along a face do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.max.x > other.min.x
            && self.min.x < other.max.x
            && self.max.y > other.min.y
            && self.min.y < other.max.y
            && self.max.z > other.min.z
            && self.min.z < other.max.z
    }

    /// Smallest box containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Box grown by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }

    /// Parameter along `dir` at which a ray from `origin` enters the box.
    ///
    /// Only hits with `0 <= t < max_t` are reported; a ray starting inside the
    /// box hits at `t = 0`. `dir` need not be normalised, `t` is measured in
    /// multiples of it.
    #[must_use]
    pub fn ray_entry(&self, origin: Vec3, dir: Vec3, max_t: f32) -> Option<f32> {
        let mut t_enter = 0.0_f32;
        let mut t_exit = max_t;
        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < f32::EPSILON {
                if o <= lo || o >= hi {
                    return None;
                }
                continue;
            }
            let inv = d.recip();
            let (mut t0, mut t1) = ((lo - o) * inv, (hi - o) * inv);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }
        (t_enter < max_t).then_some(t_enter)
    }
}
