use crate::{Ray, Vec3};
use std::mem::swap;

/// Axis-aligned box. The empty box uses `(+inf, -inf)` corners so that the
/// first `extend` or `union` collapses it onto real geometry.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AABB {
    pub minimum: Vec3,
    pub maximum: Vec3,
}

impl Default for AABB {
    fn default() -> Self {
        Self::empty()
    }
}

impl AABB {
    pub fn new(minimum: Vec3, maximum: Vec3) -> Self {
        Self { minimum, maximum }
    }

    pub fn empty() -> Self {
        Self::new(Vec3::splat(f64::INFINITY), Vec3::splat(-f64::INFINITY))
    }

    pub fn extend(&mut self, p: Vec3) {
        self.minimum = Vec3::min_by_axis(self.minimum, p);
        self.maximum = Vec3::max_by_axis(self.maximum, p);
    }

    pub fn contains(&self, p: &Vec3) -> bool {
        (0..3).all(|a| p[a] >= self.minimum[a] && p[a] <= self.maximum[a])
    }

    /// `minimum <= maximum` on every axis. Empty boxes and disjoint
    /// intersections are invalid.
    pub fn is_valid(&self) -> bool {
        (0..3).all(|a| self.minimum[a] <= self.maximum[a])
    }

    /// Slab test. Axis-parallel rays divide by zero on purpose: the
    /// resulting infinities order the slab bounds correctly.
    pub fn hit(&self, r: &Ray, t_min: f64, t_max: f64) -> bool {
        let mut min = t_min;
        let mut max = t_max;
        for a in 0..3 {
            let inv_d = 1.0 / r.dir[a];
            let mut t0 = (self.minimum[a] - r.orig[a]) * inv_d;
            let mut t1 = (self.maximum[a] - r.orig[a]) * inv_d;
            if inv_d < 0.0 {
                swap(&mut t0, &mut t1);
            }
            min = min.max(t0);
            max = max.min(t1);
            if min > max {
                return false;
            }
        }
        true
    }

    pub fn union(box0: &AABB, box1: &AABB) -> AABB {
        AABB::new(
            Vec3::min_by_axis(box0.minimum, box1.minimum),
            Vec3::max_by_axis(box0.maximum, box1.maximum),
        )
    }

    /// May return an invalid box when the inputs are disjoint; check
    /// [`AABB::is_valid`].
    pub fn intersection(box0: &AABB, box1: &AABB) -> AABB {
        AABB::new(
            Vec3::max_by_axis(box0.minimum, box1.minimum),
            Vec3::min_by_axis(box0.maximum, box1.maximum),
        )
    }

    pub fn contains_box(&self, other: &AABB) -> bool {
        self.contains(&other.minimum) && self.contains(&other.maximum)
    }

    pub fn translate(&self, offset: Vec3) -> AABB {
        AABB::new(self.minimum + offset, self.maximum + offset)
    }

    /// The eight corners, in `(i, j, k)` bit order.
    pub fn corners(&self) -> [Vec3; 8] {
        let mut corners = [Vec3::zero(); 8];
        for (n, corner) in corners.iter_mut().enumerate() {
            let pick = |bit: usize, a: usize| {
                if n & bit != 0 {
                    self.maximum[a]
                } else {
                    self.minimum[a]
                }
            };
            *corner = Vec3::new(pick(4, 0), pick(2, 1), pick(1, 2));
        }
        corners
    }
}
