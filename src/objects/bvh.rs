use crate::objects::aabb::AABB;
use crate::objects::hit::{HitRecord, Hitable};
use crate::objects::SceneError;
use crate::Ray;
use log::debug;
use rand::{Rng, RngCore};
use std::cmp::Ordering;
use std::sync::Arc;

/// Binary bounding volume hierarchy. Leaves are the scene's own shapes;
/// a single-shape node points both children at it.
pub struct BVHNode {
    pub left: Arc<dyn Hitable>,
    pub right: Arc<dyn Hitable>,
    pub bounding_box: AABB,
}

fn box_compare(a: &AABB, b: &AABB, axis: usize) -> Ordering {
    a.minimum[axis].total_cmp(&b.minimum[axis])
}

impl BVHNode {
    pub fn construct(
        left: Arc<dyn Hitable>,
        right: Arc<dyn Hitable>,
        time0: f64,
        time1: f64,
    ) -> Self {
        let bounding_box = AABB::union(
            &left.bounding_box(time0, time1),
            &right.bounding_box(time0, time1),
        );
        Self {
            left,
            right,
            bounding_box,
        }
    }

    /// Builds the tree over `objects`, which must not be empty. Boxes cover
    /// the whole `[time0, time1]` shutter.
    pub fn new(
        objects: Vec<Arc<dyn Hitable>>,
        time0: f64,
        time1: f64,
        rng: &mut dyn RngCore,
    ) -> Result<Self, SceneError> {
        if objects.is_empty() {
            return Err(SceneError::EmptyBvh);
        }
        let count = objects.len();
        let (node, depth) = Self::build(objects, time0, time1, rng);
        debug!(
            "built BVH over {} shapes, depth {}, bounds {:?}..{:?}",
            count, depth, node.bounding_box.minimum, node.bounding_box.maximum
        );
        Ok(node)
    }

    fn build(
        mut objects: Vec<Arc<dyn Hitable>>,
        time0: f64,
        time1: f64,
        rng: &mut dyn RngCore,
    ) -> (Self, usize) {
        let axis = rng.gen_range(0..3);
        match objects.len() {
            1 => {
                let only = Arc::clone(&objects[0]);
                (Self::construct(Arc::clone(&only), only, time0, time1), 1)
            }
            2 => {
                let box0 = objects[0].bounding_box(time0, time1);
                let box1 = objects[1].bounding_box(time0, time1);
                let (first, second) = if box_compare(&box0, &box1, axis).is_le() {
                    (0, 1)
                } else {
                    (1, 0)
                };
                let node = Self::construct(
                    Arc::clone(&objects[first]),
                    Arc::clone(&objects[second]),
                    time0,
                    time1,
                );
                (node, 1)
            }
            n => {
                let mut keyed: Vec<(AABB, Arc<dyn Hitable>)> = objects
                    .drain(..)
                    .map(|object| (object.bounding_box(time0, time1), object))
                    .collect();
                keyed.sort_by(|a, b| box_compare(&a.0, &b.0, axis));
                let upper: Vec<Arc<dyn Hitable>> =
                    keyed.split_off(n / 2).into_iter().map(|(_, o)| o).collect();
                let lower: Vec<Arc<dyn Hitable>> = keyed.into_iter().map(|(_, o)| o).collect();

                let (left, left_depth) = Self::build(lower, time0, time1, rng);
                let (right, right_depth) = Self::build(upper, time0, time1, rng);
                let node = Self::construct(Arc::new(left), Arc::new(right), time0, time1);
                (node, 1 + left_depth.max(right_depth))
            }
        }
    }
}

impl Hitable for BVHNode {
    fn hit(&self, r: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        if !self.bounding_box.hit(r, t_min, t_max) {
            return None;
        }
        // child boxes may overlap, so both sides are searched in full
        let hit_left = self.left.hit(r, t_min, t_max);
        let hit_right = self.right.hit(r, t_min, t_max);
        match (hit_left, hit_right) {
            (Some(l), Some(r)) => Some(if r.t < l.t { r } else { l }),
            (l, None) => l,
            (None, r) => r,
        }
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> AABB {
        self.bounding_box
    }
}
