use crate::material::Material;
use crate::objects::aabb::AABB;
use crate::vec3::Vec3;
use crate::Ray;
use rand::{Rng, RngCore};
use std::sync::Arc;

/// A ray/surface intersection. Only meaningful as the `Some` result of
/// [`Hitable::hit`]; the material is borrowed from the scene.
#[derive(Clone)]
pub struct HitRecord<'a> {
    pub t: f64,
    pub p: Vec3,
    /// Unit geometric normal. Not flipped toward the ray; `FlipNormals`
    /// is the only thing that inverts it.
    pub normal: Vec3,
    pub uv: (f64, f64),
    pub mat: &'a dyn Material,
}

impl<'a> HitRecord<'a> {
    pub fn new(t: f64, normal: Vec3, r: &Ray, mat: &'a dyn Material, uv: (f64, f64)) -> Self {
        Self {
            t,
            p: r.at(t),
            normal,
            uv,
            mat,
        }
    }
}

pub trait Hitable: Send + Sync {
    /// Closest intersection with `t` strictly inside `(t_min, t_max)`.
    fn hit(&self, r: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>>;

    /// Box enclosing the shape for every instant in `[time0, time1]`.
    fn bounding_box(&self, time0: f64, time1: f64) -> AABB;

    /// Solid-angle density of `random_direction` from `origin`.
    fn pdf_value(&self, _origin: Vec3, _direction: Vec3) -> f64 {
        0.0
    }

    fn random_direction(&self, _rng: &mut dyn RngCore, _origin: Vec3) -> Vec3 {
        Vec3::new(1., 0., 0.)
    }
}

/// The unordered list: a linear scan that keeps shrinking `t_max` to the
/// closest hit found so far.
impl Hitable for Vec<Arc<dyn Hitable>> {
    fn hit(&self, r: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let mut closest_so_far = t_max;
        let mut res = None;
        for object in self {
            if let Some(temp_rec) = object.hit(r, t_min, closest_so_far) {
                closest_so_far = temp_rec.t;
                res = Some(temp_rec);
            }
        }
        res
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> AABB {
        self.iter().fold(AABB::empty(), |acc, object| {
            AABB::union(&acc, &object.bounding_box(time0, time1))
        })
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let weight = 1.0 / self.len() as f64;
        self.iter()
            .map(|object| weight * object.pdf_value(origin, direction))
            .sum()
    }

    fn random_direction(&self, rng: &mut dyn RngCore, origin: Vec3) -> Vec3 {
        if self.is_empty() {
            return Vec3::new(1., 0., 0.);
        }
        let index = rng.gen_range(0..self.len());
        self[index].random_direction(rng, origin)
    }
}
