use crate::objects::aabb::AABB;
use crate::objects::hit::{HitRecord, Hitable};
use crate::vec3::degrees_to_radians;
use crate::{Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Reports the wrapped shape's hits with the normal negated.
pub struct FlipNormals {
    obj: Arc<dyn Hitable>,
}

impl FlipNormals {
    pub fn new(obj: Arc<dyn Hitable>) -> Self {
        Self { obj }
    }
}

impl Hitable for FlipNormals {
    fn hit(&self, r: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        self.obj.hit(r, t_min, t_max).map(|mut rec| {
            rec.normal = -rec.normal;
            rec
        })
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> AABB {
        self.obj.bounding_box(time0, time1)
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f64 {
        self.obj.pdf_value(origin, direction)
    }

    fn random_direction(&self, rng: &mut dyn RngCore, origin: Vec3) -> Vec3 {
        self.obj.random_direction(rng, origin)
    }
}

pub struct Translate {
    obj: Arc<dyn Hitable>,
    offset: Vec3,
}

impl Translate {
    pub fn new(obj: Arc<dyn Hitable>, offset: Vec3) -> Self {
        Self { obj, offset }
    }
}

impl Hitable for Translate {
    fn hit(&self, r: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let moved = Ray::new(r.orig - self.offset, r.dir, r.time);
        self.obj.hit(&moved, t_min, t_max).map(|mut rec| {
            rec.p += self.offset;
            rec
        })
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> AABB {
        self.obj.bounding_box(time0, time1).translate(self.offset)
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f64 {
        self.obj.pdf_value(origin - self.offset, direction)
    }

    fn random_direction(&self, rng: &mut dyn RngCore, origin: Vec3) -> Vec3 {
        self.obj.random_direction(rng, origin - self.offset)
    }
}

/// Rotation about the world y axis. The world-space box is fixed at
/// construction from the child's box over the unit shutter interval.
pub struct RotateY {
    obj: Arc<dyn Hitable>,
    sin_theta: f64,
    cos_theta: f64,
    bounding_box: AABB,
}

impl RotateY {
    pub fn new(obj: Arc<dyn Hitable>, degrees: f64) -> Self {
        let radians = degrees_to_radians(degrees);
        let (sin_theta, cos_theta) = radians.sin_cos();

        let mut bounding_box = AABB::empty();
        for corner in obj.bounding_box(0., 1.).corners().iter() {
            bounding_box.extend(Vec3::new(
                cos_theta * corner.x + sin_theta * corner.z,
                corner.y,
                -sin_theta * corner.x + cos_theta * corner.z,
            ));
        }

        Self {
            obj,
            sin_theta,
            cos_theta,
            bounding_box,
        }
    }

    /// World to object space.
    fn to_object(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x - self.sin_theta * v.z,
            v.y,
            self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }

    /// Object to world space.
    fn to_world(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x + self.sin_theta * v.z,
            v.y,
            -self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }
}

impl Hitable for RotateY {
    fn hit(&self, r: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let rotated = Ray::new(self.to_object(r.orig), self.to_object(r.dir), r.time);
        self.obj.hit(&rotated, t_min, t_max).map(|mut rec| {
            rec.p = self.to_world(rec.p);
            rec.normal = self.to_world(rec.normal);
            rec
        })
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> AABB {
        self.bounding_box
    }
}
