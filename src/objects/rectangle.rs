use crate::material::Material;
use crate::objects::aabb::AABB;
use crate::objects::hit::{HitRecord, Hitable};
use crate::{Ray, Vec3};
use rand::{Rng, RngCore};
use std::sync::Arc;

/// Half-thickness given to the flat axis so BVH slab tests never see a
/// zero-width box.
const BIAS: f64 = 0.0001;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Plane {
    XY,
    XZ,
    YZ,
}

impl Plane {
    /// `(first in-plane axis, second in-plane axis, fixed axis)`
    fn axes(self) -> (usize, usize, usize) {
        match self {
            Plane::XY => (0, 1, 2),
            Plane::XZ => (0, 2, 1),
            Plane::YZ => (1, 2, 0),
        }
    }
}

/// Rectangle lying in `plane` at coordinate `k` on the fixed axis, spanning
/// `ab0..ab1` on the two in-plane axes. Its normal is the positive fixed
/// axis.
pub struct AxisRectangle {
    pub plane: Plane,
    pub ab0: (f64, f64),
    pub ab1: (f64, f64),
    pub k: f64,
    pub material: Arc<dyn Material>,
}

impl AxisRectangle {
    pub fn new(
        plane: Plane,
        ab0: (f64, f64),
        ab1: (f64, f64),
        k: f64,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            plane,
            ab0,
            ab1,
            k,
            material,
        }
    }

    pub fn xy(xy0: (f64, f64), xy1: (f64, f64), z: f64, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::XY, xy0, xy1, z, material)
    }

    pub fn xz(xz0: (f64, f64), xz1: (f64, f64), y: f64, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::XZ, xz0, xz1, y, material)
    }

    pub fn yz(yz0: (f64, f64), yz1: (f64, f64), x: f64, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::YZ, yz0, yz1, x, material)
    }

    pub fn area(&self) -> f64 {
        (self.ab1.0 - self.ab0.0) * (self.ab1.1 - self.ab0.1)
    }

    fn normal(&self) -> Vec3 {
        let (_, _, c) = self.plane.axes();
        let mut n = Vec3::zero();
        n[c] = 1.;
        n
    }
}

impl Hitable for AxisRectangle {
    fn hit(&self, r: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let (ia, ib, ic) = self.plane.axes();
        let (a0, b0) = self.ab0;
        let (a1, b1) = self.ab1;

        let t = (self.k - r.orig[ic]) / r.dir[ic];
        if !(t > t_min && t < t_max) {
            return None;
        }
        let a = r.orig[ia] + t * r.dir[ia];
        let b = r.orig[ib] + t * r.dir[ib];
        if a < a0 || a > a1 || b < b0 || b > b1 {
            return None;
        }
        Some(HitRecord::new(
            t,
            self.normal(),
            r,
            &*self.material,
            ((a - a0) / (a1 - a0), (b - b0) / (b1 - b0)),
        ))
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> AABB {
        let (ia, ib, ic) = self.plane.axes();
        let mut minimum = Vec3::zero();
        let mut maximum = Vec3::zero();
        minimum[ia] = self.ab0.0;
        minimum[ib] = self.ab0.1;
        minimum[ic] = self.k - BIAS;
        maximum[ia] = self.ab1.0;
        maximum[ib] = self.ab1.1;
        maximum[ic] = self.k + BIAS;
        AABB::new(minimum, maximum)
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f64 {
        match self.hit(&Ray::new(origin, direction, 0.), 0.001, f64::INFINITY) {
            Some(rec) => {
                let distance_squared = rec.t * rec.t * direction.squared_length();
                let cosine = (direction * rec.normal).abs() / direction.length();
                distance_squared / (cosine * self.area())
            }
            None => 0.,
        }
    }

    fn random_direction(&self, rng: &mut dyn RngCore, origin: Vec3) -> Vec3 {
        let (ia, ib, ic) = self.plane.axes();
        let mut target = Vec3::zero();
        target[ia] = self.ab0.0 + rng.gen::<f64>() * (self.ab1.0 - self.ab0.0);
        target[ib] = self.ab0.1 + rng.gen::<f64>() * (self.ab1.1 - self.ab0.1);
        target[ic] = self.k;
        target - origin
    }
}
