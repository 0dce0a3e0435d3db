use crate::material::Material;
use crate::objects::aabb::AABB;
use crate::objects::hit::{HitRecord, Hitable};
use crate::objects::SceneError;
use crate::pdf::Onb;
use crate::{Ray, Vec3};
use rand::RngCore;
use std::f64::consts::PI;
use std::sync::Arc;

/// Spherical coordinates of a point on the unit sphere.
fn sphere_uv(p: Vec3) -> (f64, f64) {
    let phi = p.z.atan2(p.x);
    let theta = p.y.clamp(-1., 1.).asin();
    (1. - (phi + PI) / (2. * PI), (theta + PI / 2.) / PI)
}

fn hit_sphere<'a>(
    center: Vec3,
    radius: f64,
    material: &'a dyn Material,
    r: &Ray,
    t_min: f64,
    t_max: f64,
) -> Option<HitRecord<'a>> {
    let oc = r.orig - center;
    let a = r.dir.squared_length();
    let half_b = oc * r.dir;
    let c = oc.squared_length() - radius * radius;
    let discriminant = half_b * half_b - a * c;
    if discriminant <= 0. {
        return None;
    }
    let sqrt_d = discriminant.sqrt();

    // nearest root inside the open range, else the far one
    let in_range = |root: f64| root > t_min && root < t_max;
    let mut root = (-half_b - sqrt_d) / a;
    if !in_range(root) {
        root = (-half_b + sqrt_d) / a;
        if !in_range(root) {
            return None;
        }
    }

    let outward_normal = (r.at(root) - center) / radius;
    Some(HitRecord::new(
        root,
        outward_normal,
        r,
        material,
        sphere_uv(outward_normal),
    ))
}

fn sphere_box(center: Vec3, radius: f64) -> AABB {
    let extent = Vec3::splat(radius.abs());
    AABB::new(center - extent, center + extent)
}

pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
    pub material: Arc<dyn Material>,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f64, material: Arc<dyn Material>) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }
}

impl Hitable for Sphere {
    fn hit(&self, r: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        hit_sphere(self.center, self.radius, &*self.material, r, t_min, t_max)
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> AABB {
        sphere_box(self.center, self.radius)
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f64 {
        if self
            .hit(&Ray::new(origin, direction, 0.), 0.001, f64::INFINITY)
            .is_none()
        {
            return 0.;
        }
        let distance_squared = (self.center - origin).squared_length();
        let cos_theta_max = (1. - self.radius * self.radius / distance_squared)
            .max(0.)
            .sqrt();
        let solid_angle = 2. * PI * (1. - cos_theta_max);
        1. / solid_angle
    }

    fn random_direction(&self, rng: &mut dyn RngCore, origin: Vec3) -> Vec3 {
        let direction = self.center - origin;
        let uvw = Onb::build_from_w(direction);
        uvw.local(Vec3::random_to_sphere(
            rng,
            self.radius,
            direction.squared_length(),
        ))
    }
}

/// A sphere whose center moves linearly from `center0` at `time0` to
/// `center1` at `time1`.
pub struct MovingSphere {
    center0: Vec3,
    center1: Vec3,
    time0: f64,
    time1: f64,
    radius: f64,
    material: Arc<dyn Material>,
}

impl MovingSphere {
    pub fn new(
        centers: (Vec3, Vec3),
        time_range: (f64, f64),
        radius: f64,
        material: Arc<dyn Material>,
    ) -> Result<Self, SceneError> {
        let (time0, time1) = time_range;
        if !time0.is_finite() || !time1.is_finite() || time0 == time1 {
            return Err(SceneError::DegenerateTimeRange { time0, time1 });
        }
        Ok(Self {
            center0: centers.0,
            center1: centers.1,
            time0,
            time1,
            radius,
            material,
        })
    }

    pub fn center(&self, time: f64) -> Vec3 {
        self.center0
            + ((time - self.time0) / (self.time1 - self.time0)) * (self.center1 - self.center0)
    }
}

impl Hitable for MovingSphere {
    fn hit(&self, r: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        hit_sphere(
            self.center(r.time),
            self.radius,
            &*self.material,
            r,
            t_min,
            t_max,
        )
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> AABB {
        AABB::union(
            &sphere_box(self.center(time0), self.radius),
            &sphere_box(self.center(time1), self.radius),
        )
    }
}
