use crate::material::{Isotropic, Material};
use crate::objects::aabb::AABB;
use crate::objects::hit::{HitRecord, Hitable};
use crate::objects::SceneError;
use crate::texture::Texture;
use crate::{Ray, Vec3};
use rand::Rng;
use std::sync::Arc;

/// Homogeneous fog filling a closed `boundary`.
pub struct ConstantMedium {
    boundary: Arc<dyn Hitable>,
    phase_function: Arc<dyn Material>,
    neg_inv_density: f64,
}

impl ConstantMedium {
    pub fn new<T: Texture + 'static>(
        boundary: Arc<dyn Hitable>,
        density: f64,
        albedo: T,
    ) -> Result<Self, SceneError> {
        if !(density > 0. && density.is_finite()) {
            return Err(SceneError::InvalidDensity(density));
        }
        Ok(Self {
            boundary,
            phase_function: Arc::new(Isotropic::new(albedo)),
            neg_inv_density: -1. / density,
        })
    }
}

impl Hitable for ConstantMedium {
    fn hit(&self, r: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let enter = self.boundary.hit(r, -f64::INFINITY, f64::INFINITY)?;
        let exit = self.boundary.hit(r, enter.t + 0.0001, f64::INFINITY)?;

        let t_enter = enter.t.max(t_min).max(0.);
        let t_exit = exit.t.min(t_max);
        if t_enter >= t_exit {
            return None;
        }

        // free-flight distances are in world units, t in direction units
        let ray_length = r.dir.length();
        let distance_inside_boundary = (t_exit - t_enter) * ray_length;
        // `hit` carries no generator, so fog sampling uses the thread's own
        let xi: f64 = rand::thread_rng().gen_range(f64::EPSILON..1.0);
        let hit_distance = self.neg_inv_density * xi.ln();
        if hit_distance >= distance_inside_boundary {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;
        if !(t > t_min && t < t_max) {
            return None;
        }
        Some(HitRecord::new(
            t,
            // arbitrary: the isotropic phase function ignores it
            Vec3::new(1., 0., 0.),
            r,
            &*self.phase_function,
            (0., 0.),
        ))
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> AABB {
        self.boundary.bounding_box(time0, time1)
    }
}
