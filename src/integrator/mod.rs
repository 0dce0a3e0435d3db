pub mod path;

use crate::{Ray, Vec3};
use rand::RngCore;

pub use path::PathIntegrator;

/// Radiance estimator for one camera ray.
pub trait Integrator: Send + Sync {
    fn sample_ray(&self, ray: Ray, rng: &mut dyn RngCore) -> Vec3;
}

/// Radiance carried by rays that leave the scene.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Background {
    Solid(Vec3),
    /// White-to-blue gradient over the ray's vertical direction.
    Sky,
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid(Vec3::zero())
    }
}

impl Background {
    pub fn value(&self, r: &Ray) -> Vec3 {
        match *self {
            Background::Solid(color) => color,
            Background::Sky => {
                let t = 0.5 * (r.dir.unit().y + 1.);
                (1. - t) * Vec3::ones() + t * Vec3::new(0.5, 0.7, 1.0)
            }
        }
    }
}
