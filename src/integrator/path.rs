use crate::integrator::Integrator;
use crate::material::Scatter;
use crate::pdf::{HitablePdf, MixturePdf, Pdf};
use crate::scene::Scene;
use crate::{Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Self-intersection offset for secondary rays.
const T_MIN: f64 = 0.001;

/// Unidirectional path tracer. Diffuse bounces sample a 50/50 mixture of
/// the scene's light shapes and the material lobe; specular bounces are
/// followed directly.
pub struct PathIntegrator {
    scene: Arc<Scene>,
    max_depth: usize,
}

impl PathIntegrator {
    pub fn new(scene: Arc<Scene>, max_depth: usize) -> Self {
        Self { scene, max_depth }
    }

    pub fn trace_ray(&self, r: &Ray, rng: &mut dyn RngCore, depth: usize) -> Vec3 {
        let rec = match self.scene.world.hit(r, T_MIN, f64::INFINITY) {
            Some(rec) => rec,
            None => return self.scene.background.value(r),
        };
        let emitted = rec.mat.emitted(r, &rec);
        if depth >= self.max_depth {
            return emitted;
        }

        match rec.mat.scatter(r, &rec, rng) {
            None => emitted,
            Some(Scatter::Specular { ray, attenuation }) => {
                emitted + Vec3::elemul(attenuation, self.trace_ray(&ray, rng, depth + 1))
            }
            Some(Scatter::Diffuse { attenuation, pdf }) => {
                let (direction, pdf_val) = match &self.scene.lights {
                    Some(lights) => {
                        let light_pdf = HitablePdf::new(&**lights, rec.p);
                        let mixture = MixturePdf::new(&light_pdf, &*pdf);
                        let direction = mixture.generate(rng);
                        (direction, mixture.value(direction))
                    }
                    None => {
                        let direction = pdf.generate(rng);
                        (direction, pdf.value(direction))
                    }
                };
                // a zero density would turn the estimate into inf or NaN
                if !(pdf_val > 0. && pdf_val.is_finite()) {
                    return emitted;
                }

                let scattered = Ray::new(rec.p, direction, r.time);
                let scattering_pdf = rec.mat.scattering_pdf(r, &rec, &scattered);
                let incoming = self.trace_ray(&scattered, rng, depth + 1);
                emitted + Vec3::elemul(attenuation, incoming) * (scattering_pdf / pdf_val)
            }
        }
    }
}

impl Integrator for PathIntegrator {
    fn sample_ray(&self, ray: Ray, rng: &mut dyn RngCore) -> Vec3 {
        self.trace_ray(&ray, rng, 0)
    }
}
