use crate::objects::hit::HitRecord;
use crate::pdf::{CosinePdf, Pdf, SpherePdf};
use crate::texture::Texture;
use crate::{Ray, Vec3};
use rand::{Rng, RngCore};
use std::f64::consts::{FRAC_1_PI, PI};

/// Outcome of a surface interaction that keeps the path alive.
pub enum Scatter {
    /// A single deterministic-density direction (mirror, glass). No pdf is
    /// attached; the integrator follows `ray` directly.
    Specular { ray: Ray, attenuation: Vec3 },
    /// A lobe the integrator samples through `pdf`, possibly mixed with
    /// light sampling.
    Diffuse {
        attenuation: Vec3,
        pdf: Box<dyn Pdf>,
    },
}

pub trait Material: Send + Sync {
    /// `None` absorbs the path.
    fn scatter(&self, r: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Scatter>;

    /// Density of the material's own lobe for `scattered`, cosine included.
    fn scattering_pdf(&self, _r: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f64 {
        0.
    }

    fn emitted(&self, _r: &Ray, _rec: &HitRecord) -> Vec3 {
        Vec3::zero()
    }
}

/// `Lambertian` takes a generic parameter `T` so the texture call is
/// static; use `Arc<dyn Texture>` to share one.
#[derive(Clone)]
pub struct Lambertian<T: Texture> {
    pub albedo: T,
}

impl<T: Texture> Lambertian<T> {
    pub fn new(albedo: T) -> Self {
        Self { albedo }
    }
}

impl<T: Texture> Material for Lambertian<T> {
    fn scatter(&self, _r: &Ray, rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<Scatter> {
        Some(Scatter::Diffuse {
            attenuation: self.albedo.value(rec.uv.0, rec.uv.1, rec.p),
            pdf: Box::new(CosinePdf::new(rec.normal)),
        })
    }

    fn scattering_pdf(&self, _r: &Ray, rec: &HitRecord, scattered: &Ray) -> f64 {
        let cosine = rec.normal * scattered.dir.unit();
        cosine.max(0.) * FRAC_1_PI
    }
}

pub struct Metal<T: Texture> {
    pub albedo: T,
    pub fuzz: f64,
}

impl<T: Texture> Metal<T> {
    pub fn new(albedo: T, fuzz: f64) -> Self {
        Self {
            albedo,
            fuzz: fuzz.min(1.),
        }
    }
}

impl<T: Texture> Material for Metal<T> {
    fn scatter(&self, r: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Scatter> {
        let reflected = Vec3::reflect(r.dir.unit(), rec.normal);
        let direction = reflected + self.fuzz * Vec3::random_in_unit_sphere(rng);
        if direction * rec.normal <= 0. {
            return None;
        }
        Some(Scatter::Specular {
            ray: Ray::new(rec.p, direction, r.time),
            attenuation: self.albedo.value(rec.uv.0, rec.uv.1, rec.p),
        })
    }
}

/// Clear glass with refractive index `ir`.
#[derive(Copy, Clone, Debug)]
pub struct Dielectric {
    pub ir: f64,
}

impl Dielectric {
    pub fn new(ir: f64) -> Self {
        Self { ir }
    }

    pub fn reflectance(cosine: f64, ref_idx: f64) -> f64 {
        // Use Schlick's approximation for reflectance
        let r0 = ((1. - ref_idx) / (1. + ref_idx)).powi(2);
        r0 + (1. - r0) * (1. - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(&self, r: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Scatter> {
        let unit_direction = r.dir.unit();
        let d = unit_direction * rec.normal;
        // normals are geometric, so a positive dot means we are leaving the solid
        let (outward_normal, ni_over_nt, cosine) = if d > 0. {
            let cosine = (1. - self.ir * self.ir * (1. - d * d)).max(0.).sqrt();
            (-rec.normal, self.ir, cosine)
        } else {
            (rec.normal, 1. / self.ir, -d)
        };

        let reflected = Vec3::reflect(unit_direction, rec.normal);
        let direction = match Vec3::refract(unit_direction, outward_normal, ni_over_nt) {
            Some(refracted) if rng.gen::<f64>() >= Self::reflectance(cosine, self.ir) => refracted,
            _ => reflected,
        };
        Some(Scatter::Specular {
            ray: Ray::new(rec.p, direction, r.time),
            attenuation: Vec3::ones(),
        })
    }
}

/// Emitter only. Radiates from both faces.
pub struct DiffuseLight<T: Texture> {
    pub emit: T,
}

impl<T: Texture> DiffuseLight<T> {
    pub fn new(emit: T) -> Self {
        Self { emit }
    }
}

impl<T: Texture> Material for DiffuseLight<T> {
    fn scatter(&self, _r: &Ray, _rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<Scatter> {
        None
    }

    fn emitted(&self, _r: &Ray, rec: &HitRecord) -> Vec3 {
        self.emit.value(rec.uv.0, rec.uv.1, rec.p)
    }
}

/// Phase function of participating media: every direction equally likely.
pub struct Isotropic<T: Texture> {
    pub albedo: T,
}

impl<T: Texture> Isotropic<T> {
    pub fn new(albedo: T) -> Self {
        Self { albedo }
    }
}

impl<T: Texture> Material for Isotropic<T> {
    fn scatter(&self, _r: &Ray, rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<Scatter> {
        Some(Scatter::Diffuse {
            attenuation: self.albedo.value(rec.uv.0, rec.uv.1, rec.p),
            pdf: Box::new(SpherePdf),
        })
    }

    fn scattering_pdf(&self, _r: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f64 {
        1. / (4. * PI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::ConstantTexture;
    use approx::assert_abs_diff_eq;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn record<'a>(mat: &'a dyn Material, r: &Ray, t: f64, normal: Vec3) -> HitRecord<'a> {
        HitRecord::new(t, normal, r, mat, (0.5, 0.5))
    }

    #[test]
    fn test_lambertian_scatters_into_hemisphere() {
        let mat = Lambertian::new(ConstantTexture(Vec3::new(0.2, 0.4, 0.6)));
        let r = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 0.0);
        let rec = record(&mat, &r, 1.0, Vec3::new(0.0, 1.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(0);
        match mat.scatter(&r, &rec, &mut rng) {
            Some(Scatter::Diffuse { attenuation, pdf }) => {
                assert_eq!(attenuation, Vec3::new(0.2, 0.4, 0.6));
                for _ in 0..100 {
                    let d = pdf.generate(&mut rng);
                    assert!(d.y >= 0.0);
                    let scattered = Ray::new(rec.p, d, 0.0);
                    assert_abs_diff_eq!(
                        mat.scattering_pdf(&r, &rec, &scattered),
                        pdf.value(d),
                        epsilon = 1e-12
                    );
                }
            }
            _ => panic!("lambertian must scatter diffusely"),
        }
        let below = Ray::new(rec.p, Vec3::new(0.0, -1.0, 0.0), 0.0);
        assert_eq!(mat.scattering_pdf(&r, &rec, &below), 0.0);
    }

    #[test]
    fn test_mirror_reflects() {
        let mat = Metal::new(ConstantTexture(Vec3::ones()), 0.0);
        let r = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), 0.5);
        let rec = record(&mat, &r, 1.0, Vec3::new(0.0, 1.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(0);
        match mat.scatter(&r, &rec, &mut rng) {
            Some(Scatter::Specular { ray, .. }) => {
                let expected = Vec3::new(1.0, 1.0, 0.0).unit();
                assert!((ray.dir - expected).length() < 1e-12);
                assert_eq!(ray.time, 0.5);
            }
            _ => panic!("mirror must scatter specularly"),
        }
    }

    #[test]
    fn test_fuzz_is_clamped_and_grazing_rays_absorb() {
        let mat = Metal::new(ConstantTexture(Vec3::ones()), 5.0);
        assert_eq!(mat.fuzz, 1.0);
        let r = Ray::new(Vec3::zero(), Vec3::new(1.0, -1e-4, 0.0), 0.0);
        let rec = record(&mat, &r, 1.0, Vec3::new(0.0, 1.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(8);
        let mut absorbed = 0;
        for _ in 0..200 {
            match mat.scatter(&r, &rec, &mut rng) {
                Some(Scatter::Specular { ray, .. }) => assert!(ray.dir * rec.normal > 0.0),
                Some(Scatter::Diffuse { .. }) => panic!("metal is specular"),
                None => absorbed += 1,
            }
        }
        assert!(absorbed > 0);
    }

    #[test]
    fn test_glass_total_internal_reflection() {
        let mat = Dielectric::new(1.5);
        // leaving the glass at a grazing angle: normal is (0,1,0), ray goes up
        let r = Ray::new(Vec3::zero(), Vec3::new(1.0, 0.2, 0.0), 0.0);
        let rec = record(&mat, &r, 1.0, Vec3::new(0.0, 1.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..50 {
            match mat.scatter(&r, &rec, &mut rng) {
                Some(Scatter::Specular { ray, attenuation }) => {
                    assert_eq!(attenuation, Vec3::ones());
                    assert!(ray.dir.y < 0.0);
                }
                _ => panic!("glass is always specular"),
            }
        }
    }

    #[test]
    fn test_glass_head_on_mostly_transmits() {
        let mat = Dielectric::new(1.5);
        let r = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 0.0);
        let rec = record(&mat, &r, 1.0, Vec3::new(0.0, 1.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(2);
        let transmitted = (0..1000)
            .filter(|_| match mat.scatter(&r, &rec, &mut rng) {
                Some(Scatter::Specular { ray, .. }) => ray.dir.y < 0.0,
                _ => false,
            })
            .count();
        // Schlick gives 4% reflection at normal incidence
        assert!(transmitted > 900 && transmitted < 1000);
    }

    #[test]
    fn test_light_emits_and_absorbs() {
        let mat = DiffuseLight::new(ConstantTexture(Vec3::splat(15.0)));
        let r = Ray::new(Vec3::zero(), Vec3::new(0.0, 1.0, 0.0), 0.0);
        // same radiance from behind the face
        let rec = record(&mat, &r, 1.0, Vec3::new(0.0, 1.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(mat.scatter(&r, &rec, &mut rng).is_none());
        assert_eq!(mat.emitted(&r, &rec), Vec3::splat(15.0));
        assert_eq!(Lambertian::new(ConstantTexture(Vec3::ones())).emitted(&r, &rec), Vec3::zero());
    }

    #[test]
    fn test_isotropic_density() {
        let mat = Isotropic::new(ConstantTexture(Vec3::splat(0.5)));
        let r = Ray::new(Vec3::zero(), Vec3::new(0.0, 1.0, 0.0), 0.0);
        let rec = record(&mat, &r, 1.0, Vec3::new(1.0, 0.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(0);
        match mat.scatter(&r, &rec, &mut rng) {
            Some(Scatter::Diffuse { pdf, .. }) => {
                let d = pdf.generate(&mut rng);
                assert_abs_diff_eq!(d.length(), 1.0, epsilon = 1e-9);
                let scattered = Ray::new(rec.p, d, 0.0);
                assert_abs_diff_eq!(
                    mat.scattering_pdf(&r, &rec, &scattered),
                    pdf.value(d),
                    epsilon = 1e-12
                );
            }
            _ => panic!("isotropic must scatter diffusely"),
        }
    }
}
