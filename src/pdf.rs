//! Direction densities used for importance sampling. All values are
//! per unit solid angle.
use crate::objects::hit::Hitable;
use crate::Vec3;
use rand::{Rng, RngCore};
use std::f64::consts::PI;

/// Orthonormal basis with `w` along a given direction.
#[derive(Copy, Clone, Debug)]
pub struct Onb {
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
}

impl Onb {
    pub fn build_from_w(n: Vec3) -> Self {
        let w = n.unit();
        let a = if w.x.abs() > 0.9 {
            Vec3::new(0., 1., 0.)
        } else {
            Vec3::new(1., 0., 0.)
        };
        let v = Vec3::cross(w, a).unit();
        let u = Vec3::cross(w, v);
        Self { u, v, w }
    }

    pub fn local(&self, a: Vec3) -> Vec3 {
        a.x * self.u + a.y * self.v + a.z * self.w
    }
}

pub trait Pdf {
    fn value(&self, direction: Vec3) -> f64;
    fn generate(&self, rng: &mut dyn RngCore) -> Vec3;
}

/// `cos θ / π` around a surface normal.
pub struct CosinePdf {
    uvw: Onb,
}

impl CosinePdf {
    pub fn new(normal: Vec3) -> Self {
        Self {
            uvw: Onb::build_from_w(normal),
        }
    }
}

impl Pdf for CosinePdf {
    fn value(&self, direction: Vec3) -> f64 {
        let cosine = direction.unit() * self.uvw.w;
        if cosine > 0. {
            cosine / PI
        } else {
            0.
        }
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.uvw.local(Vec3::random_cosine_direction(rng))
    }
}

/// Uniform over the whole sphere of directions.
pub struct SpherePdf;

impl Pdf for SpherePdf {
    fn value(&self, _direction: Vec3) -> f64 {
        1. / (4. * PI)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        Vec3::random_unit_vector(rng)
    }
}

/// Directions from `origin` toward a shape, weighted by the solid angle it
/// subtends.
pub struct HitablePdf<'a> {
    obj: &'a dyn Hitable,
    origin: Vec3,
}

impl<'a> HitablePdf<'a> {
    pub fn new(obj: &'a dyn Hitable, origin: Vec3) -> Self {
        Self { obj, origin }
    }
}

impl Pdf for HitablePdf<'_> {
    fn value(&self, direction: Vec3) -> f64 {
        self.obj.pdf_value(self.origin, direction)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.obj.random_direction(rng, self.origin)
    }
}

/// Even split between two densities.
pub struct MixturePdf<'a> {
    p: [&'a dyn Pdf; 2],
}

impl<'a> MixturePdf<'a> {
    pub fn new(p0: &'a dyn Pdf, p1: &'a dyn Pdf) -> Self {
        Self { p: [p0, p1] }
    }
}

impl Pdf for MixturePdf<'_> {
    fn value(&self, direction: Vec3) -> f64 {
        0.5 * self.p[0].value(direction) + 0.5 * self.p[1].value(direction)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        if rng.gen::<f64>() < 0.5 {
            self.p[0].generate(rng)
        } else {
            self.p[1].generate(rng)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{DiffuseLight, Material};
    use crate::objects::rectangle::AxisRectangle;
    use crate::texture::ConstantTexture;
    use approx::assert_abs_diff_eq;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn test_onb_is_orthonormal() {
        for n in [
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-3.0, 2.0, 0.5),
        ] {
            let b = Onb::build_from_w(n);
            assert_abs_diff_eq!(b.u.length(), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(b.v.length(), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(b.u * b.v, 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(b.u * b.w, 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(b.v * b.w, 0.0, epsilon = 1e-12);
            assert!((b.local(Vec3::new(0.0, 0.0, 1.0)) - n.unit()).length() < 1e-12);
        }
    }

    #[test]
    fn test_cosine_pdf_generates_upper_hemisphere() {
        let mut rng = SmallRng::seed_from_u64(1);
        let normal = Vec3::new(0.3, -1.0, 0.2);
        let pdf = CosinePdf::new(normal);
        for _ in 0..1000 {
            let d = pdf.generate(&mut rng);
            assert!(d * normal >= 0.0);
            assert!(pdf.value(d) >= 0.0);
        }
        assert_eq!(pdf.value(-normal), 0.0);
    }

    #[test]
    fn test_cosine_pdf_integrates_to_one() {
        // importance sampling with a uniform-sphere proposal: E[p(w) / q(w)]
        let mut rng = SmallRng::seed_from_u64(2);
        let pdf = CosinePdf::new(Vec3::new(0.0, 1.0, 0.0));
        let n = 200_000;
        let sum: f64 = (0..n)
            .map(|_| {
                let d = SpherePdf.generate(&mut rng);
                pdf.value(d) / SpherePdf.value(d)
            })
            .sum();
        assert_abs_diff_eq!(sum / n as f64, 1.0, epsilon = 0.02);
    }

    #[test]
    fn test_cosine_pdf_self_normalised() {
        // sampling from the pdf itself: E[1 / p(w)] is the hemisphere's solid angle
        let mut rng = SmallRng::seed_from_u64(3);
        let pdf = CosinePdf::new(Vec3::new(0.0, 0.0, 1.0));
        let n = 200_000;
        let mut sum = 0.0;
        for _ in 0..n {
            let d = pdf.generate(&mut rng);
            let p = pdf.value(d);
            if p > 1e-3 {
                sum += 1.0 / p;
            }
        }
        assert_abs_diff_eq!(sum / n as f64, 2.0 * PI, epsilon = 0.15);
    }

    #[test]
    fn test_mixture_averages() {
        let light_mat: Arc<dyn Material> =
            Arc::new(DiffuseLight::new(ConstantTexture(Vec3::ones())));
        let rect = AxisRectangle::xz((-1.0, -1.0), (1.0, 1.0), 2.0, light_mat);
        let to_light = HitablePdf::new(&rect, Vec3::zero());
        let cosine = CosinePdf::new(Vec3::new(0.0, 1.0, 0.0));
        let mixture = MixturePdf::new(&to_light, &cosine);
        let up = Vec3::new(0.0, 1.0, 0.0);
        assert_abs_diff_eq!(
            mixture.value(up),
            0.5 * to_light.value(up) + 0.5 / PI,
            epsilon = 1e-12
        );

        let mut rng = SmallRng::seed_from_u64(4);
        for _ in 0..200 {
            assert!(mixture.value(mixture.generate(&mut rng)) > 0.0);
        }
    }
}
