use crate::Vec3;
use log::debug;
use once_cell::sync::OnceCell;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};

const POINT_COUNT: usize = 256;
/// Seed of the lattice used when nobody initialised it explicitly.
const FALLBACK_SEED: u64 = 0x5eed_9e31;

static LATTICE: OnceCell<Perlin> = OnceCell::new();

/// Gradient noise over a 256-entry lattice of random unit vectors.
pub struct Perlin {
    ranvec: Vec<Vec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

fn generate_perm(rng: &mut dyn RngCore) -> Vec<usize> {
    let mut p: Vec<usize> = (0..POINT_COUNT).collect();
    p.shuffle(rng);
    p
}

/// Trilinear blend of the eight corner gradients with Hermite smoothing.
fn perlin_interp(c: &[[[Vec3; 2]; 2]; 2], u: f64, v: f64, w: f64) -> f64 {
    let uu = u * u * (3. - 2. * u);
    let vv = v * v * (3. - 2. * v);
    let ww = w * w * (3. - 2. * w);
    let mut accum = 0.;
    for (i, plane) in c.iter().enumerate() {
        for (j, row) in plane.iter().enumerate() {
            for (k, gradient) in row.iter().enumerate() {
                let (fi, fj, fk) = (i as f64, j as f64, k as f64);
                let weight_v = Vec3::new(u - fi, v - fj, w - fk);
                accum += (fi * uu + (1. - fi) * (1. - uu))
                    * (fj * vv + (1. - fj) * (1. - vv))
                    * (fk * ww + (1. - fk) * (1. - ww))
                    * (*gradient * weight_v);
            }
        }
    }
    accum
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let ranvec = (0..POINT_COUNT)
            .map(|_| Vec3::random_in_range(rng, -1., 1.).unit())
            .collect();
        let perm_x = generate_perm(rng);
        let perm_y = generate_perm(rng);
        let perm_z = generate_perm(rng);
        Self {
            ranvec,
            perm_x,
            perm_y,
            perm_z,
        }
    }

    pub fn noise(&self, p: Vec3) -> f64 {
        let (fx, fy, fz) = (p.x.floor(), p.y.floor(), p.z.floor());
        let (u, v, w) = (p.x - fx, p.y - fy, p.z - fz);
        let (i, j, k) = (fx as i64, fy as i64, fz as i64);

        let mut c = [[[Vec3::zero(); 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, gradient) in row.iter_mut().enumerate() {
                    let idx = self.perm_x[((i + di as i64) & 255) as usize]
                        ^ self.perm_y[((j + dj as i64) & 255) as usize]
                        ^ self.perm_z[((k + dk as i64) & 255) as usize];
                    *gradient = self.ranvec[idx];
                }
            }
        }
        perlin_interp(&c, u, v, w)
    }

    /// Absolute sum of `depth` octaves, each at double the frequency and
    /// half the weight of the previous one.
    pub fn turbulence(&self, p: Vec3, depth: usize) -> f64 {
        let mut accum = 0.;
        let mut temp_p = p;
        let mut weight = 1.;
        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.;
        }
        accum.abs()
    }
}

/// Builds the process-wide lattice from `rng`. Only the first call has an
/// effect; call it before any worker samples a noise texture.
pub fn initialize(rng: &mut dyn RngCore) -> &'static Perlin {
    LATTICE.get_or_init(|| {
        debug!("initialising perlin lattice ({} points)", POINT_COUNT);
        Perlin::new(rng)
    })
}

pub fn lattice() -> &'static Perlin {
    LATTICE.get_or_init(|| {
        debug!("perlin lattice used before initialisation, seeding with fallback");
        Perlin::new(&mut SmallRng::seed_from_u64(FALLBACK_SEED))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_is_deterministic_for_seed() {
        let a = Perlin::new(&mut SmallRng::seed_from_u64(9));
        let b = Perlin::new(&mut SmallRng::seed_from_u64(9));
        let p = Vec3::new(1.3, -7.25, 0.4);
        assert_eq!(a.noise(p), b.noise(p));
        assert_eq!(a.turbulence(p, 7), b.turbulence(p, 7));
    }

    #[test]
    fn test_noise_vanishes_on_lattice_points() {
        let perlin = Perlin::new(&mut SmallRng::seed_from_u64(1));
        for p in [Vec3::zero(), Vec3::new(3.0, -2.0, 17.0), Vec3::new(-300.0, 1.0, 5.0)] {
            assert!(perlin.noise(p).abs() < 1e-12);
        }
    }

    #[test]
    fn test_noise_range() {
        let perlin = Perlin::new(&mut SmallRng::seed_from_u64(2));
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..2000 {
            let p = Vec3::random_in_range(&mut rng, -50.0, 50.0);
            let n = perlin.noise(p);
            assert!(n.is_finite());
            assert!(n.abs() <= 1.5);
            let t = perlin.turbulence(p, 7);
            assert!((0.0..3.0).contains(&t));
        }
    }

    #[test]
    fn test_global_lattice_is_shared() {
        let a = lattice() as *const Perlin;
        let b = initialize(&mut SmallRng::seed_from_u64(4)) as *const Perlin;
        assert_eq!(a, b);
    }
}
