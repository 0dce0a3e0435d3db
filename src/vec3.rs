use rand::{Rng, RngCore};
use std::f64::consts::PI;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign,
};

/// Position, direction and linear RGB color all share this type.
#[derive(Clone, Debug, PartialEq, Copy, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    pub fn ones() -> Self {
        Self::splat(1.0)
    }

    pub fn zero() -> Self {
        Self::splat(0.0)
    }

    pub fn squared_length(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn length(&self) -> f64 {
        self.squared_length().sqrt()
    }

    /// Zero-length input yields NaN components rather than a panic.
    pub fn unit(&self) -> Vec3 {
        self / self.length()
    }

    pub fn dot(lhs: Self, rhs: Self) -> f64 {
        lhs * rhs
    }

    pub fn elemul(lhs: Self, rhs: Self) -> Self {
        Self {
            x: lhs.x * rhs.x,
            y: lhs.y * rhs.y,
            z: lhs.z * rhs.z,
        }
    }

    pub fn cross(lhs: Self, rhs: Self) -> Self {
        Self {
            x: lhs.y * rhs.z - lhs.z * rhs.y,
            y: lhs.z * rhs.x - lhs.x * rhs.z,
            z: lhs.x * rhs.y - lhs.y * rhs.x,
        }
    }

    pub fn min_by_axis(lhs: Self, rhs: Self) -> Self {
        Self::new(lhs.x.min(rhs.x), lhs.y.min(rhs.y), lhs.z.min(rhs.z))
    }

    pub fn max_by_axis(lhs: Self, rhs: Self) -> Self {
        Self::new(lhs.x.max(rhs.x), lhs.y.max(rhs.y), lhs.z.max(rhs.z))
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn reflect(v_in: Self, norm: Self) -> Self {
        v_in - 2. * (v_in * norm) * norm
    }

    /// Snell refraction of `v_in` through a surface with `normal` facing the
    /// incoming side. `None` on total internal reflection.
    pub fn refract(v_in: Self, normal: Self, ni_over_nt: f64) -> Option<Self> {
        let uv = v_in.unit();
        let dt = uv * normal;
        let discriminant = 1.0 - ni_over_nt * ni_over_nt * (1.0 - dt * dt);
        if discriminant <= 0.0 {
            return None;
        }
        Some(ni_over_nt * (uv - normal * dt) - normal * discriminant.sqrt())
    }

    pub fn random(rng: &mut dyn RngCore) -> Vec3 {
        Vec3::new(rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>())
    }

    pub fn random_in_range(rng: &mut dyn RngCore, min: f64, max: f64) -> Vec3 {
        Vec3::new(
            rng.gen_range(min..max),
            rng.gen_range(min..max),
            rng.gen_range(min..max),
        )
    }

    pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
        loop {
            let p = Vec3::random_in_range(rng, -1., 1.);
            if p.squared_length() < 1. {
                return p;
            }
        }
    }

    pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
        loop {
            let p = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 0.);
            if p.squared_length() < 1. {
                return p;
            }
        }
    }

    pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
        Vec3::random_in_unit_sphere(rng).unit()
    }

    /// Cosine-weighted direction around +z.
    pub fn random_cosine_direction(rng: &mut dyn RngCore) -> Vec3 {
        let r1 = rng.gen::<f64>();
        let r2 = rng.gen::<f64>();
        let phi = 2. * PI * r1;
        let sqrt_r2 = r2.sqrt();
        Vec3::new(
            phi.cos() * sqrt_r2,
            phi.sin() * sqrt_r2,
            (1. - r2).sqrt(),
        )
    }

    /// Uniform direction around +z inside the cone subtended by a sphere of
    /// `radius` seen from `distance_squared` away.
    pub fn random_to_sphere(rng: &mut dyn RngCore, radius: f64, distance_squared: f64) -> Vec3 {
        let r1 = rng.gen::<f64>();
        let r2 = rng.gen::<f64>();
        let cos_theta_max = (1. - radius * radius / distance_squared).max(0.).sqrt();
        let z = 1. + r2 * (cos_theta_max - 1.);
        let phi = 2. * PI * r1;
        let sin_theta = (1. - z * z).max(0.).sqrt();
        Vec3::new(phi.cos() * sin_theta, phi.sin() * sin_theta, z)
    }
}

impl Index<usize> for Vec3 {
    type Output = f64;

    fn index(&self, axis: usize) -> &f64 {
        match axis {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vec3 axis out of range: {}", axis),
        }
    }
}

impl IndexMut<usize> for Vec3 {
    fn index_mut(&mut self, axis: usize) -> &mut f64 {
        match axis {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Vec3 axis out of range: {}", axis),
        }
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

/// `*` between two vectors is the dot product; use [`Vec3::elemul`] for
/// per-channel color products.
impl Mul for Vec3 {
    type Output = f64;

    fn mul(self, other: Self) -> Self::Output {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;

    fn mul(self, other: Vec3) -> Self::Output {
        other * self
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, other: f64) -> Self::Output {
        Self::new(self.x * other, self.y * other, self.z * other)
    }
}

impl MulAssign<f64> for Vec3 {
    fn mul_assign(&mut self, other: f64) {
        *self = *self * other;
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;

    fn div(self, other: f64) -> Self::Output {
        Self::new(self.x / other, self.y / other, self.z / other)
    }
}

impl Div<f64> for &Vec3 {
    type Output = Vec3;

    fn div(self, other: f64) -> Self::Output {
        *self / other
    }
}

impl DivAssign<f64> for Vec3 {
    fn div_assign(&mut self, other: f64) {
        *self = *self / other;
    }
}

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}
