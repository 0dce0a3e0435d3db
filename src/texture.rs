use crate::perlin;
use crate::Vec3;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("image texture must have non-zero size, got {width}x{height}")]
    ZeroSize { width: usize, height: usize },

    #[error("expected {expected} bytes of packed RGB, got {actual}")]
    BufferLength { expected: usize, actual: usize },

    #[error("failed to load texture image")]
    Image(#[from] image::ImageError),
}

pub trait Texture: Send + Sync {
    fn value(&self, u: f64, v: f64, p: Vec3) -> Vec3;
}

impl<T: Texture + ?Sized> Texture for Arc<T> {
    fn value(&self, u: f64, v: f64, p: Vec3) -> Vec3 {
        (**self).value(u, v, p)
    }
}

#[derive(Copy, Clone, Debug)]
pub struct ConstantTexture(pub Vec3);

impl Texture for ConstantTexture {
    fn value(&self, _u: f64, _v: f64, _p: Vec3) -> Vec3 {
        self.0
    }
}

/// Solid 3D checkerboard: picks `odd` where the product of sines of the
/// scaled world coordinates is negative. UVs play no part.
pub struct CheckerTexture<A: Texture, B: Texture> {
    pub odd: A,
    pub even: B,
}

impl<A: Texture, B: Texture> CheckerTexture<A, B> {
    pub fn new(odd: A, even: B) -> Self {
        Self { odd, even }
    }
}

impl<A: Texture, B: Texture> Texture for CheckerTexture<A, B> {
    fn value(&self, u: f64, v: f64, p: Vec3) -> Vec3 {
        let sines = f64::sin(10. * p.x) * f64::sin(10. * p.y) * f64::sin(10. * p.z);
        if sines < 0. {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// Marble-like gray bands perturbed by turbulence.
#[derive(Copy, Clone, Debug)]
pub struct NoiseTexture {
    pub scale: f64,
}

impl NoiseTexture {
    pub const TURBULENCE_DEPTH: usize = 7;

    pub fn new(scale: f64) -> Self {
        Self { scale }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f64, _v: f64, p: Vec3) -> Vec3 {
        let turb = perlin::lattice().turbulence(self.scale * p, Self::TURBULENCE_DEPTH);
        Vec3::ones() * 0.5 * (1. + f64::sin(self.scale * p.x + 5. * turb))
    }
}

/// Nearest-neighbour lookup into packed RGB8 rows, top row first.
pub struct ImageTexture {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
}

impl ImageTexture {
    pub fn new(pixels: Vec<u8>, width: usize, height: usize) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroSize { width, height });
        }
        let expected = 3 * width * height;
        if pixels.len() != expected {
            return Err(TextureError::BufferLength {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    pub fn from_rgb_image(image: image::RgbImage) -> Result<Self, TextureError> {
        let (width, height) = (image.width() as usize, image.height() as usize);
        Self::new(image.into_raw(), width, height)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        Self::from_rgb_image(image::open(path)?.to_rgb8())
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f64, v: f64, _p: Vec3) -> Vec3 {
        let (u, v) = (u.clamp(0., 1.), 1. - v.clamp(0., 1.));
        let x = ((u * self.width as f64) as usize).min(self.width - 1);
        let y = ((v * self.height as f64) as usize).min(self.height - 1);
        let idx = 3 * (x + self.width * y);
        Vec3::new(
            self.pixels[idx] as f64,
            self.pixels[idx + 1] as f64,
            self.pixels[idx + 2] as f64,
        ) / 255.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_checker_uses_world_position() {
        let checker = CheckerTexture::new(
            ConstantTexture(Vec3::zero()),
            ConstantTexture(Vec3::ones()),
        );
        let p = Vec3::new(0.1, 0.1, 0.1);
        assert_eq!(checker.value(0.0, 0.0, p), Vec3::ones());
        assert_eq!(checker.value(0.9, 0.9, p), Vec3::ones());
        assert_eq!(checker.value(0.0, 0.0, Vec3::new(-0.1, 0.1, 0.1)), Vec3::zero());
    }

    #[test]
    fn test_image_lookup_flips_v() {
        // 2x2: red, green on the top row; blue, white on the bottom row
        let pixels = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let tex = ImageTexture::new(pixels, 2, 2).unwrap();
        assert_eq!(tex.value(0.0, 1.0, Vec3::zero()), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value(1.0, 1.0, Vec3::zero()), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(tex.value(0.0, 0.0, Vec3::zero()), Vec3::new(0.0, 0.0, 1.0));
        // out-of-range uv is clamped
        assert_eq!(tex.value(7.0, -3.0, Vec3::zero()), Vec3::ones());
    }

    #[test]
    fn test_image_rejects_bad_buffers() {
        assert!(matches!(
            ImageTexture::new(Vec::new(), 0, 4),
            Err(TextureError::ZeroSize { .. })
        ));
        assert!(matches!(
            ImageTexture::new(vec![0; 11], 2, 2),
            Err(TextureError::BufferLength {
                expected: 12,
                actual: 11
            })
        ));
    }

    #[test]
    fn test_from_rgb_image() {
        let img = image::RgbImage::from_pixel(3, 1, image::Rgb([51, 102, 204]));
        let tex = ImageTexture::from_rgb_image(img).unwrap();
        let c = tex.value(0.5, 0.5, Vec3::zero());
        assert_abs_diff_eq!(c.x, 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(c.y, 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(c.z, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_noise_is_gray_and_bounded() {
        let tex = NoiseTexture::new(4.0);
        for i in 0..100 {
            let p = Vec3::new(i as f64 * 0.37, -(i as f64) * 0.11, 2.0);
            let c = tex.value(0.0, 0.0, p);
            assert_eq!(c.x, c.y);
            assert_eq!(c.y, c.z);
            assert!((0.0..=1.0).contains(&c.x));
        }
    }
}
