use crate::renderer::RenderedImage;
use image::{ImageBuffer, Rgb, RgbImage};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write image")]
    Io(#[from] io::Error),

    #[error("failed to encode image")]
    Image(#[from] image::ImageError),
}

/// Plain-text PPM: header, then one `R G B` line per pixel, top row first.
pub fn write_ppm<W: Write>(image: &RenderedImage, out: &mut W) -> io::Result<()> {
    writeln!(out, "P3\n{} {}\n255", image.width, image.height)?;
    for row in image.pixels.chunks(image.width.max(1)).rev() {
        for [r, g, b] in row {
            writeln!(out, "{} {} {}", r, g, b)?;
        }
    }
    Ok(())
}

pub fn to_rgb_image(image: &RenderedImage) -> RgbImage {
    let height = image.height as u32;
    ImageBuffer::from_fn(image.width as u32, height, |x, y| {
        Rgb(image.get(x as usize, (height - 1 - y) as usize))
    })
}

/// Writes `.ppm` as text and anything else through the `image` encoders.
pub fn save<P: AsRef<Path>>(image: &RenderedImage, path: P) -> Result<(), OutputError> {
    let path = path.as_ref();
    let is_ppm = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("ppm"));
    if is_ppm {
        let mut out = BufWriter::new(File::create(path)?);
        write_ppm(image, &mut out)?;
        out.flush()?;
    } else {
        to_rgb_image(image).save(path)?;
    }
    Ok(())
}
