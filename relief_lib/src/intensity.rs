//! Decoding and normalization of input images into single-channel intensity grids

use image::imageops::{self, FilterType};
use log::info;

use crate::grid::ScalarGrid2d;
use crate::{ConversionError, Real};

/// Decodes an encoded image payload into a square single-channel intensity grid
///
/// The payload can be in any raster format supported by the enabled `image`
/// crate decoders. Multi-channel images are reduced to a single channel using
/// the standard BT.601 luma transform, single-channel images are passed
/// through. The result is resampled (bilinear) to `resolution × resolution`
/// cells regardless of the original aspect ratio, with intensities in `0..=255`.
pub fn decode_intensity_grid<R: Real>(
    image_bytes: &[u8],
    resolution: usize,
) -> Result<ScalarGrid2d<R>, ConversionError> {
    if resolution < 2 {
        return Err(ConversionError::InvalidOption {
            option: "resolution",
            reason: format!("grid side length has to be at least 2, got {}", resolution),
        });
    }

    let decoded = image::load_from_memory(image_bytes)?;
    info!(
        "Decoded a {}x{} input image with color type {:?}.",
        decoded.width(),
        decoded.height(),
        decoded.color()
    );

    let luma = decoded.to_luma8();
    let resized = imageops::resize(
        &luma,
        resolution as u32,
        resolution as u32,
        FilterType::Triangle,
    );

    let mut grid = ScalarGrid2d::new_zeros(resolution, resolution);
    for (x, y, pixel) in resized.enumerate_pixels() {
        grid.set(x as usize, y as usize, R::from_u8(pixel.0[0]).unwrap());
    }

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::io::Cursor;

    fn encode_png(image: &GrayImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("in-memory png encoding should not fail");
        bytes
    }

    #[test]
    fn test_decode_resizes_to_square_grid() {
        let image = GrayImage::from_pixel(16, 8, Luma([200u8]));
        let grid =
            decode_intensity_grid::<f64>(&encode_png(&image), 4).expect("decoding should succeed");

        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 4);
        assert!(grid.data().iter().all(|&v| v == 200.0));
    }

    #[test]
    fn test_decode_rejects_malformed_payload() {
        let result = decode_intensity_grid::<f64>(&[0x13, 0x37, 0x00, 0xff], 8);
        assert!(matches!(result, Err(ConversionError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_invalid_resolution() {
        let image = GrayImage::from_pixel(4, 4, Luma([0u8]));
        let result = decode_intensity_grid::<f64>(&encode_png(&image), 1);
        assert!(matches!(
            result,
            Err(ConversionError::InvalidOption {
                option: "resolution",
                ..
            })
        ));
    }
}
