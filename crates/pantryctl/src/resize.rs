//! JPEG shrinking with the `image` crate

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use pantry_common::error::{PantryError, Result};
use pantry_common::photos::{fit_within, ImageResizer, ResizeSpec};
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct JpegResizer;

impl ImageResizer for JpegResizer {
    fn resize(&self, bytes: &[u8], spec: ResizeSpec) -> Result<Vec<u8>> {
        let img = image::load_from_memory(bytes).map_err(|e| PantryError::Image(e.to_string()))?;
        let (width, height) = img.dimensions();
        let (w, h) = fit_within(width, height, spec.max_edge);
        let img = if (w, h) == (width, height) {
            img
        } else {
            img.resize_exact(w, h, FilterType::Triangle)
        };
        debug!("Resized {}x{} to {}x{}", width, height, w, h);

        let rgb = img.to_rgb8();
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, spec.jpeg_quality())
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), image::ColorType::Rgb8)
            .map_err(|e| PantryError::Image(e.to_string()))?;
        Ok(out)
    }
}
