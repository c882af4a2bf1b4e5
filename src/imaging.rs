//! Wardrobe image normalization.
//!
//! Uploaded photos arrive in whatever color mode the user's camera or editor produced.
//! JPEG cannot carry alpha, so every upload is flattened to 8-bit RGB before it is
//! re-encoded and sent to a vision model:
//!
//! - RGBA and gray+alpha (any bit depth) are composited onto opaque white, using the
//!   alpha channel as the blend mask.
//! - Palette images with a transparency entry are expanded to RGBA by the decoder and
//!   take the same compositing path.
//! - Everything else (palette without transparency, grayscale, CMYK, 16-bit, float)
//!   is converted straight to RGB.

use crate::error::Result;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, Rgb, RgbImage, Rgba};
use tracing::debug;

/// JPEG quality used when re-encoding uploads.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// MIME type of every normalized wardrobe image.
pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// Color mode of a decoded upload, as far as normalization cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Rgb,
    Rgba,
    Grayscale,
    GrayscaleAlpha,
    Other,
}

impl ColorMode {
    pub fn of(image: &DynamicImage) -> Self {
        match image.color() {
            ColorType::Rgb8 => ColorMode::Rgb,
            ColorType::L8 | ColorType::L16 => ColorMode::Grayscale,
            ColorType::La8 | ColorType::La16 => ColorMode::GrayscaleAlpha,
            ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => ColorMode::Rgba,
            other if other.has_alpha() => ColorMode::Rgba,
            _ => ColorMode::Other,
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, ColorMode::Rgba | ColorMode::GrayscaleAlpha)
    }
}

/// Composite an image onto an opaque white background.
pub fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    RgbImage::from_fn(width, height, |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        Rgb([over_white(r, a), over_white(g, a), over_white(b, a)])
    })
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let channel = channel as u32;
    let alpha = alpha as u32;
    ((channel * alpha + 255 * (255 - alpha) + 127) / 255) as u8
}

/// Convert any decoded image to 8-bit RGB.
pub fn normalize_to_rgb(image: DynamicImage) -> RgbImage {
    let mode = ColorMode::of(&image);
    if mode.has_alpha() {
        debug!(?mode, "Flattening alpha channel onto white");
        flatten_onto_white(&image)
    } else {
        image.into_rgb8()
    }
}

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality).encode_image(image)?;
    Ok(buffer)
}

/// An uploaded wardrobe photo, normalized and re-encoded as JPEG.
#[derive(Debug, Clone)]
pub struct WardrobeImage {
    jpeg: Vec<u8>,
    width: u32,
    height: u32,
    source_mode: ColorMode,
}

impl WardrobeImage {
    /// Decode raw upload bytes, flatten them to RGB and encode as JPEG.
    ///
    /// Malformed or truncated input is reported as [`crate::MuseError::ImageError`].
    pub fn from_upload(bytes: &[u8], quality: u8) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)?;
        let source_mode = ColorMode::of(&decoded);
        let rgb = normalize_to_rgb(decoded);
        let (width, height) = rgb.dimensions();
        let jpeg = encode_jpeg(&rgb, quality)?;

        debug!(
            width,
            height,
            ?source_mode,
            upload_bytes = bytes.len(),
            jpeg_bytes = jpeg.len(),
            "Normalized wardrobe image"
        );

        Ok(Self {
            jpeg,
            width,
            height,
            source_mode,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.jpeg
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.jpeg)
    }

    /// `data:` URI for embedding the normalized image in a page.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", JPEG_MIME_TYPE, self.to_base64())
    }

    pub fn mime_type(&self) -> &'static str {
        JPEG_MIME_TYPE
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn source_mode(&self) -> ColorMode {
        self.source_mode
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{GrayAlphaImage, GrayImage, ImageFormat, LumaA, RgbaImage};
    use std::io::Cursor;

    pub(crate) fn png_bytes(image: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    fn indexed_png(trns: Option<Vec<u8>>) -> Vec<u8> {
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, 2, 1);
            encoder.set_color(png::ColorType::Indexed);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_palette(vec![200u8, 10, 10, 10, 10, 200]);
            if let Some(trns) = trns {
                encoder.set_trns(trns);
            }
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0, 1]).unwrap();
        }
        bytes
    }

    fn decode_jpeg(bytes: &[u8]) -> DynamicImage {
        image::load_from_memory_with_format(bytes, ImageFormat::Jpeg).unwrap()
    }

    #[test]
    fn test_color_mode_classification() {
        assert_eq!(ColorMode::of(&DynamicImage::new_rgb8(1, 1)), ColorMode::Rgb);
        assert_eq!(ColorMode::of(&DynamicImage::new_rgba8(1, 1)), ColorMode::Rgba);
        assert_eq!(ColorMode::of(&DynamicImage::new_rgba16(1, 1)), ColorMode::Rgba);
        assert_eq!(ColorMode::of(&DynamicImage::new_luma8(1, 1)), ColorMode::Grayscale);
        assert_eq!(ColorMode::of(&DynamicImage::new_luma_a8(1, 1)), ColorMode::GrayscaleAlpha);
        assert_eq!(ColorMode::of(&DynamicImage::new_rgb16(1, 1)), ColorMode::Other);
    }

    #[test]
    fn test_has_alpha() {
        assert!(ColorMode::Rgba.has_alpha());
        assert!(ColorMode::GrayscaleAlpha.has_alpha());
        assert!(!ColorMode::Rgb.has_alpha());
        assert!(!ColorMode::Grayscale.has_alpha());
        assert!(!ColorMode::Other.has_alpha());
    }

    #[test]
    fn test_transparent_pixel_becomes_white() {
        let mut rgba = RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, Rgba([12, 34, 56, 0]));
        rgba.put_pixel(1, 0, Rgba([12, 34, 56, 255]));

        let flattened = flatten_onto_white(&DynamicImage::ImageRgba8(rgba));

        assert_eq!(*flattened.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*flattened.get_pixel(1, 0), Rgb([12, 34, 56]));
    }

    #[test]
    fn test_half_transparent_pixel_blends_toward_white() {
        let mut rgba = RgbaImage::new(1, 1);
        rgba.put_pixel(0, 0, Rgba([0, 0, 0, 128]));

        let flattened = flatten_onto_white(&DynamicImage::ImageRgba8(rgba));

        assert_eq!(*flattened.get_pixel(0, 0), Rgb([127, 127, 127]));
    }

    #[test]
    fn test_gray_alpha_flattens_onto_white() {
        let mut la = GrayAlphaImage::new(2, 1);
        la.put_pixel(0, 0, LumaA([40, 0]));
        la.put_pixel(1, 0, LumaA([40, 255]));

        let rgb = normalize_to_rgb(DynamicImage::ImageLumaA8(la));

        assert_eq!(*rgb.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*rgb.get_pixel(1, 0), Rgb([40, 40, 40]));
    }

    #[test]
    fn test_grayscale_converts_without_compositing() {
        let gray = GrayImage::from_pixel(1, 1, image::Luma([90]));

        let rgb = normalize_to_rgb(DynamicImage::ImageLuma8(gray));

        assert_eq!(*rgb.get_pixel(0, 0), Rgb([90, 90, 90]));
    }

    #[test]
    fn test_palette_with_transparency_composites_onto_white() {
        let bytes = indexed_png(Some(vec![0, 255]));
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(ColorMode::of(&decoded).has_alpha());

        let rgb = normalize_to_rgb(decoded);

        assert_eq!(*rgb.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*rgb.get_pixel(1, 0), Rgb([10, 10, 200]));
    }

    #[test]
    fn test_palette_without_transparency_converts_directly() {
        let bytes = indexed_png(None);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(!ColorMode::of(&decoded).has_alpha());

        let rgb = normalize_to_rgb(decoded);

        assert_eq!(*rgb.get_pixel(0, 0), Rgb([200, 10, 10]));
    }

    #[test]
    fn test_rgba_upload_produces_jpeg_without_alpha() {
        let rgba = RgbaImage::from_pixel(8, 8, Rgba([10, 200, 30, 64]));
        let upload = png_bytes(DynamicImage::ImageRgba8(rgba));

        let image = WardrobeImage::from_upload(&upload, DEFAULT_JPEG_QUALITY).unwrap();

        assert_eq!(image.source_mode(), ColorMode::Rgba);
        assert_eq!(&image.as_bytes()[..2], &[0xFF, 0xD8]);
        let decoded = decode_jpeg(image.as_bytes());
        assert_eq!(decoded.color(), ColorType::Rgb8);
        assert_eq!(image.dimensions(), (8, 8));
    }

    #[test]
    fn test_gray_alpha_upload_produces_jpeg_without_alpha() {
        let la = GrayAlphaImage::from_pixel(4, 4, LumaA([100, 10]));
        let upload = png_bytes(DynamicImage::ImageLumaA8(la));

        let image = WardrobeImage::from_upload(&upload, DEFAULT_JPEG_QUALITY).unwrap();

        assert_eq!(image.source_mode(), ColorMode::GrayscaleAlpha);
        let decoded = decode_jpeg(image.as_bytes());
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_fully_transparent_upload_stays_near_white_after_jpeg() {
        let rgba = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]));
        let upload = png_bytes(DynamicImage::ImageRgba8(rgba));

        let image = WardrobeImage::from_upload(&upload, DEFAULT_JPEG_QUALITY).unwrap();
        let decoded = decode_jpeg(image.as_bytes()).to_rgb8();

        for pixel in decoded.pixels() {
            assert!(pixel.0.iter().all(|c| *c >= 250), "pixel {:?} is not white", pixel);
        }
    }

    #[test]
    fn test_truncated_upload_is_an_image_error() {
        let upload = png_bytes(DynamicImage::new_rgb8(16, 16));

        let result = WardrobeImage::from_upload(&upload[..upload.len() / 3], DEFAULT_JPEG_QUALITY);

        assert!(matches!(result, Err(crate::MuseError::ImageError(_))));
    }

    #[test]
    fn test_base64_and_data_uri() {
        let upload = png_bytes(DynamicImage::new_rgb8(2, 2));
        let image = WardrobeImage::from_upload(&upload, DEFAULT_JPEG_QUALITY).unwrap();

        let encoded = image.to_base64();
        let decoded = base64::engine::general_purpose::STANDARD.decode(&encoded).unwrap();
        assert_eq!(decoded, image.as_bytes());
        assert_eq!(image.mime_type(), "image/jpeg");
        assert!(image.to_data_uri().starts_with("data:image/jpeg;base64,"));
    }
}
