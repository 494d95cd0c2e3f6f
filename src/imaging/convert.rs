use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::path::Path;
use thiserror::Error;

use super::format::OutputFormat;
use super::params::{Quality, RenderParams};

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(image::ImageError),
    #[error("Cannot render onto a {width}x{height} canvas")]
    CanvasUnavailable { width: u32, height: u32 },
    #[error("Failed to encode {format:?}: {source}")]
    Encode {
        format: OutputFormat,
        source: image::ImageError,
    },
}

/// Longest canvas side accepted by [`render_to_square`].
pub const MAX_CANVAS_SIDE: u32 = 16384;

/// Pixel budget for the canvas and for the scaled image it is cropped from.
pub const MAX_CANVAS_PIXELS: u64 = 64 * 1024 * 1024;

/// Formats the compiled-in decoders can read.
///
/// AVIF is missing on purpose: the `image` crate's `avif` feature only
/// brings the encoder.
const DECODABLE: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Tiff,
    ImageFormat::WebP,
];

/// Whether `path` has the extension of a decodable image.
pub fn is_image_path(path: &Path) -> bool {
    ImageFormat::from_path(path).is_ok_and(|format| DECODABLE.contains(&format))
}

/// Decode an image, sniffing the format from its content.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ConvertError> {
    image::load_from_memory(bytes).map_err(ConvertError::Decode)
}

/// Scale `source` to cover a `width` x `height` canvas, centered, cropping the overflow.
///
/// The scale factor is `max(width / source_width, height / source_height)`,
/// so small sources are enlarged. Canvases that are empty, wider or taller
/// than [`MAX_CANVAS_SIDE`], or whose scaled source would exceed
/// [`MAX_CANVAS_PIXELS`] are refused with [`ConvertError::CanvasUnavailable`].
pub fn render_to_square(
    source: &DynamicImage,
    width: u32,
    height: u32,
) -> Result<DynamicImage, ConvertError> {
    if !canvas_fits(source.width(), source.height(), width, height) {
        return Err(ConvertError::CanvasUnavailable { width, height });
    }
    Ok(source.resize_to_fill(width, height, FilterType::Lanczos3))
}

fn canvas_fits(source_width: u32, source_height: u32, width: u32, height: u32) -> bool {
    if width == 0 || height == 0 || source_width == 0 || source_height == 0 {
        return false;
    }
    if width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
        return false;
    }
    if width as u64 * height as u64 > MAX_CANVAS_PIXELS {
        return false;
    }

    // resize_to_fill scales the whole source before cropping
    let ratio = f64::max(
        width as f64 / source_width as f64,
        height as f64 / source_height as f64,
    );
    let scaled_width = (source_width as f64 * ratio).ceil();
    let scaled_height = (source_height as f64 * ratio).ceil();
    scaled_width * scaled_height <= MAX_CANVAS_PIXELS as f64
}

/// Composite onto black, the way a cleared canvas exports to JPEG.
fn flatten_onto_black(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let over = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        Rgb([over(r), over(g), over(b)])
    })
}

/// Encode `img` in the requested format.
///
/// `quality` applies to JPEG and AVIF. PNG and WebP are written lossless.
pub fn encode(
    img: &DynamicImage,
    format: OutputFormat,
    quality: Quality,
) -> Result<Vec<u8>, ConvertError> {
    let mut out = Vec::new();
    let result = match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(flatten_onto_black(img));
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality.percent()))
        }
        OutputFormat::Png => img.write_with_encoder(PngEncoder::new(&mut out)),
        OutputFormat::Webp => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_with_encoder(WebPEncoder::new_lossless(&mut out))
        }
        OutputFormat::Avif => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_with_encoder(AvifEncoder::new_with_speed_quality(
                &mut out,
                6,
                quality.percent(),
            ))
        }
    };
    result.map_err(|source| ConvertError::Encode { format, source })?;
    Ok(out)
}

/// Decode, render and re-encode one source image.
pub fn convert(bytes: &[u8], params: &RenderParams) -> Result<Vec<u8>, ConvertError> {
    let source = decode(bytes)?;
    let rendered = render_to_square(&source, params.width, params.height)?;
    encode(&rendered, params.format, params.quality)
}
