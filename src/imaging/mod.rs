//! Image conversion for the batch pipeline.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::load_from_memory` |
//! | Square render | `DynamicImage::resize_to_fill` (cover, centered, Lanczos3) |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → PNG | `PngEncoder` |
//! | Encode → WebP | `WebPEncoder::new_lossless` |
//! | Encode → AVIF | `AvifEncoder` (rav1e, speed 6) |
//!
//! The module is split into:
//! - **Format**: output formats and the MIME → file extension table
//! - **Parameters**: [`Quality`] and [`RenderParams`]
//! - **Convert**: decode, render and encode, reported through [`ConvertError`]

mod convert;
mod format;
mod params;

pub use convert::{
    ConvertError, MAX_CANVAS_PIXELS, MAX_CANVAS_SIDE, convert, decode, encode, is_image_path,
    render_to_square,
};
pub use format::{DEFAULT_EXTENSION, OutputFormat, entry_extension, pick_ext_from_mime};
pub use params::{Quality, RenderParams};
