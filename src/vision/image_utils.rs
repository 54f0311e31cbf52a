// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image decoding for uploaded files
//!
//! Raw upload bytes are decoded with the `image` crate and turned into a
//! [`PixelGrid`], the `height x width x channels` array handed to the OCR
//! pipeline.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use ndarray::Array3;
use std::io::{Read, Seek, SeekFrom};
use thiserror::Error;
use tracing::debug;

/// Largest image the decoder accepts (64MB)
pub const MAX_IMAGE_SIZE: usize = 64 * 1024 * 1024;

/// Errors raised while turning uploaded bytes into a pixel grid
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,

    #[error("Invalid pixel grid: {0}")]
    InvalidGrid(String),

    #[error("Failed to read image stream: {0}")]
    Io(#[from] std::io::Error),
}

/// Image information extracted during loading
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Detected format
    pub format: ImageFormat,
    /// Size in bytes
    pub size_bytes: usize,
}

/// Decoded image as `height x width x channels` 8-bit intensities
///
/// Channel count follows the source image: 1 (luma), 2 (luma + alpha),
/// 3 (RGB) or 4 (RGBA). Deeper sample types are narrowed to 8 bits.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    data: Array3<u8>,
}

impl PixelGrid {
    /// Wrap an existing array, checking its shape
    pub fn from_array(data: Array3<u8>) -> Result<Self, ImageError> {
        let (height, width, channels) = data.dim();
        if height == 0 || width == 0 {
            return Err(ImageError::InvalidGrid(format!(
                "empty grid {}x{}",
                width, height
            )));
        }
        if !(1..=4).contains(&channels) {
            return Err(ImageError::InvalidGrid(format!(
                "unsupported channel count {}",
                channels
            )));
        }
        Ok(Self { data })
    }

    /// Build a grid from a decoded image, keeping its channel layout
    pub fn from_image(image: &DynamicImage) -> Result<Self, ImageError> {
        let (width, height) = (image.width() as usize, image.height() as usize);
        let color = image.color();

        let (channels, raw) = match (color.channel_count(), color.has_alpha()) {
            (1, _) => (1, image.to_luma8().into_raw()),
            (2, _) => (2, image.to_luma_alpha8().into_raw()),
            (_, true) => (4, image.to_rgba8().into_raw()),
            _ => (3, image.to_rgb8().into_raw()),
        };

        let data = Array3::from_shape_vec((height, width, channels), raw)
            .map_err(|e| ImageError::InvalidGrid(e.to_string()))?;
        Self::from_array(data)
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    /// True for single-channel (grayscale) grids
    pub fn is_2d(&self) -> bool {
        self.channels() == 1
    }

    /// Convert to an RGB image for the models
    ///
    /// Grayscale is replicated across channels. Transparent pixels are
    /// composited onto white so that text on a transparent background stays
    /// readable.
    pub fn to_rgb_image(&self) -> RgbImage {
        let channels = self.channels();
        let data = &self.data;

        RgbImage::from_fn(self.width() as u32, self.height() as u32, |x, y| {
            let (x, y) = (x as usize, y as usize);
            let (rgb, alpha) = match channels {
                1 => {
                    let v = data[[y, x, 0]];
                    ([v, v, v], 255)
                }
                2 => {
                    let v = data[[y, x, 0]];
                    ([v, v, v], data[[y, x, 1]])
                }
                3 => ([data[[y, x, 0]], data[[y, x, 1]], data[[y, x, 2]]], 255),
                _ => (
                    [data[[y, x, 0]], data[[y, x, 1]], data[[y, x, 2]]],
                    data[[y, x, 3]],
                ),
            };
            Rgb(rgb.map(|v| blend_on_white(v, alpha)))
        })
    }
}

fn blend_on_white(value: u8, alpha: u8) -> u8 {
    if alpha == 255 {
        return value;
    }
    let a = alpha as u32;
    ((value as u32 * a + 255 * (255 - a) + 127) / 255) as u8
}

/// Decode raw image bytes (for multipart uploads)
///
/// # Returns
/// * `Ok((DynamicImage, ImageInfo))` - The decoded image and metadata
/// * `Err(ImageError)` - If decoding fails
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(DynamicImage, ImageInfo), ImageError> {
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(ImageError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
    }

    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    // Detect format from magic bytes
    let format = detect_format(bytes)?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        size_bytes: bytes.len(),
    };

    Ok((img, info))
}

/// Read a whole image stream and decode it into a pixel grid
///
/// The stream is read from its current position to the end and then
/// rewound to that position, so callers can inspect it again afterwards.
pub fn decode_pixel_grid<R: Read + Seek>(reader: &mut R) -> Result<PixelGrid, ImageError> {
    let start = reader.stream_position()?;

    let mut contents = Vec::new();
    let read = reader.read_to_end(&mut contents);
    reader.seek(SeekFrom::Start(start))?;
    read?;

    let (image, info) = decode_image_bytes(&contents)?;
    debug!(
        "Decoded {:?} image: {}x{}, {} bytes",
        info.format, info.width, info.height, info.size_bytes
    );

    PixelGrid::from_image(&image)
}

/// Detect image format from magic bytes
///
/// # Returns
/// * `Ok(ImageFormat)` - Detected format
/// * `Err(ImageError::UnsupportedFormat)` - If format cannot be detected
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.len() < 4 {
        return Err(ImageError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        // TIFF: II (little-endian) or MM (big-endian)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Ok(ImageFormat::Tiff),

        _ => Err(ImageError::UnsupportedFormat),
    }
}
