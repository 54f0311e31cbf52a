// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for PaddleOCR

use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;

/// Detection inputs are resized to multiples of this stride
pub const DET_STRIDE: u32 = 32;

/// Recognition model input height (PP-OCR English models use 48)
pub const REC_INPUT_HEIGHT: u32 = 48;

/// Minimum padded width for recognition input
pub const REC_MIN_WIDTH: u32 = 320;

/// Angle classifier input height
pub const CLS_INPUT_HEIGHT: u32 = 48;

/// Angle classifier input width
pub const CLS_INPUT_WIDTH: u32 = 192;

/// Mean values for detection normalization (ImageNet)
pub const DET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Std values for detection normalization (ImageNet)
pub const DET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Recognition and classification normalize to [-1, 1]
const REC_MEAN: [f32; 3] = [0.5, 0.5, 0.5];
const REC_STD: [f32; 3] = [0.5, 0.5, 0.5];

/// Scale applied when resizing for detection
///
/// Used to map boxes found on the resized image back to the original.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetResizeInfo {
    pub ratio_w: f32,
    pub ratio_h: f32,
    pub original_width: u32,
    pub original_height: u32,
}

impl DetResizeInfo {
    /// Map a coordinate from resized space back to original image space
    ///
    /// The result is clamped to the image bounds.
    pub fn map_to_original(&self, x: f32, y: f32) -> (f32, f32) {
        let orig_x = (x / self.ratio_w).clamp(0.0, self.original_width as f32);
        let orig_y = (y / self.ratio_h).clamp(0.0, self.original_height as f32);
        (orig_x, orig_y)
    }
}

/// Target detection size for an image
///
/// The longer side is limited to `limit_side_len`, then both sides are
/// rounded to the nearest multiple of 32 (at least 32).
pub fn detection_size(width: u32, height: u32, limit_side_len: u32) -> (u32, u32) {
    let max_side = width.max(height).max(1);
    let ratio = if max_side > limit_side_len {
        limit_side_len as f32 / max_side as f32
    } else {
        1.0
    };

    let round_to_stride = |side: u32| {
        let scaled = (side as f32 * ratio / DET_STRIDE as f32).round() as u32 * DET_STRIDE;
        scaled.max(DET_STRIDE)
    };

    (round_to_stride(width), round_to_stride(height))
}

/// Preprocess an image for text detection
///
/// Steps:
/// 1. Resize so the longer side fits `limit_side_len`, sides multiple of 32
/// 2. Normalize with ImageNet mean/std: (pixel/255 - mean) / std
/// 3. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_detection(
    image: &RgbImage,
    limit_side_len: u32,
) -> (Array4<f32>, DetResizeInfo) {
    let (orig_w, orig_h) = image.dimensions();
    let (new_w, new_h) = detection_size(orig_w, orig_h, limit_side_len);

    let resized = imageops::resize(image, new_w, new_h, FilterType::Triangle);

    let info = DetResizeInfo {
        ratio_w: new_w as f32 / orig_w.max(1) as f32,
        ratio_h: new_h as f32 / orig_h.max(1) as f32,
        original_width: orig_w,
        original_height: orig_h,
    };

    let mut tensor = Array4::zeros((1, 3, new_h as usize, new_w as usize));
    normalize_into(&mut tensor, &resized, DET_MEAN, DET_STD);

    (tensor, info)
}

/// Preprocess a cropped text line for recognition
///
/// Steps:
/// 1. Resize to height 48, width ceil(48 * w / h) preserving aspect ratio
/// 2. Normalize to [-1, 1]
/// 3. Right-pad with zeros to at least 320 wide, NCHW [1, 3, 48, W]
pub fn preprocess_for_recognition(image: &RgbImage) -> Array4<f32> {
    let resized_w = scaled_width(image, REC_INPUT_HEIGHT, u32::MAX);
    let tensor_w = resized_w.max(REC_MIN_WIDTH);

    let resized = imageops::resize(image, resized_w, REC_INPUT_HEIGHT, FilterType::Triangle);

    let mut tensor = Array4::zeros((1, 3, REC_INPUT_HEIGHT as usize, tensor_w as usize));
    normalize_into(&mut tensor, &resized, REC_MEAN, REC_STD);
    tensor
}

/// Preprocess a cropped text line for the angle classifier
///
/// Same as recognition but with a fixed 48x192 input, wider crops are
/// squeezed to fit.
pub fn preprocess_for_classification(image: &RgbImage) -> Array4<f32> {
    let resized_w = scaled_width(image, CLS_INPUT_HEIGHT, CLS_INPUT_WIDTH);
    let resized = imageops::resize(image, resized_w, CLS_INPUT_HEIGHT, FilterType::Triangle);

    let mut tensor = Array4::zeros((
        1,
        3,
        CLS_INPUT_HEIGHT as usize,
        CLS_INPUT_WIDTH as usize,
    ));
    normalize_into(&mut tensor, &resized, REC_MEAN, REC_STD);
    tensor
}

fn scaled_width(image: &RgbImage, target_height: u32, max_width: u32) -> u32 {
    let (w, h) = image.dimensions();
    let ratio = w.max(1) as f32 / h.max(1) as f32;
    ((target_height as f32 * ratio).ceil() as u32).clamp(1, max_width)
}

/// Write normalized pixels into the top-left corner of an NCHW tensor
fn normalize_into(tensor: &mut Array4<f32>, image: &RgbImage, mean: [f32; 3], std: [f32; 3]) {
    let (_, _, tensor_h, tensor_w) = tensor.dim();
    let height = (image.height() as usize).min(tensor_h);
    let width = (image.width() as usize).min(tensor_w);

    for y in 0..height {
        for x in 0..width {
            let pixel = image.get_pixel(x as u32, y as u32);
            for c in 0..3 {
                tensor[[0, c, y, x]] = (pixel[c] as f32 / 255.0 - mean[c]) / std[c];
            }
        }
    }
}
