//! Frame normalization
//!
//! Mono sensors deliver `Gray8`; the tracks expect three-channel frames at the
//! configured output resolution.

use bytes::Bytes;
use contracts::{ContractError, ImageData, PixelFormat};
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};

/// Expand to three channels and resize to `width` × `height`
///
/// `Gray8` becomes `Rgb8`; three-channel input keeps its channel order.
pub fn normalize(frame: ImageData, width: u32, height: u32) -> Result<ImageData, ContractError> {
    frame.check_shape()?;

    let (format, rgb) = match frame.format {
        PixelFormat::Gray8 => (PixelFormat::Rgb8, gray_to_rgb(&frame)?),
        PixelFormat::Rgb8 | PixelFormat::Bgr8 => {
            if frame.dimensions() == (width, height) {
                return Ok(frame);
            }
            (frame.format, three_channel(&frame)?)
        }
    };

    let resized = if rgb.dimensions() == (width, height) {
        rgb
    } else {
        imageops::resize(&rgb, width, height, FilterType::Triangle)
    };

    Ok(ImageData {
        width,
        height,
        format,
        data: Bytes::from(resized.into_raw()),
    })
}

fn gray_to_rgb(frame: &ImageData) -> Result<RgbImage, ContractError> {
    let gray = GrayImage::from_raw(frame.width, frame.height, frame.data.to_vec())
        .ok_or_else(|| ContractError::conversion("gray buffer does not match dimensions"))?;
    Ok(image::DynamicImage::ImageLuma8(gray).to_rgb8())
}

// Channel order is irrelevant for resampling, so BGR rides in an RgbImage container.
fn three_channel(frame: &ImageData) -> Result<RgbImage, ContractError> {
    RgbImage::from_raw(frame.width, frame.height, frame.data.to_vec())
        .ok_or_else(|| ContractError::conversion("rgb buffer does not match dimensions"))
}
