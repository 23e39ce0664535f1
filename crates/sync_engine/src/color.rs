//! Transport color layout helpers.

use bytes::Bytes;
use contracts::{ContractError, ImageData, PixelFormat};

/// Convert to BGR24, the transport's native layout
///
/// `Bgr8` passes through without copying.
pub fn to_bgr(image: ImageData) -> Result<ImageData, ContractError> {
    image.check_shape()?;

    let data = match image.format {
        PixelFormat::Bgr8 => return Ok(image),
        PixelFormat::Rgb8 => {
            let mut out = image.data.to_vec();
            for px in out.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
            out
        }
        PixelFormat::Gray8 => image.data.iter().flat_map(|&v| [v, v, v]).collect(),
    };

    Ok(ImageData {
        width: image.width,
        height: image.height,
        format: PixelFormat::Bgr8,
        data: Bytes::from(data),
    })
}

/// Fully black BGR frame
pub fn placeholder(width: u32, height: u32) -> ImageData {
    ImageData::black(width, height, PixelFormat::Bgr8)
}
