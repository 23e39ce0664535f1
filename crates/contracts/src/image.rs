//! ImageData - pixel buffers exchanged between the camera and the tracks.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Image data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Image width
    pub width: u32,

    /// Image height
    pub height: u32,

    /// Pixel format
    pub format: PixelFormat,

    /// Raw pixel data, row-major, tightly packed
    pub data: Bytes,
}

/// Pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// Single channel (mono sensors)
    Gray8,
    Rgb8,
    /// Native layout of the video transport
    Bgr8,
}

impl PixelFormat {
    /// Bytes per pixel
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 | PixelFormat::Bgr8 => 3,
        }
    }
}

impl ImageData {
    /// Image with every byte set to `value`
    pub fn filled(width: u32, height: u32, format: PixelFormat, value: u8) -> Self {
        let len = width as usize * height as usize * format.channels();
        Self {
            width,
            height,
            format,
            data: Bytes::from(vec![value; len]),
        }
    }

    /// All-zero image
    pub fn black(width: u32, height: u32, format: PixelFormat) -> Self {
        Self::filled(width, height, format, 0)
    }

    /// Number of bytes `data` must hold for the declared shape
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.channels()
    }

    /// Check that the buffer length matches width × height × channels
    pub fn check_shape(&self) -> Result<(), ContractError> {
        if self.data.len() != self.expected_len() {
            return Err(ContractError::conversion(format!(
                "{}x{} {:?} expects {} bytes, got {}",
                self.width,
                self.height,
                self.format,
                self.expected_len(),
                self.data.len()
            )));
        }
        Ok(())
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
