use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("Camera unavailable: {descriptor}")]
    DeviceUnavailable { descriptor: String },

    #[error("Invalid camera index: {0:?}")]
    InvalidDeviceIndex(String),

    #[error("Landmark index {index} out of range for {len} landmarks")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Capture backend error: {0}")]
    Backend(String),

    #[error("Landmark detector error: {0}")]
    Detector(String),

    #[error("Landmark detector has already been released")]
    DetectorReleased,
}

pub type Result<T> = std::result::Result<T, Error>;
