//! OpenCV-backed capture devices.

use image::RgbImage;
use opencv::{
    core::{Mat, MatTraitConst, MatTraitConstManual},
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use tracing::debug;

use crate::capture::{Backend, CaptureDevice, DeviceCandidate, DeviceOpener};
use crate::error::{Error, Result};

impl From<opencv::Error> for Error {
    fn from(e: opencv::Error) -> Self {
        Error::Backend(e.to_string())
    }
}

impl Backend {
    /// The matching `videoio` API preference.
    pub fn api_preference(self) -> i32 {
        match self {
            Backend::Default => videoio::CAP_ANY,
            Backend::DirectShow => videoio::CAP_DSHOW,
            Backend::MediaFoundation => videoio::CAP_MSMF,
            Backend::V4l2 => videoio::CAP_V4L2,
            Backend::AvFoundation => videoio::CAP_AVFOUNDATION,
        }
    }
}

/// Opens devices through `videoio::VideoCapture`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCvOpener;

impl DeviceOpener for OpenCvOpener {
    type Device = OpenCvDevice;

    fn open(&self, candidate: DeviceCandidate) -> Result<OpenCvDevice> {
        let index = i32::try_from(candidate.index)
            .map_err(|_| Error::InvalidDeviceIndex(candidate.index.to_string()))?;
        let cap = VideoCapture::new(index, candidate.backend.api_preference())?;
        Ok(OpenCvDevice {
            cap,
            bgr: Mat::default(),
            rgb: Mat::default(),
        })
    }
}

pub struct OpenCvDevice {
    cap: VideoCapture,
    bgr: Mat,
    rgb: Mat,
}

impl OpenCvDevice {
    fn grab_rgb(&mut self) -> Result<Option<RgbImage>> {
        if !self.cap.read(&mut self.bgr)? {
            return Ok(None);
        }

        let size = self.bgr.size()?;
        if size.width <= 0 || size.height <= 0 {
            return Ok(None);
        }

        imgproc::cvt_color(&self.bgr, &mut self.rgb, imgproc::COLOR_BGR2RGB, 0)?;
        let data = self.rgb.data_bytes()?.to_vec();
        Ok(RgbImage::from_raw(size.width as u32, size.height as u32, data))
    }
}

impl CaptureDevice for OpenCvDevice {
    fn is_opened(&self) -> bool {
        self.cap.is_opened().unwrap_or(false)
    }

    fn set_resolution(&mut self, width: u32, height: u32) -> bool {
        let w = self.cap.set(videoio::CAP_PROP_FRAME_WIDTH, f64::from(width));
        let h = self.cap.set(videoio::CAP_PROP_FRAME_HEIGHT, f64::from(height));
        matches!((w, h), (Ok(true), Ok(true)))
    }

    fn read(&mut self) -> Option<RgbImage> {
        match self.grab_rgb() {
            Ok(frame) => frame,
            Err(e) => {
                debug!(error = %e, "frame read failed");
                None
            }
        }
    }

    fn release(&mut self) {
        if let Err(e) = self.cap.release() {
            debug!(error = %e, "camera release failed");
        }
    }
}
