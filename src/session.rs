//! Tick driver tying acquisition, detection and analysis together.
//!
//! A [`Session`] owns the capture slot and the detector. Each call to
//! [`Session::tick`] pulls at most one frame and returns everything a display
//! needs: the frame, the report if a frame was analysed, and a status
//! line. [`run`] repeats
//! ticks at the configured interval until asked to stop.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use image::{imageops, RgbImage};
use tracing::{error, info, warn};

use crate::capture::{CaptureManager, DeviceOpener, DeviceState, FrameRead};
use crate::config::Config;
use crate::detector::{DetectorHandle, LandmarkDetector};
use crate::error::Result;
use crate::overlay::placeholder_frame;
use crate::pipeline::process_frame;
use crate::report::AnalysisReport;

/// Connectivity and detection summary for the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    NotConnected,
    ConnectedNoFrame,
    Connected { landmarks: Option<usize> },
    StillImage { width: u32, height: u32, landmarks: Option<usize> },
}

fn landmark_text(landmarks: Option<usize>) -> String {
    match landmarks {
        Some(n) => n.to_string(),
        None => "none".to_string(),
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NotConnected => write!(f, "Camera: not connected"),
            Status::ConnectedNoFrame => write!(f, "Camera: connected (no frame)"),
            Status::Connected { landmarks } => {
                write!(f, "Camera: connected  Landmarks: {}", landmark_text(*landmarks))
            }
            Status::StillImage {
                width,
                height,
                landmarks,
            } => write!(
                f,
                "Image: {}x{}  Landmarks: {}",
                width,
                height,
                landmark_text(*landmarks)
            ),
        }
    }
}

/// What one tick hands to the display.
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub frame: RgbImage,
    /// `None` when no frame was read; the status line says why.
    pub report: Option<AnalysisReport>,
    pub status: Status,
}

pub struct Session<O: DeviceOpener, D: LandmarkDetector> {
    capture: CaptureManager<O>,
    detector: DetectorHandle<D>,
    config: Config,
}

impl<O: DeviceOpener, D: LandmarkDetector> Session<O, D> {
    /// Create a session without opening any device.
    pub fn new(opener: O, detector: D, config: Config) -> Self {
        Self {
            capture: CaptureManager::new(opener, config.acquisition.clone()),
            detector: DetectorHandle::new(detector),
            config,
        }
    }

    /// Create a session and open the first available device, if any.
    pub fn start(opener: O, detector: D, config: Config) -> Self {
        let mut session = Self::new(opener, detector, config);

        let devices = session.capture.available_devices();
        match devices.first() {
            Some(&index) => {
                if let Err(e) = session.capture.select(index) {
                    warn!(error = %e, ?devices, "could not open default camera");
                }
            }
            None => warn!("no cameras detected"),
        }

        session
    }

    pub fn capture(&self) -> &CaptureManager<O> {
        &self.capture
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Switch to another device. The current device is closed even if the
    /// new one fails to open.
    pub fn select_device(&mut self, index: u32) -> Result<String> {
        self.capture.select(index)
    }

    pub fn close_device(&mut self) {
        self.capture.close();
    }

    /// Pull one frame and analyse it.
    pub fn tick(&mut self) -> TickOutput {
        match self.capture.read_frame() {
            FrameRead::Frame(mut frame) => {
                if self.config.acquisition.mirror {
                    imageops::flip_horizontal_in_place(&mut frame);
                }
                let analysis = process_frame(&mut self.detector, &mut frame);
                TickOutput {
                    frame,
                    report: Some(analysis.report),
                    status: Status::Connected {
                        landmarks: analysis.landmark_count,
                    },
                }
            }
            FrameRead::NoFrame => {
                let status = match self.capture.state() {
                    DeviceState::Open => Status::ConnectedNoFrame,
                    _ => Status::NotConnected,
                };
                let acquisition = &self.config.acquisition;
                TickOutput {
                    frame: placeholder_frame(
                        acquisition.width,
                        acquisition.height,
                        self.config.placeholder_color,
                    ),
                    report: None,
                    status,
                }
            }
        }
    }

    /// Analyse a decoded still image. Device state is not touched.
    pub fn analyze_still(&mut self, image: RgbImage) -> TickOutput {
        analyze_still(&mut self.detector, image)
    }

    /// Release the camera and the detector.
    pub fn shutdown(mut self) {
        self.capture.close();
        self.detector.release();
        info!("session shut down");
    }
}

/// Analyse a decoded still image at its native size.
pub fn analyze_still<D: LandmarkDetector>(
    detector: &mut DetectorHandle<D>,
    mut image: RgbImage,
) -> TickOutput {
    let (width, height) = image.dimensions();
    let analysis = process_frame(detector, &mut image);
    TickOutput {
        frame: image,
        report: Some(analysis.report),
        status: Status::StillImage {
            width,
            height,
            landmarks: analysis.landmark_count,
        },
    }
}

/// Tick `session` until `stop` is set, handing each result to `display`.
///
/// Ticks never overlap: the next one starts `tick_interval` after the
/// previous one returned. A panicking tick is logged and skipped.
pub fn run<O, D, F>(session: &mut Session<O, D>, stop: &AtomicBool, mut display: F)
where
    O: DeviceOpener,
    D: LandmarkDetector,
    F: FnMut(TickOutput),
{
    let interval = session.config.tick_interval();

    while !stop.load(Ordering::Relaxed) {
        match panic::catch_unwind(AssertUnwindSafe(|| session.tick())) {
            Ok(output) => display(output),
            Err(_) => error!("tick failed; continuing with next tick"),
        }
        thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lines() {
        assert_eq!(Status::NotConnected.to_string(), "Camera: not connected");
        assert_eq!(Status::ConnectedNoFrame.to_string(), "Camera: connected (no frame)");
        assert_eq!(
            Status::Connected { landmarks: Some(478) }.to_string(),
            "Camera: connected  Landmarks: 478"
        );
        assert_eq!(
            Status::Connected { landmarks: None }.to_string(),
            "Camera: connected  Landmarks: none"
        );
        assert_eq!(
            Status::StillImage {
                width: 800,
                height: 600,
                landmarks: Some(468)
            }
            .to_string(),
            "Image: 800x600  Landmarks: 468"
        );
    }
}
