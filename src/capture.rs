//! Camera acquisition with backend fallback.
//!
//! Devices are reached through the [`DeviceOpener`] seam so that the
//! enumeration, fallback and state logic here is independent of any one
//! capture library. The OpenCV implementation lives in `opencv_backend`.

use std::fmt;

use image::{imageops, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AcquisitionConfig;
use crate::error::{Error, Result};

/// A capture driver selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Whatever the capture library picks by itself.
    Default,
    DirectShow,
    MediaFoundation,
    V4l2,
    AvFoundation,
}

impl Backend {
    pub const fn name(self) -> &'static str {
        match self {
            Backend::Default => "default",
            Backend::DirectShow => "dshow",
            Backend::MediaFoundation => "msmf",
            Backend::V4l2 => "v4l2",
            Backend::AvFoundation => "avfoundation",
        }
    }

    /// Backends to try when opening a device, in order.
    pub fn platform_priority() -> Vec<Backend> {
        if cfg!(target_os = "windows") {
            vec![Backend::Default, Backend::DirectShow, Backend::MediaFoundation]
        } else if cfg!(target_os = "linux") {
            vec![Backend::Default, Backend::V4l2]
        } else if cfg!(target_os = "macos") {
            vec![Backend::Default, Backend::AvFoundation]
        } else {
            vec![Backend::Default]
        }
    }

    /// Backend used for enumeration probes: the first platform-specific
    /// alternate, or the default when the platform has none.
    pub fn preferred_probe() -> Backend {
        Self::platform_priority()
            .into_iter()
            .find(|b| *b != Backend::Default)
            .unwrap_or(Backend::Default)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One (index, backend) combination to try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceCandidate {
    pub index: u32,
    pub backend: Backend,
}

impl DeviceCandidate {
    pub const fn new(index: u32, backend: Backend) -> Self {
        Self { index, backend }
    }

    /// Human-readable description used in diagnostics and status text.
    pub fn descriptor(&self) -> String {
        match self.backend {
            Backend::Default => format!("index={} (default)", self.index),
            backend => format!("index={} backend={}", self.index, backend),
        }
    }
}

/// An opened (or attempted) capture device.
pub trait CaptureDevice {
    /// Whether the device reports itself as open.
    fn is_opened(&self) -> bool;

    /// Request a capture resolution. Returns `true` if the device accepted it.
    fn set_resolution(&mut self, width: u32, height: u32) -> bool;

    /// Grab the next frame as RGB. `None` means no frame was available.
    fn read(&mut self) -> Option<RgbImage>;

    /// Free the underlying device. Must tolerate repeated calls.
    fn release(&mut self);
}

/// Creates devices for candidates.
pub trait DeviceOpener {
    type Device: CaptureDevice;

    /// Attempt to create a device. A returned device may still report
    /// itself as not opened.
    fn open(&self, candidate: DeviceCandidate) -> Result<Self::Device>;
}

/// Result of a fallback open.
pub enum OpenOutcome<D> {
    Opened { device: D, descriptor: String },
    Failed { descriptor: String },
}

impl<D> OpenOutcome<D> {
    pub fn descriptor(&self) -> &str {
        match self {
            OpenOutcome::Opened { descriptor, .. } | OpenOutcome::Failed { descriptor } => {
                descriptor
            }
        }
    }

    pub fn is_opened(&self) -> bool {
        matches!(self, OpenOutcome::Opened { .. })
    }
}

impl<D> fmt::Debug for OpenOutcome<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenOutcome::Opened { descriptor, .. } => {
                f.debug_struct("Opened").field("descriptor", descriptor).finish()
            }
            OpenOutcome::Failed { descriptor } => {
                f.debug_struct("Failed").field("descriptor", descriptor).finish()
            }
        }
    }
}

/// Candidates for `index`, one per backend, in priority order.
pub fn candidates(index: u32, backends: &[Backend]) -> Vec<DeviceCandidate> {
    backends
        .iter()
        .map(|&backend| DeviceCandidate::new(index, backend))
        .collect()
}

/// Open a candidate and check that it reports the opened state.
/// Failed attempts are released before returning.
fn try_candidate<O: DeviceOpener>(opener: &O, candidate: DeviceCandidate) -> Option<O::Device> {
    let descriptor = candidate.descriptor();
    match opener.open(candidate) {
        Ok(mut device) => {
            let opened = device.is_opened();
            debug!(%descriptor, opened, "camera open attempt");
            if opened {
                Some(device)
            } else {
                device.release();
                None
            }
        }
        Err(e) => {
            debug!(%descriptor, error = %e, "camera open attempt failed");
            None
        }
    }
}

/// Open `index` with the first backend in `backends` that works.
pub fn open_with_fallback<O: DeviceOpener>(
    opener: &O,
    index: u32,
    backends: &[Backend],
) -> OpenOutcome<O::Device> {
    let mut last = DeviceCandidate::new(index, Backend::Default).descriptor();

    for candidate in candidates(index, backends) {
        let descriptor = candidate.descriptor();
        if let Some(device) = try_candidate(opener, candidate) {
            return OpenOutcome::Opened { device, descriptor };
        }
        last = descriptor;
    }

    OpenOutcome::Failed { descriptor: last }
}

/// Indices `0..=max_index` that open with `backend`. No handle is kept open.
pub fn enumerate_devices<O: DeviceOpener>(
    opener: &O,
    max_index: u32,
    backend: Backend,
) -> Vec<u32> {
    let available: Vec<u32> = (0..=max_index)
        .filter(|&index| {
            let candidate = DeviceCandidate::new(index, backend);
            match try_candidate(opener, candidate) {
                Some(mut device) => {
                    device.release();
                    true
                }
                None => false,
            }
        })
        .collect();

    debug!(?available, "camera enumeration finished");
    available
}

/// One line of a camera diagnostic run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub descriptor: String,
    pub opened: bool,
    pub read_ok: bool,
}

/// Try every index in `0..=max_index` with every backend, reading one frame
/// from each device that opens. Every device is released afterwards.
pub fn diagnose<O: DeviceOpener>(
    opener: &O,
    max_index: u32,
    backends: &[Backend],
) -> Vec<ProbeResult> {
    let mut results = Vec::new();

    for index in 0..=max_index {
        for candidate in candidates(index, backends) {
            let descriptor = candidate.descriptor();
            let (opened, read_ok) = match opener.open(candidate) {
                Ok(mut device) => {
                    let opened = device.is_opened();
                    let read_ok = opened && device.read().is_some();
                    device.release();
                    (opened, read_ok)
                }
                Err(e) => {
                    debug!(%descriptor, error = %e, "diagnostic open failed");
                    (false, false)
                }
            };
            debug!(%descriptor, opened, read_ok, "diagnostic probe");
            results.push(ProbeResult {
                descriptor,
                opened,
                read_ok,
            });
        }
    }

    results
}

/// Parse a device index from user input: `"2"` or `"/dev/video2"`.
pub fn parse_device_index(input: &str) -> Result<u32> {
    let trimmed = input.trim();
    if let Ok(index) = trimmed.parse::<u32>() {
        return Ok(index);
    }
    if let Some(stripped) = trimmed.strip_prefix("/dev/video") {
        if !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(index) = stripped.parse::<u32>() {
                return Ok(index);
            }
        }
    }
    Err(Error::InvalidDeviceIndex(input.to_string()))
}

/// Lifecycle of the managed device slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    NoDevice,
    Opening,
    Open,
    Unavailable,
}

/// Result of a frame pull.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameRead {
    Frame(RgbImage),
    NoFrame,
}

impl FrameRead {
    pub fn into_frame(self) -> Option<RgbImage> {
        match self {
            FrameRead::Frame(frame) => Some(frame),
            FrameRead::NoFrame => None,
        }
    }
}

/// Owns at most one open capture device.
pub struct CaptureManager<O: DeviceOpener> {
    opener: O,
    config: AcquisitionConfig,
    state: DeviceState,
    device: Option<O::Device>,
    descriptor: Option<String>,
    resolution_locked: bool,
}

impl<O: DeviceOpener> CaptureManager<O> {
    pub fn new(opener: O, config: AcquisitionConfig) -> Self {
        Self {
            opener,
            config,
            state: DeviceState::NoDevice,
            device: None,
            descriptor: None,
            resolution_locked: false,
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DeviceState::Open
    }

    /// Descriptor of the open device, or of the last failed attempt.
    pub fn descriptor(&self) -> Option<&str> {
        self.descriptor.as_deref()
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Indices that currently open with the probe backend.
    pub fn available_devices(&self) -> Vec<u32> {
        enumerate_devices(
            &self.opener,
            self.config.max_probe_index,
            self.config.probe_backend,
        )
    }

    /// Close the current device, then open `index`.
    ///
    /// On failure the slot is left empty and [`Error::DeviceUnavailable`]
    /// carries the last attempted descriptor.
    pub fn select(&mut self, index: u32) -> Result<String> {
        self.close();
        self.state = DeviceState::Opening;

        match open_with_fallback(&self.opener, index, &self.config.backends) {
            OpenOutcome::Opened {
                mut device,
                descriptor,
            } => {
                let (width, height) = (self.config.width, self.config.height);
                self.resolution_locked = device.set_resolution(width, height);
                if !self.resolution_locked {
                    debug!(%descriptor, width, height, "camera rejected requested resolution");
                }
                info!(%descriptor, "camera opened");
                self.device = Some(device);
                self.descriptor = Some(descriptor.clone());
                self.state = DeviceState::Open;
                Ok(descriptor)
            }
            OpenOutcome::Failed { descriptor } => {
                warn!(%descriptor, "camera unavailable");
                self.descriptor = Some(descriptor.clone());
                self.state = DeviceState::Unavailable;
                Err(Error::DeviceUnavailable { descriptor })
            }
        }
    }

    /// Release the open device, if any. Closing an empty slot does nothing.
    pub fn close(&mut self) {
        if let Some(mut device) = self.device.take() {
            device.release();
            self.resolution_locked = false;
            self.state = DeviceState::Unavailable;
            debug!(descriptor = ?self.descriptor, "camera closed");
        }
    }

    /// Pull the next frame. A failed read leaves the device open.
    ///
    /// When the device accepted the requested resolution but delivers
    /// another size with the same aspect ratio, the frame is resized to the
    /// requested size. Frames with a different aspect ratio pass through
    /// unchanged.
    pub fn read_frame(&mut self) -> FrameRead {
        let Some(device) = self.device.as_mut() else {
            return FrameRead::NoFrame;
        };

        let Some(frame) = device.read() else {
            debug!(descriptor = ?self.descriptor, "camera returned no frame");
            return FrameRead::NoFrame;
        };

        let (width, height) = (self.config.width, self.config.height);
        if self.resolution_locked
            && frame.dimensions() != (width, height)
            && same_aspect(frame.dimensions(), (width, height))
        {
            return FrameRead::Frame(imageops::resize(
                &frame,
                width,
                height,
                imageops::FilterType::Triangle,
            ));
        }

        FrameRead::Frame(frame)
    }
}

/// Frames are only rescaled when both axes scale by the same factor, so
/// measured distances keep their proportions.
fn same_aspect((w, h): (u32, u32), (target_w, target_h): (u32, u32)) -> bool {
    u64::from(w) * u64::from(target_h) == u64::from(h) * u64::from(target_w)
}

impl<O: DeviceOpener> Drop for CaptureManager<O> {
    fn drop(&mut self) {
        self.close();
    }
}
