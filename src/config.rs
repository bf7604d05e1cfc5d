//! Runtime configuration.
//!
//! Every section has defaults, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! { "acquisition": { "max_probe_index": 3, "mirror": false }, "tick_interval_ms": 30 }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capture::Backend;
use crate::detector::DetectorConfig;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Highest device index probed during enumeration (inclusive).
    pub max_probe_index: u32,
    /// Requested capture width in pixels.
    pub width: u32,
    /// Requested capture height in pixels.
    pub height: u32,
    /// Backends tried, in order, when opening a device.
    pub backends: Vec<Backend>,
    /// Backend used for enumeration probes.
    pub probe_backend: Backend,
    /// Flip captured frames horizontally so the preview acts like a mirror.
    pub mirror: bool,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            max_probe_index: 5,
            width: 640,
            height: 480,
            backends: Backend::platform_priority(),
            probe_backend: Backend::preferred_probe(),
            mirror: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub acquisition: AcquisitionConfig,
    pub detector: DetectorConfig,
    /// Delay between the end of one tick and the start of the next.
    pub tick_interval_ms: u64,
    /// RGB colour of the frame shown while no camera is connected.
    pub placeholder_color: [u8; 3],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            acquisition: AcquisitionConfig::default(),
            detector: DetectorConfig::default(),
            tick_interval_ms: 15,
            placeholder_color: [120, 120, 120],
        }
    }
}

impl Config {
    /// Load a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
