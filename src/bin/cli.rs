//! CLI application for facial trait analysis.
//!
//! Usage:
//!   face-traits analyze <image> --landmarks faces.json           # Human-readable output
//!   face-traits analyze <image> --landmarks faces.json --json    # JSON output
//!   face-traits analyze <image> --landmarks faces.json -o out.png
//!   face-traits devices                                          # needs `opencv`
//!   face-traits capture /dev/video0 --landmarks faces.json       # needs `opencv`
//!   face-traits diagnose                                         # needs `opencv`

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use face_traits::session::analyze_still;
use face_traits::{
    AnalysisReport, Config, DetectorHandle, LandmarkDetector, RecordedLandmarks, RgbImage,
    TickOutput,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "face-traits")]
#[command(author, version, about = "Facial landmark measurements and trait summaries", long_about = None)]
struct Args {
    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse a still image using recorded landmarks
    Analyze {
        /// Input image file
        image: PathBuf,

        /// Recorded landmarks (JSON: {"faces": [[{"x": .., "y": ..}, ...]]})
        #[arg(short, long)]
        landmarks: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,

        /// Write the image with landmark markers to this file
        #[arg(short = 'o', long)]
        overlay: Option<PathBuf>,
    },

    /// List camera indices that can be opened
    #[cfg(feature = "opencv")]
    Devices {
        /// Highest index to probe
        #[arg(long)]
        max_index: Option<u32>,
    },

    /// Try every camera index with every backend and read one frame
    #[cfg(feature = "opencv")]
    Diagnose {
        /// Highest index to probe
        #[arg(long, default_value = "3")]
        max_index: u32,
    },

    /// Grab a frame from a camera and analyse it
    #[cfg(feature = "opencv")]
    Capture {
        /// Camera index or device path (e.g. 0 or /dev/video0)
        device: String,

        /// Recorded landmarks to report against the captured frame
        #[arg(short, long)]
        landmarks: Option<PathBuf>,

        /// Ticks to wait for the first frame
        #[arg(long, default_value = "30")]
        max_ticks: u32,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,

        /// Write the captured frame with landmark markers to this file
        #[arg(short = 'o', long)]
        overlay: Option<PathBuf>,
    },
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct Output<'a> {
    source: String,
    width: u32,
    height: u32,
    status: String,
    report: Option<&'a AnalysisReport>,
    text: Vec<String>,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> face_traits::Result<()> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match &args.command {
        Command::Analyze {
            image,
            landmarks,
            json,
            overlay,
        } => {
            let detector = RecordedLandmarks::load(landmarks, config.detector)?;
            analyze(image, detector, *json, overlay.as_deref())
        }
        #[cfg(feature = "opencv")]
        Command::Devices { max_index } => {
            use face_traits::capture::enumerate_devices;
            use face_traits::opencv_backend::OpenCvOpener;

            let acquisition = &config.acquisition;
            let max_index = max_index.unwrap_or(acquisition.max_probe_index);
            let devices = enumerate_devices(&OpenCvOpener, max_index, acquisition.probe_backend);
            if devices.is_empty() {
                println!("No cameras found.");
            }
            for index in devices {
                println!("{}", index);
            }
            Ok(())
        }
        #[cfg(feature = "opencv")]
        Command::Diagnose { max_index } => {
            use face_traits::capture::diagnose;
            use face_traits::opencv_backend::OpenCvOpener;

            for probe in diagnose(&OpenCvOpener, *max_index, &config.acquisition.backends) {
                println!(
                    "{} -> opened={}, read_ok={}",
                    probe.descriptor, probe.opened, probe.read_ok
                );
            }
            Ok(())
        }
        #[cfg(feature = "opencv")]
        Command::Capture {
            device,
            landmarks,
            max_ticks,
            json,
            overlay,
        } => {
            let detector = match landmarks {
                Some(path) => RecordedLandmarks::load(path, config.detector)?,
                None => RecordedLandmarks::new(Vec::new(), config.detector),
            };
            capture(device, detector, config, *max_ticks, *json, overlay.as_deref())
        }
    }
}

fn analyze<D: LandmarkDetector>(
    path: &Path,
    detector: D,
    json: bool,
    overlay: Option<&Path>,
) -> face_traits::Result<()> {
    let image: RgbImage = image::open(path)?.to_rgb8();

    let mut detector = DetectorHandle::new(detector);
    let output = analyze_still(&mut detector, image);
    detector.release();

    print_output(&path.display().to_string(), &output, json, overlay)
}

#[cfg(feature = "opencv")]
fn capture<D: LandmarkDetector>(
    device: &str,
    detector: D,
    config: Config,
    max_ticks: u32,
    json: bool,
    overlay: Option<&Path>,
) -> face_traits::Result<()> {
    use face_traits::capture::parse_device_index;
    use face_traits::opencv_backend::OpenCvOpener;
    use face_traits::{Session, Status};

    let index = parse_device_index(device)?;
    let interval = config.tick_interval();
    let mut session = Session::new(OpenCvOpener, detector, config);
    let descriptor = session.select_device(index)?;

    // Cameras often return nothing for the first few reads.
    let mut output = session.tick();
    for _ in 1..max_ticks {
        if matches!(output.status, Status::Connected { .. }) {
            break;
        }
        std::thread::sleep(interval);
        output = session.tick();
    }
    session.shutdown();

    print_output(&descriptor, &output, json, overlay)
}

fn print_output(
    source: &str,
    output: &TickOutput,
    json: bool,
    overlay: Option<&Path>,
) -> face_traits::Result<()> {
    if let Some(overlay) = overlay {
        output.frame.save(overlay)?;
    }

    let text = if json {
        let (width, height) = output.frame.dimensions();
        let doc = Output {
            source: source.to_string(),
            width,
            height,
            status: output.status.to_string(),
            report: output.report.as_ref(),
            text: output
                .report
                .as_ref()
                .map(AnalysisReport::lines)
                .unwrap_or_default(),
        };
        serde_json::to_string_pretty(&doc)?
    } else {
        format_human_readable(source, output)
    };

    println!("{}", text);
    Ok(())
}

fn format_human_readable(source: &str, output: &TickOutput) -> String {
    let mut s = String::new();
    s.push_str(&format!("Source: {}\n", source));
    s.push_str(&format!("{}\n", output.status));
    if let Some(report) = &output.report {
        s.push('\n');
        s.push_str(&report.to_string());
    }
    s
}
