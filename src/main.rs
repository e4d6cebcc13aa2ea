use anyhow::Context;
use clap::Parser;
use tracing::info;

use circlecam::backend::opencv::{HighGuiDisplay, HoughCircleDetector, OpenCvCapture};
use circlecam::detection::{FramePreprocessor, build_preprocessing_pipeline};
use circlecam::{CircleTracker, StopReason, TrackerConfig, logging};

#[derive(Parser)]
#[command(name = "circlecam")]
#[command(about = "Track circles from a camera and flag when one is centered")]
struct Cli {
    /// Camera device index
    #[arg(long, default_value_t = 0)]
    camera: i32,

    /// Side of the centered target square, in pixels
    #[arg(long, value_name = "PIXELS", default_value_t = 200)]
    target_size: u32,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    logging::init(args.verbose);

    let config = TrackerConfig::new(args.camera, args.target_size).with_verbose(args.verbose);

    let preprocessor = FramePreprocessor::new(build_preprocessing_pipeline(args.verbose));

    let tracker = CircleTracker::open(config, preprocessor, HoughCircleDetector, OpenCvCapture::open)
        .context("camera initialization failed")?;

    match tracker.run(HighGuiDisplay::new()).context("tracker stopped unexpectedly")? {
        StopReason::QuitRequested => info!("stopped by user"),
        StopReason::CaptureFailed => info!("stopped after capture failure"),
    }

    Ok(())
}
