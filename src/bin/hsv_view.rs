use clap::Parser;
use std::path::PathBuf;
use tracing::error;

use circlecam::backend::opencv::HighGuiDisplay;
use circlecam::config::{DEFAULT_DOWNSCALE_DIVISOR, DEFAULT_IMAGE_PATH};
use circlecam::logging;
use circlecam::still::{StillImageViewer, load_image};

#[derive(Parser)]
#[command(name = "hsv-view")]
#[command(about = "Show a downscaled image next to its HSV rendering")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE", default_value = DEFAULT_IMAGE_PATH)]
    image_path: PathBuf,

    /// Divide width and height by this factor before display
    #[arg(long, default_value_t = DEFAULT_DOWNSCALE_DIVISOR)]
    divisor: u32,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Save each step's output to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    logging::init(args.verbose);

    let img = match load_image(&args.image_path) {
        Ok(img) => img,
        Err(err) => {
            error!(path = %args.image_path.display(), "image not found or could not be loaded: {err:#}");
            return Ok(());
        }
    };

    let viewer = StillImageViewer::new()
        .with_divisor(args.divisor)
        .with_verbose(args.verbose)
        .with_debug(args.debug_out);

    let views = viewer.prepare(img)?;
    viewer.show(&views, HighGuiDisplay::new())
}
