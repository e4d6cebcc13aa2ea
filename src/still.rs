//! One-shot viewer: downscale a still image and show it next to its HSV rendering.

use std::path::{Path, PathBuf};

use anyhow::Result;
use image::{DynamicImage, ImageReader, RgbImage};
use tracing::info;

use crate::backend::DisplaySink;
use crate::config::{DEFAULT_DOWNSCALE_DIVISOR, HSV_WINDOW, ORIGINAL_WINDOW};
use crate::overlay::Overlay;

/// The two renderings the viewer shows
pub struct StillViews {
    pub resized: RgbImage,
    /// Channels hold `(h, s, v)`
    pub hsv: RgbImage,
}

pub struct StillImageViewer {
    pub divisor: u32,
    pub verbose: bool,
    pub debug_out: Option<PathBuf>,
}

impl StillImageViewer {
    pub fn new() -> Self {
        Self {
            divisor: DEFAULT_DOWNSCALE_DIVISOR,
            verbose: false,
            debug_out: None,
        }
    }

    pub fn with_divisor(mut self, divisor: u32) -> Self {
        self.divisor = divisor;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_debug(mut self, debug_out: Option<PathBuf>) -> Self {
        self.debug_out = debug_out;
        self
    }

    /// Downscale, then convert to HSV
    #[cfg(feature = "opencv")]
    pub fn prepare(&self, img: DynamicImage) -> Result<StillViews> {
        let mut pipeline = crate::detection::build_still_pipeline(self.divisor, self.verbose);
        if let Some(dir) = &self.debug_out {
            pipeline = pipeline.with_debug(dir.clone())?;
        }

        let mut stages = pipeline.run_stages(img)?.into_iter();
        let mut next_image = |what: &str| {
            stages
                .next()
                .and_then(|mut data| data.pop())
                .map(|data| data.image)
                .ok_or_else(|| anyhow::anyhow!("{} produced no image", what))
        };
        let resized = next_image("Downscale")?;
        let hsv = next_image("HSV conversion")?;

        Ok(StillViews {
            resized: resized.into_rgb8(),
            hsv: hsv.into_rgb8(),
        })
    }

    /// Show both views and block until a key is pressed
    pub fn show<S: DisplaySink>(&self, views: &StillViews, mut display: S) -> Result<()> {
        let none = Overlay::empty();
        display.show(ORIGINAL_WINDOW, &views.resized, &none)?;
        display.show_channels(HSV_WINDOW, &views.hsv)?;
        display.wait_for_key()?;
        Ok(())
    }
}

impl Default for StillImageViewer {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an image file
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let img = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
    info!(path = %path.display(), width = img.width(), height = img.height(), "image loaded");
    Ok(img)
}
