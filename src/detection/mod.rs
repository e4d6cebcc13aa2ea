pub mod circles;
#[cfg(feature = "opencv")]
pub mod steps;

use std::sync::Arc;

use image::{DynamicImage, GrayImage};

use crate::config::DetectionParameters;
use crate::error::TrackerError;
use crate::models::CircleCandidate;
use crate::pipeline::Pipeline;

pub use circles::{first_candidate, to_candidates};

/// Finds circles in a preprocessed single-channel frame.
///
/// An empty result is the ordinary "nothing found" case. Candidates come back
/// in whatever order the underlying transform reports them.
pub trait CircleDetector {
    fn detect(
        &self,
        gray: &GrayImage,
        params: &DetectionParameters,
    ) -> Result<Vec<CircleCandidate>, TrackerError>;
}

impl<D: CircleDetector + ?Sized> CircleDetector for Box<D> {
    fn detect(
        &self,
        gray: &GrayImage,
        params: &DetectionParameters,
    ) -> Result<Vec<CircleCandidate>, TrackerError> {
        (**self).detect(gray, params)
    }
}

/// Runs the preprocessing pipeline ahead of circle detection
pub struct FramePreprocessor {
    pipeline: Pipeline,
}

impl FramePreprocessor {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Returns a new gray buffer; `frame` is left untouched
    pub fn preprocess(&self, frame: Arc<DynamicImage>) -> anyhow::Result<GrayImage> {
        let mut output = self.pipeline.run_shared(frame)?;
        let data = output
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Preprocessing produced no image"))?;
        Ok(data.image.into_luma8())
    }
}

/// Grayscale, then the fixed 9x9 Gaussian blur
#[cfg(feature = "opencv")]
pub fn build_preprocessing_pipeline(verbose: bool) -> Pipeline {
    use crate::config::BLUR_KERNEL_SIZE;
    use steps::{GaussianBlurStep, GrayscaleStep};

    Pipeline::new()
        .with_verbose(verbose)
        .add_step(Arc::new(GrayscaleStep))
        .add_step(Arc::new(GaussianBlurStep { kernel_size: BLUR_KERNEL_SIZE }))
}

/// Downscale by `divisor`, then convert to HSV
#[cfg(feature = "opencv")]
pub fn build_still_pipeline(divisor: u32, verbose: bool) -> Pipeline {
    use steps::{DownscaleStep, HsvConversionStep};

    Pipeline::new()
        .with_verbose(verbose)
        .add_step_boxed(Box::new(DownscaleStep { divisor }))
        .add_step_boxed(Box::new(HsvConversionStep))
}
