use crate::pipeline::{PipelineData, PipelineStep, PipelineContext};
use crate::backend::opencv;
use anyhow::Result;
use image::DynamicImage;
use tracing::debug;

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let gray = opencv::to_grayscale(&item.image.to_rgb8())?;
            result.push(item.with_image(DynamicImage::ImageLuma8(gray)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Apply Gaussian blur with a fixed square kernel
pub struct GaussianBlurStep {
    pub kernel_size: i32,
}

impl PipelineStep for GaussianBlurStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let blurred = opencv::gaussian_blur(&item.image.to_luma8(), self.kernel_size)?;
            result.push(item.with_image(DynamicImage::ImageLuma8(blurred)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Gaussian Blur"
    }
}

/// Shrink each image by an integer divisor
pub struct DownscaleStep {
    pub divisor: u32,
}

impl PipelineStep for DownscaleStep {
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let resized = opencv::downscale(&item.image.to_rgb8(), self.divisor)?;
            if context.verbose {
                debug!(
                    from_width = item.image.width(),
                    from_height = item.image.height(),
                    to_width = resized.width(),
                    to_height = resized.height(),
                    "downscaled image"
                );
            }
            result.push(item.with_image(DynamicImage::ImageRgb8(resized)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Downscale"
    }
}

/// Convert color images to 8-bit HSV
pub struct HsvConversionStep;

impl PipelineStep for HsvConversionStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let hsv = opencv::to_hsv(&item.image.to_rgb8())?;
            result.push(item.with_image(DynamicImage::ImageRgb8(hsv)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "HSV Conversion"
    }
}
