//! OpenCV-backed camera, image conversions, Hough circle transform and
//! highgui windows.

use anyhow::{Context, Result, anyhow};
use image::{GrayImage, RgbImage};
use opencv::{
    core::{self, Mat, Point, Scalar, Size, Vec3f, Vector},
    highgui, imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use tracing::{debug, info, warn};

use crate::backend::{CaptureSource, DisplaySink, key_to_char};
use crate::config::DetectionParameters;
use crate::detection::{CircleDetector, to_candidates};
use crate::error::TrackerError;
use crate::models::CircleCandidate;
use crate::overlay::{self, Canvas, Color, Overlay};

/// Camera opened through `videoio`; released on drop
pub struct OpenCvCapture {
    cap: VideoCapture,
    index: i32,
    frame: Mat,
}

impl OpenCvCapture {
    pub fn open(index: i32) -> Result<Self, TrackerError> {
        let cap = match VideoCapture::new(index, videoio::CAP_ANY) {
            Ok(cap) => cap,
            Err(err) => {
                warn!(index, %err, "camera backend refused to open device");
                return Err(TrackerError::Initialization { index });
            }
        };

        if !cap.is_opened().unwrap_or(false) {
            return Err(TrackerError::Initialization { index });
        }

        info!(index, "camera opened");
        Ok(Self {
            cap,
            index,
            frame: Mat::default(),
        })
    }
}

impl CaptureSource for OpenCvCapture {
    fn read_frame(&mut self) -> Result<RgbImage, TrackerError> {
        let grabbed = self.cap.read(&mut self.frame).map_err(|err| {
            debug!(index = self.index, %err, "camera read failed");
            TrackerError::FrameAcquisition
        })?;

        if !grabbed || self.frame.rows() <= 0 || self.frame.cols() <= 0 {
            return Err(TrackerError::FrameAcquisition);
        }

        Ok(bgr_mat_to_rgb(&self.frame)?)
    }
}

impl Drop for OpenCvCapture {
    fn drop(&mut self) {
        match self.cap.release() {
            Ok(()) => debug!(index = self.index, "camera released"),
            Err(err) => warn!(index = self.index, %err, "failed to release camera"),
        }
    }
}

/// `HOUGH_GRADIENT` circle transform
#[derive(Debug, Default, Clone, Copy)]
pub struct HoughCircleDetector;

impl CircleDetector for HoughCircleDetector {
    fn detect(
        &self,
        gray: &GrayImage,
        params: &DetectionParameters,
    ) -> Result<Vec<CircleCandidate>, TrackerError> {
        let src = gray_to_mat(gray)?;
        let mut circles = Vector::<Vec3f>::new();
        imgproc::hough_circles(
            &src,
            &mut circles,
            imgproc::HOUGH_GRADIENT,
            params.dp,
            params.min_dist,
            params.param1,
            params.param2,
            params.min_radius,
            params.max_radius,
        )
        .context("Hough circle transform failed")?;

        Ok(to_candidates(circles.iter().map(|circle| circle.0)))
    }
}

/// highgui windows; every window this sink opened is destroyed on drop
#[derive(Default)]
pub struct HighGuiDisplay {
    windows: Vec<String>,
}

impl HighGuiDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_window(&mut self, window: &str) -> Result<()> {
        if !self.windows.iter().any(|name| name == window) {
            highgui::named_window(window, highgui::WINDOW_AUTOSIZE)?;
            self.windows.push(window.to_string());
        }
        Ok(())
    }
}

impl DisplaySink for HighGuiDisplay {
    fn show(&mut self, window: &str, frame: &RgbImage, overlay: &Overlay) -> Result<()> {
        self.ensure_window(window)?;
        let mut mat = rgb_to_bgr_mat(frame)?;
        overlay::render(overlay, &mut mat)?;
        highgui::imshow(window, &mat)?;
        Ok(())
    }

    fn show_channels(&mut self, window: &str, image: &RgbImage) -> Result<()> {
        self.ensure_window(window)?;
        let mat = rgb_to_mat(image)?;
        highgui::imshow(window, &mat)?;
        Ok(())
    }

    fn poll_key(&mut self, wait_ms: i32) -> Result<Option<char>> {
        // wait_key(0) would block forever
        let code = highgui::wait_key(wait_ms.max(1))?;
        Ok(key_to_char(code))
    }

    fn wait_for_key(&mut self) -> Result<Option<char>> {
        let code = highgui::wait_key(0)?;
        Ok(key_to_char(code))
    }
}

impl Drop for HighGuiDisplay {
    fn drop(&mut self) {
        if self.windows.is_empty() {
            return;
        }
        match highgui::destroy_all_windows() {
            Ok(()) => debug!(count = self.windows.len(), "windows closed"),
            Err(err) => warn!(%err, "failed to close windows"),
        }
    }
}

impl Canvas for Mat {
    fn circle(&mut self, center: (i32, i32), radius: i32, color: Color, thickness: i32) -> Result<()> {
        imgproc::circle(
            self,
            Point::new(center.0, center.1),
            radius,
            to_scalar(color),
            thickness,
            imgproc::LINE_8,
            0,
        )?;
        Ok(())
    }

    fn rectangle(
        &mut self,
        top_left: (i32, i32),
        bottom_right: (i32, i32),
        color: Color,
        thickness: i32,
    ) -> Result<()> {
        imgproc::rectangle_points(
            self,
            Point::new(top_left.0, top_left.1),
            Point::new(bottom_right.0, bottom_right.1),
            to_scalar(color),
            thickness,
            imgproc::LINE_8,
            0,
        )?;
        Ok(())
    }

    fn text(&mut self, text: &str, origin: (i32, i32), scale: f64, color: Color, thickness: i32) -> Result<()> {
        imgproc::put_text(
            self,
            text,
            Point::new(origin.0, origin.1),
            imgproc::FONT_HERSHEY_SIMPLEX,
            scale,
            to_scalar(color),
            thickness,
            imgproc::LINE_8,
            false,
        )?;
        Ok(())
    }
}

/// OpenCV scalars are BGR ordered
fn to_scalar(color: Color) -> Scalar {
    Scalar::new(color.b as f64, color.g as f64, color.r as f64, 0.0)
}

/// `COLOR_BGR2GRAY` on the frame
pub fn to_grayscale(frame: &RgbImage) -> Result<GrayImage> {
    let bgr = rgb_to_bgr_mat(frame)?;
    let mut gray = Mat::default();
    imgproc::cvt_color_def(&bgr, &mut gray, imgproc::COLOR_BGR2GRAY)?;
    mat_to_gray(&gray)
}

/// Square Gaussian kernel; sigma 0 lets OpenCV derive it from the kernel size
pub fn gaussian_blur(gray: &GrayImage, kernel_size: i32) -> Result<GrayImage> {
    let src = gray_to_mat(gray)?;
    let mut blurred = Mat::default();
    imgproc::gaussian_blur_def(&src, &mut blurred, Size::new(kernel_size, kernel_size), 0.0)?;
    mat_to_gray(&blurred)
}

/// `INTER_AREA` resize to `width / divisor` by `height / divisor`, never below one pixel
pub fn downscale(img: &RgbImage, divisor: u32) -> Result<RgbImage> {
    let divisor = divisor.max(1);
    let (width, height) = img.dimensions();
    let size = Size::new((width / divisor).max(1) as i32, (height / divisor).max(1) as i32);

    let src = rgb_to_mat(img)?;
    let mut resized = Mat::default();
    imgproc::resize(&src, &mut resized, size, 0.0, 0.0, imgproc::INTER_AREA)?;
    mat_to_rgb(&resized)
}

/// `COLOR_BGR2HSV`; channels of the result hold `(h, s, v)` with `h` in `0..180`
pub fn to_hsv(img: &RgbImage) -> Result<RgbImage> {
    let bgr = rgb_to_bgr_mat(img)?;
    let mut hsv = Mat::default();
    imgproc::cvt_color_def(&bgr, &mut hsv, imgproc::COLOR_BGR2HSV)?;
    mat_to_rgb(&hsv)
}

fn bgr_mat_to_rgb(mat: &Mat) -> Result<RgbImage> {
    let mut rgb = Mat::default();
    imgproc::cvt_color_def(mat, &mut rgb, imgproc::COLOR_BGR2RGB)?;
    mat_to_rgb(&rgb)
}

fn rgb_to_bgr_mat(img: &RgbImage) -> Result<Mat> {
    let rgb = rgb_to_mat(img)?;
    let mut bgr = Mat::default();
    imgproc::cvt_color_def(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR)?;
    Ok(bgr)
}

/// Channels are copied as stored, no reordering
fn rgb_to_mat(img: &RgbImage) -> Result<Mat> {
    let (width, height) = img.dimensions();
    mat_from_bytes(width, height, core::CV_8UC3, img.as_raw())
}

fn gray_to_mat(img: &GrayImage) -> Result<Mat> {
    let (width, height) = img.dimensions();
    mat_from_bytes(width, height, core::CV_8UC1, img.as_raw())
}

fn mat_from_bytes(width: u32, height: u32, typ: i32, bytes: &[u8]) -> Result<Mat> {
    let mut mat = Mat::new_rows_cols_with_default(height as i32, width as i32, typ, Scalar::all(0.0))?;
    let dst = mat.data_bytes_mut()?;
    if dst.len() != bytes.len() {
        return Err(anyhow!("image buffer holds {} bytes, matrix needs {}", bytes.len(), dst.len()));
    }
    dst.copy_from_slice(bytes);
    Ok(mat)
}

fn mat_to_rgb(mat: &Mat) -> Result<RgbImage> {
    let bytes = mat_bytes(mat, core::CV_8UC3)?;
    RgbImage::from_raw(mat.cols() as u32, mat.rows() as u32, bytes.to_vec())
        .ok_or_else(|| anyhow!("frame buffer does not match its dimensions"))
}

fn mat_to_gray(mat: &Mat) -> Result<GrayImage> {
    let bytes = mat_bytes(mat, core::CV_8UC1)?;
    GrayImage::from_raw(mat.cols() as u32, mat.rows() as u32, bytes.to_vec())
        .ok_or_else(|| anyhow!("frame buffer does not match its dimensions"))
}

fn mat_bytes(mat: &Mat, expected: i32) -> Result<&[u8]> {
    if mat.typ() != expected {
        return Err(anyhow!("expected matrix type {}, got {}", expected, mat.typ()));
    }
    mat.data_bytes().context("frame buffer is not continuous")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn hsv_uses_opencv_hue_range() {
        let mut img = RgbImage::new(3, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));
        img.put_pixel(2, 0, Rgb([0, 0, 255]));

        let hsv = to_hsv(&img).unwrap();
        assert_eq!(hsv.get_pixel(0, 0).0, [0, 255, 255]);
        assert_eq!(hsv.get_pixel(1, 0).0, [60, 255, 255]);
        assert_eq!(hsv.get_pixel(2, 0).0, [120, 255, 255]);
    }

    #[test]
    fn gray_pixels_have_no_saturation() {
        let hsv = to_hsv(&RgbImage::from_pixel(4, 4, Rgb([128, 128, 128]))).unwrap();
        assert!(hsv.pixels().all(|p| p.0 == [0, 0, 128]));
    }

    #[test]
    fn downscale_divides_dimensions() {
        let small = downscale(&RgbImage::new(640, 481), 3).unwrap();
        assert_eq!(small.dimensions(), (213, 160));

        let tiny = downscale(&RgbImage::new(2, 2), 3).unwrap();
        assert_eq!(tiny.dimensions(), (1, 1));
    }

    #[test]
    fn area_downscale_averages_blocks() {
        let img = RgbImage::from_fn(6, 3, |x, _| if x % 2 == 0 { Rgb([0, 0, 0]) } else { Rgb([90, 90, 90]) });
        let small = downscale(&img, 3).unwrap();
        assert_eq!(small.dimensions(), (2, 1));
        assert_eq!(small.get_pixel(0, 0).0, [30, 30, 30]);
        assert_eq!(small.get_pixel(1, 0).0, [60, 60, 60]);
    }

    #[test]
    fn blur_keeps_uniform_image_uniform() {
        let gray = GrayImage::from_pixel(32, 32, Luma([90]));
        let blurred = gaussian_blur(&gray, 9).unwrap();
        assert!(blurred.pixels().all(|p| p[0] == 90));
    }

    #[test]
    fn grayscale_matches_frame_size() {
        let gray = to_grayscale(&RgbImage::from_pixel(64, 48, Rgb([255, 255, 255]))).unwrap();
        assert_eq!(gray.dimensions(), (64, 48));
        assert_eq!(gray.get_pixel(0, 0)[0], 255);
    }
}
