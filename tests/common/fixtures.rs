use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use circlecam::backend::{CaptureSource, DisplaySink};
use circlecam::config::DetectionParameters;
use circlecam::detection::{CircleDetector, FramePreprocessor};
use circlecam::overlay::Color;
use circlecam::{CircleCandidate, Overlay, Pipeline, Shape, TrackerError};
use image::{Rgb, RgbImage};

/// Counters and recordings shared between a test and the fakes it hands out.
#[derive(Clone, Default)]
pub struct Probe {
    pub capture_releases: Rc<Cell<u32>>,
    pub display_closes: Rc<Cell<u32>>,
    pub frames_read: Rc<Cell<u32>>,
    pub shown: Rc<RefCell<Vec<(String, (u32, u32), Overlay)>>>,
    pub detect_params: Rc<RefCell<Vec<DetectionParameters>>>,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlays(&self) -> Vec<Overlay> {
        self.shown.borrow().iter().map(|(_, _, overlay)| overlay.clone()).collect()
    }
}

/// Questions the tests ask about a planned overlay
pub trait OverlayExt {
    fn zone_color(&self) -> Option<Color>;
    fn label(&self) -> Option<&str>;
    fn circle_count(&self) -> usize;
}

impl OverlayExt for Overlay {
    fn zone_color(&self) -> Option<Color> {
        self.shapes.iter().find_map(|shape| match shape {
            Shape::Rectangle { color, .. } => Some(*color),
            _ => None,
        })
    }

    fn label(&self) -> Option<&str> {
        self.shapes.iter().find_map(|shape| match shape {
            Shape::Label { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    fn circle_count(&self) -> usize {
        self.shapes
            .iter()
            .filter(|shape| matches!(shape, Shape::Circle { .. }))
            .count()
    }
}

/// Preprocessor without vision steps: the frame only goes through gray conversion
pub fn plain_preprocessor() -> FramePreprocessor {
    FramePreprocessor::new(Pipeline::new())
}

/// Plain gray 640x480 frame
pub fn vga_frame() -> RgbImage {
    RgbImage::from_pixel(640, 480, Rgb([90, 90, 90]))
}

/// Hands out queued frames, then fails like an unplugged camera
pub struct FakeCapture {
    frames: VecDeque<RgbImage>,
    probe: Probe,
}

impl FakeCapture {
    pub fn new(frames: Vec<RgbImage>, probe: &Probe) -> Self {
        Self {
            frames: frames.into(),
            probe: probe.clone(),
        }
    }
}

impl CaptureSource for FakeCapture {
    fn read_frame(&mut self) -> Result<RgbImage, TrackerError> {
        let frame = self.frames.pop_front().ok_or(TrackerError::FrameAcquisition)?;
        self.probe.frames_read.set(self.probe.frames_read.get() + 1);
        Ok(frame)
    }
}

impl Drop for FakeCapture {
    fn drop(&mut self) {
        self.probe.capture_releases.set(self.probe.capture_releases.get() + 1);
    }
}

/// Returns one scripted detection list per frame, then nothing
pub struct FakeDetector {
    responses: RefCell<VecDeque<Vec<CircleCandidate>>>,
    probe: Probe,
}

impl FakeDetector {
    pub fn new(responses: Vec<Vec<CircleCandidate>>, probe: &Probe) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            probe: probe.clone(),
        }
    }
}

impl CircleDetector for FakeDetector {
    fn detect(
        &self,
        _gray: &image::GrayImage,
        params: &DetectionParameters,
    ) -> Result<Vec<CircleCandidate>, TrackerError> {
        self.probe.detect_params.borrow_mut().push(*params);
        Ok(self.responses.borrow_mut().pop_front().unwrap_or_default())
    }
}

/// Records what is shown and replays scripted key presses
pub struct FakeDisplay {
    keys: VecDeque<Option<char>>,
    fail_on_show: bool,
    probe: Probe,
}

impl FakeDisplay {
    pub fn new(keys: Vec<Option<char>>, probe: &Probe) -> Self {
        Self {
            keys: keys.into(),
            fail_on_show: false,
            probe: probe.clone(),
        }
    }

    pub fn failing(probe: &Probe) -> Self {
        Self {
            keys: VecDeque::new(),
            fail_on_show: true,
            probe: probe.clone(),
        }
    }
}

impl DisplaySink for FakeDisplay {
    fn show(&mut self, window: &str, frame: &RgbImage, overlay: &Overlay) -> anyhow::Result<()> {
        if self.fail_on_show {
            anyhow::bail!("window system went away");
        }
        self.probe
            .shown
            .borrow_mut()
            .push((window.to_string(), frame.dimensions(), overlay.clone()));
        Ok(())
    }

    fn show_channels(&mut self, window: &str, image: &RgbImage) -> anyhow::Result<()> {
        self.show(window, image, &Overlay::empty())
    }

    fn poll_key(&mut self, _wait_ms: i32) -> anyhow::Result<Option<char>> {
        Ok(self.keys.pop_front().flatten())
    }

    fn wait_for_key(&mut self) -> anyhow::Result<Option<char>> {
        Ok(self.keys.pop_front().flatten())
    }
}

impl Drop for FakeDisplay {
    fn drop(&mut self) {
        self.probe.display_closes.set(self.probe.display_closes.get() + 1);
    }
}
