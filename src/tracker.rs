use std::sync::Arc;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::backend::{CaptureSource, DisplaySink};
use crate::config::TrackerConfig;
use crate::detection::{CircleDetector, FramePreprocessor, first_candidate};
use crate::error::TrackerError;
use crate::models::TargetZone;
use crate::overlay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QuitRequested,
    CaptureFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Running,
    Stopped(StopReason),
}

/// Live circle tracker: capture, detect, annotate, show, repeat
pub struct CircleTracker<C, D> {
    config: TrackerConfig,
    capture: C,
    detector: D,
    preprocessor: FramePreprocessor,
}

impl<C: CaptureSource, D: CircleDetector> CircleTracker<C, D> {
    /// Open the capture device and build the tracker.
    ///
    /// Fails with `TrackerError::Initialization` when the device cannot be
    /// opened; nothing else has been created at that point.
    pub fn open<F>(
        config: TrackerConfig,
        preprocessor: FramePreprocessor,
        detector: D,
        open_capture: F,
    ) -> Result<Self, TrackerError>
    where
        F: FnOnce(i32) -> Result<C, TrackerError>,
    {
        let capture = open_capture(config.camera_index).map_err(|err| match err {
            TrackerError::Initialization { .. } => err,
            other => {
                warn!(error = %other, "capture open failed");
                TrackerError::Initialization { index: config.camera_index }
            }
        })?;

        Ok(Self {
            config,
            capture,
            detector,
            preprocessor,
        })
    }

    /// Run until the quit key or a failed frame read.
    ///
    /// Takes ownership of the tracker and the display so that the capture
    /// device and the windows are dropped exactly once, whichever way the loop
    /// ends. A failed frame read ends the run normally with
    /// `StopReason::CaptureFailed`; other failures are returned as errors.
    pub fn run<S: DisplaySink>(mut self, mut display: S) -> Result<StopReason, TrackerError> {
        info!(
            camera = self.config.camera_index,
            target_size = self.config.target_square_size,
            "tracker running, press '{}' to quit",
            self.config.quit_key
        );

        loop {
            if let TrackerState::Stopped(reason) = self.step(&mut display)? {
                return Ok(reason);
            }
        }
    }

    /// One loop iteration
    pub fn step<S: DisplaySink>(&mut self, display: &mut S) -> Result<TrackerState, TrackerError> {
        let frame = match self.capture.read_frame() {
            Ok(frame) => frame,
            Err(TrackerError::FrameAcquisition) => {
                warn!("failed to read a frame, stopping");
                return Ok(TrackerState::Stopped(StopReason::CaptureFailed));
            }
            Err(err) => return Err(err),
        };

        let (width, height) = frame.dimensions();
        let zone = TargetZone::centered(width, height, self.config.target_square_size);

        let frame = Arc::new(DynamicImage::ImageRgb8(frame));
        let gray = self.preprocessor.preprocess(frame.clone())?;
        let candidates = self.detector.detect(&gray, &self.config.detection)?;
        if self.config.verbose {
            debug!(count = candidates.len(), "circle candidates");
        }
        let candidate = first_candidate(candidates);

        let overlay = overlay::plan(candidate, zone);
        if let Some(circle) = candidate {
            info!(
                x = circle.x,
                y = circle.y,
                radius = circle.radius,
                in_target = overlay.in_target,
                "circle detected"
            );
        }

        let frame = match Arc::try_unwrap(frame) {
            Ok(image) => image.into_rgb8(),
            Err(shared) => shared.to_rgb8(),
        };
        display.show(&self.config.window_name, &frame, &overlay)?;

        let key = display.poll_key(self.config.key_poll_ms)?;
        if key == Some(self.config.quit_key) {
            info!("quit requested, stopping");
            return Ok(TrackerState::Stopped(StopReason::QuitRequested));
        }

        Ok(TrackerState::Running)
    }
}
