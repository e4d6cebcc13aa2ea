//! Seams to the camera and window system.
//!
//! Implementations own their device or windows and give them back in `Drop`,
//! so whoever holds the value decides when release happens.

#[cfg(feature = "opencv")]
pub mod opencv;

use anyhow::Result;
use image::RgbImage;

use crate::error::TrackerError;
use crate::overlay::Overlay;

/// Produces frames on demand
pub trait CaptureSource {
    /// Blocks until the next frame is available.
    ///
    /// A device that stops delivering frames reports `TrackerError::FrameAcquisition`.
    fn read_frame(&mut self) -> Result<RgbImage, TrackerError>;
}

/// Named windows that show frames and report key presses
pub trait DisplaySink {
    /// Draw `overlay` over a copy of `frame` and show it in `window`
    fn show(&mut self, window: &str, frame: &RgbImage, overlay: &Overlay) -> Result<()>;

    /// Show three 8-bit channels exactly as stored, with no color conversion.
    ///
    /// An OpenCV window reads them as blue, green, red, so an HSV buffer
    /// appears the way `imshow` shows a raw HSV matrix.
    fn show_channels(&mut self, window: &str, image: &RgbImage) -> Result<()>;

    /// Wait at most `wait_ms` milliseconds for a key press
    fn poll_key(&mut self, wait_ms: i32) -> Result<Option<char>>;

    /// Block until any key is pressed
    fn wait_for_key(&mut self) -> Result<Option<char>>;
}

impl<C: CaptureSource + ?Sized> CaptureSource for Box<C> {
    fn read_frame(&mut self) -> Result<RgbImage, TrackerError> {
        (**self).read_frame()
    }
}

impl<D: DisplaySink + ?Sized> DisplaySink for Box<D> {
    fn show(&mut self, window: &str, frame: &RgbImage, overlay: &Overlay) -> Result<()> {
        (**self).show(window, frame, overlay)
    }

    fn show_channels(&mut self, window: &str, image: &RgbImage) -> Result<()> {
        (**self).show_channels(window, image)
    }

    fn poll_key(&mut self, wait_ms: i32) -> Result<Option<char>> {
        (**self).poll_key(wait_ms)
    }

    fn wait_for_key(&mut self) -> Result<Option<char>> {
        (**self).wait_for_key()
    }
}

/// Map a raw key code to a character; negative codes mean no key was pressed
pub fn key_to_char(code: i32) -> Option<char> {
    if code < 0 {
        return None;
    }
    char::from_u32((code & 0xFF) as u32)
}
