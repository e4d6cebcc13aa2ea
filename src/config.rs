/// Side of the Gaussian kernel used before circle detection; sigma is derived from it.
pub const BLUR_KERNEL_SIZE: i32 = 9;

pub const DETECTOR_WINDOW: &str = "Detector";
pub const ORIGINAL_WINDOW: &str = "Original (BGR) - Resized";
pub const HSV_WINDOW: &str = "HSV Image - Resized";

pub const DEFAULT_IMAGE_PATH: &str = "images/variant-3.jpeg";
pub const DEFAULT_DOWNSCALE_DIVISOR: u32 = 3;

/// Hough gradient transform settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParameters {
    /// Inverse ratio of accumulator resolution to image resolution
    pub dp: f64,
    /// Minimum distance between detected centers
    pub min_dist: f64,
    /// Upper threshold handed to the internal Canny edge detector
    pub param1: f64,
    /// Accumulator threshold for circle centers
    pub param2: f64,
    pub min_radius: i32,
    pub max_radius: i32,
}

impl Default for DetectionParameters {
    fn default() -> Self {
        Self {
            dp: 1.5,
            min_dist: 50.0,
            param1: 50.0,
            param2: 25.0,
            min_radius: 20,
            max_radius: 300,
        }
    }
}

/// Settings for the live tracker
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub camera_index: i32,
    pub target_square_size: u32,
    pub detection: DetectionParameters,
    pub window_name: String,
    pub quit_key: char,
    /// How long to wait for a key press after each frame
    pub key_poll_ms: i32,
    pub verbose: bool,
}

impl TrackerConfig {
    pub fn new(camera_index: i32, target_square_size: u32) -> Self {
        Self {
            camera_index,
            target_square_size,
            ..Self::default()
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            target_square_size: 200,
            detection: DetectionParameters::default(),
            window_name: DETECTOR_WINDOW.to_string(),
            quit_key: 'q',
            key_poll_ms: 1,
            verbose: false,
        }
    }
}
