mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from circlecam for tests
pub use circlecam::{
    CircleCandidate, CircleTracker, DetectionParameters, Overlay, StopReason, TargetZone,
    TrackerConfig, TrackerError, TrackerState,
};
