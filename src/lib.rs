pub mod backend;
pub mod config;
pub mod detection;
pub mod error;
pub mod logging;
pub mod models;
pub mod overlay;
pub mod pipeline;
pub mod still;
pub mod tracker;

pub use config::{DetectionParameters, TrackerConfig};
pub use error::TrackerError;
pub use models::{CircleCandidate, TargetZone};
pub use overlay::{Overlay, Shape};
pub use pipeline::{Pipeline, PipelineContext, PipelineData, PipelineStep, DebugConfig};
pub use tracker::{CircleTracker, StopReason, TrackerState};
