use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("failed to open camera with index {index}")]
    Initialization { index: i32 },
    #[error("failed to read a frame from the camera")]
    FrameAcquisition,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}
