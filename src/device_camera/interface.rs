use image::RgbImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    User,
    #[allow(dead_code)]
    Environment,
}

/// What gets asked of the video device. Sizes are preferences, not guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing: FacingMode,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 640,
            ideal_height: 480,
            facing: FacingMode::User,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("Camera error: {0}")]
    PermissionDenied(String),
    #[error("Camera error: {0}")]
    Unavailable(String),
    #[error("Camera error: {0}")]
    Stream(String),
}

/// One still image from the live stream, at the stream's native resolution.
#[derive(Clone, PartialEq)]
pub struct Frame(pub RgbImage);

impl Frame {
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({}x{})", self.width(), self.height())
    }
}

pub trait DeviceCamera {
    /// Binds a live stream. On failure the camera stays unbound.
    fn start(&self, constraints: &VideoConstraints) -> Result<(), CameraError>;

    /// Halts every track of the bound stream and releases it. Safe to call
    /// repeatedly and when nothing is bound.
    fn stop(&self) -> Result<(), CameraError>;

    fn is_streaming(&self) -> bool;

    /// The frame currently visible on the stream, `None` when no stream is bound.
    fn current_frame(&self) -> Result<Option<Frame>, CameraError>;
}
