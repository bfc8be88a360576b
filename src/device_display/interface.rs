use crate::frame_encoder::Canvas;
use std::error::Error;
use std::sync::mpsc::Receiver;

/// User intents coming out of a display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartCamera,
    StopCamera,
    Capture,
    EnableAutoCapture,
    DisableAutoCapture,
    ToggleAutoCapture,
    Quit,
}

/// Everything a display needs to draw one frame of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionView {
    pub emotion_label: String,
    pub error_message: Option<String>,
    pub debug_lines: Vec<String>,
    pub image: Option<Canvas>,
    pub camera_active: bool,
    pub auto_capture_enabled: bool,
    pub is_loading: bool,
    pub consecutive_failures: u32,
}

pub trait DeviceDisplay: Send {
    fn render(&mut self, view: &SessionView) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Hands out the command stream. Only the first call gets it.
    fn commands(&mut self) -> Option<Receiver<Command>>;
}
