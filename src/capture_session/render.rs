use crate::capture_session::core::{Model, SessionState};
use crate::capture_session::main::CaptureSession;
use crate::device_display::interface::SessionView;

pub fn view(session: &SessionState) -> SessionView {
    let debug_lines = session
        .debug_info()
        .map(|debug_info| {
            vec![
                format!("Strategy: {}", debug_info.strategy),
                format!("Faces found: {}", debug_info.faces_found),
            ]
        })
        .unwrap_or_default();

    SessionView {
        emotion_label: session.emotion_label().to_string(),
        error_message: session.error_message().map(str::to_string),
        debug_lines,
        image: session.last_rendered_image().cloned(),
        camera_active: session.camera_active(),
        auto_capture_enabled: session.auto_capture_enabled(),
        is_loading: session.is_loading(),
        consecutive_failures: session.consecutive_failures(),
    }
}

impl CaptureSession {
    pub fn render(&self, model: &Model) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let view = view(&model.session);
        self.device_display
            .lock()
            .map_err(|_| "display lock poisoned")?
            .render(&view)
    }
}
