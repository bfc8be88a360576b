use crate::device_camera::interface::{CameraError, DeviceCamera, Frame, VideoConstraints};
use crate::library::logger::interface::Logger;
use image::{Rgb, RgbImage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct FakeTrack {
    live: bool,
}

struct FakeStream {
    width: u32,
    height: u32,
    tracks: Vec<FakeTrack>,
    frame_count: u64,
}

pub struct DeviceCameraFake {
    logger: Arc<dyn Logger + Send + Sync>,
    stream: Mutex<Option<FakeStream>>,
    start_error: Mutex<Option<CameraError>>,
    tracks_stopped: AtomicUsize,
    latency: Duration,
}

impl DeviceCameraFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("camera").with_namespace("fake"),
            stream: Mutex::new(None),
            start_error: Mutex::new(None),
            tracks_stopped: AtomicUsize::new(0),
            latency: Duration::from_millis(300),
        }
    }

    #[allow(dead_code)]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Makes every following `start` fail with `error`, like a denied permission prompt.
    #[allow(dead_code)]
    pub fn fail_start_with(&self, error: CameraError) {
        if let Ok(mut start_error) = self.start_error.lock() {
            *start_error = Some(error);
        }
    }

    #[allow(dead_code)]
    pub fn tracks_stopped(&self) -> usize {
        self.tracks_stopped.load(Ordering::SeqCst)
    }

    fn poisoned() -> CameraError {
        CameraError::Stream("fake stream lock poisoned".to_string())
    }
}

impl DeviceCamera for DeviceCameraFake {
    fn start(&self, constraints: &VideoConstraints) -> Result<(), CameraError> {
        let _ = self.logger.info(&format!(
            "Requesting {}x{} stream facing {:?}...",
            constraints.ideal_width, constraints.ideal_height, constraints.facing
        ));
        std::thread::sleep(self.latency);

        if let Some(error) = self.start_error.lock().map_err(|_| Self::poisoned())?.clone() {
            let _ = self.logger.error(&error.to_string());
            return Err(error);
        }

        let mut stream = self.stream.lock().map_err(|_| Self::poisoned())?;
        *stream = Some(FakeStream {
            width: constraints.ideal_width,
            height: constraints.ideal_height,
            tracks: vec![FakeTrack { live: true }],
            frame_count: 0,
        });

        let _ = self.logger.info("Camera started");
        Ok(())
    }

    fn stop(&self) -> Result<(), CameraError> {
        let mut stream = self.stream.lock().map_err(|_| Self::poisoned())?;

        if let Some(mut bound) = stream.take() {
            for track in bound.tracks.iter_mut().filter(|track| track.live) {
                track.live = false;
                self.tracks_stopped.fetch_add(1, Ordering::SeqCst);
            }
            let _ = self.logger.info("Camera stopped");
        }

        Ok(())
    }

    fn is_streaming(&self) -> bool {
        self.stream
            .lock()
            .map(|stream| stream.is_some())
            .unwrap_or(false)
    }

    fn current_frame(&self) -> Result<Option<Frame>, CameraError> {
        let mut stream = self.stream.lock().map_err(|_| Self::poisoned())?;

        let Some(bound) = stream.as_mut() else {
            return Ok(None);
        };

        bound.frame_count += 1;
        Ok(Some(synthetic_frame(
            bound.width,
            bound.height,
            bound.frame_count,
        )))
    }
}

/// A gray backdrop with a skin-toned block drifting sideways, so consecutive
/// frames differ.
fn synthetic_frame(width: u32, height: u32, frame_count: u64) -> Frame {
    let face_size = (width.min(height) / 3).max(1);
    let travel = width.saturating_sub(face_size).max(1);
    let face_x = ((frame_count * 16) % travel as u64) as u32;
    let face_y = height.saturating_sub(face_size) / 2;

    let image = RgbImage::from_fn(width, height, |x, y| {
        let inside_face = x >= face_x
            && x < face_x + face_size
            && y >= face_y
            && y < face_y + face_size;
        if inside_face {
            Rgb([224, 172, 105])
        } else {
            let shade = (40 + (y * 60 / height.max(1))) as u8;
            Rgb([shade, shade, shade])
        }
    });

    Frame(image)
}
