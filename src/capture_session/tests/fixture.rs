use crate::capture_session::main::CaptureSession;
use crate::config::{CameraKind, ClassifierKind, Config, DisplayKind};
use crate::device_camera::impl_fake::DeviceCameraFake;
use crate::device_display::impl_fake::DeviceDisplayFake;
use crate::device_display::interface::{Command, SessionView};
use crate::emotion_classifier::impl_fake::EmotionClassifierFake;
use crate::library::logger::impl_fake::LoggerFake;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[allow(dead_code)]
pub struct Fixture {
    pub config: Config,
    pub logger: Arc<LoggerFake>,
    pub device_camera: Arc<DeviceCameraFake>,
    pub emotion_classifier: Arc<EmotionClassifierFake>,
    pub commands: Sender<Command>,
    pub views: Arc<Mutex<Vec<SessionView>>>,
    pub capture_session: CaptureSession,
}

impl Fixture {
    pub fn new() -> Self {
        let config = Config {
            tick_rate: Duration::from_millis(5),
            auto_capture_interval: Duration::from_millis(40),
            display: DisplayKind::Console,
            camera: CameraKind::Fake,
            classifier: ClassifierKind::Fake,
            ..Config::default()
        };
        let logger = Arc::new(LoggerFake::new());
        let device_camera =
            Arc::new(DeviceCameraFake::new(logger.clone()).with_latency(Duration::ZERO));
        let emotion_classifier = Arc::new(EmotionClassifierFake::new(logger.clone()));
        let device_display = DeviceDisplayFake::new(logger.clone());
        let commands = device_display.command_sender();
        let views = device_display.views();

        let capture_session = CaptureSession::new(
            config.clone(),
            logger.clone(),
            device_camera.clone(),
            Arc::new(Mutex::new(device_display)),
            emotion_classifier.clone(),
        );

        Self {
            config,
            logger,
            device_camera,
            emotion_classifier,
            commands,
            views,
            capture_session,
        }
    }

    pub fn send(&self, command: Command) {
        self.commands.send(command).unwrap();
    }

    pub fn view_count(&self) -> usize {
        self.views.lock().unwrap().len()
    }

    pub fn wait_for_view(&self, predicate: impl Fn(&SessionView) -> bool) -> SessionView {
        self.wait_for_view_since(0, predicate)
    }

    /// Polls views rendered after the first `skip` until one matches,
    /// panicking after two seconds.
    pub fn wait_for_view_since(
        &self,
        skip: usize,
        predicate: impl Fn(&SessionView) -> bool,
    ) -> SessionView {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if let Some(view) = self
                .views
                .lock()
                .unwrap()
                .iter()
                .skip(skip)
                .find(|view| predicate(view))
            {
                return view.clone();
            }
            assert!(Instant::now() < deadline, "timed out waiting for view");
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}
