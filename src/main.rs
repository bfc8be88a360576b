use capture_session::main::CaptureSession;
use config::{CameraKind, ClassifierKind, Config, DisplayKind};
use device_camera::impl_fake::DeviceCameraFake;
use device_camera::interface::DeviceCamera;
use device_display::impl_console::DeviceDisplayConsole;
use device_display::impl_gui::DeviceDisplayGui;
use device_display::interface::{Command, DeviceDisplay};
use emotion_classifier::impl_fake::EmotionClassifierFake;
use emotion_classifier::impl_http::EmotionClassifierHttp;
use emotion_classifier::interface::EmotionClassifier;
use library::logger::impl_console::LoggerConsole;
use library::logger::interface::Logger;
use std::sync::{Arc, Mutex};

mod capture_session;
mod config;
mod device_camera;
mod device_display;
mod emotion_classifier;
mod frame_encoder;
mod library;
mod overlay;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;

    let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerConsole::new(config.logger_timezone));

    let device_camera = camera(&config, logger.clone())?;

    let emotion_classifier: Arc<dyn EmotionClassifier + Send + Sync> = match config.classifier {
        ClassifierKind::Http => Arc::new(EmotionClassifierHttp::new(
            logger.clone(),
            &config.endpoint_url,
        )),
        ClassifierKind::Fake => Arc::new(EmotionClassifierFake::new(logger.clone())),
    };

    let _ = logger.info(&format!(
        "Starting with {:?} display, {:?} camera, {:?} classifier",
        config.display, config.camera, config.classifier
    ));

    match config.display {
        DisplayKind::Console => {
            let device_display: Arc<Mutex<dyn DeviceDisplay + Send>> =
                Arc::new(Mutex::new(DeviceDisplayConsole::new()));
            let capture_session = CaptureSession::new(
                config,
                logger,
                device_camera,
                device_display,
                emotion_classifier,
            );
            capture_session.run()
        }
        DisplayKind::Gui => {
            let (device_display, window) = DeviceDisplayGui::new();
            let quit = window.command_sender();
            let capture_session = CaptureSession::new(
                config,
                logger,
                device_camera,
                Arc::new(Mutex::new(device_display)),
                emotion_classifier,
            );

            let session = std::thread::spawn(move || capture_session.run());

            let window_result = window.run();
            let _ = quit.send(Command::Quit);

            let session_result = session
                .join()
                .map_err(|_| "capture session thread panicked")?;
            window_result.map_err(|e| e.to_string())?;
            session_result
        }
    }
}

fn camera(
    config: &Config,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Result<Arc<dyn DeviceCamera + Send + Sync>, Box<dyn std::error::Error + Send + Sync>> {
    match config.camera {
        CameraKind::Fake => Ok(Arc::new(DeviceCameraFake::new(logger))),
        #[cfg(feature = "webcam")]
        CameraKind::Webcam => Ok(Arc::new(
            device_camera::impl_nokhwa::DeviceCameraNokhwa::new(logger),
        )),
        #[cfg(not(feature = "webcam"))]
        CameraKind::Webcam => Err(Box::new(config::ConfigError::WebcamUnsupported)),
    }
}
