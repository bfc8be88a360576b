use crate::capture_session::core::Msg;
use crate::config::Config;
use crate::device_camera::interface::DeviceCamera;
use crate::device_display::interface::DeviceDisplay;
use crate::emotion_classifier::interface::EmotionClassifier;
use crate::library::logger::interface::Logger;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct CaptureSession {
    pub config: Config,
    pub logger: Arc<dyn Logger + Send + Sync>,
    pub device_camera: Arc<dyn DeviceCamera + Send + Sync>,
    pub device_display: Arc<Mutex<dyn DeviceDisplay + Send>>,
    pub emotion_classifier: Arc<dyn EmotionClassifier + Send + Sync>,
    msg_sender: Sender<Msg>,
    msg_receiver: Arc<Mutex<Receiver<Msg>>>,
}

impl CaptureSession {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        device_camera: Arc<dyn DeviceCamera + Send + Sync>,
        device_display: Arc<Mutex<dyn DeviceDisplay + Send>>,
        emotion_classifier: Arc<dyn EmotionClassifier + Send + Sync>,
    ) -> Self {
        let (msg_sender, msg_receiver) = channel();

        Self {
            config,
            logger: logger.with_namespace("session"),
            device_camera,
            device_display,
            emotion_classifier,
            msg_sender,
            msg_receiver: Arc::new(Mutex::new(msg_receiver)),
        }
    }

    /// Returns `false` once nobody is listening anymore.
    pub fn send(&self, msg: Msg) -> bool {
        self.msg_sender.send(msg).is_ok()
    }

    pub fn recv(&self) -> Result<Msg, Box<dyn std::error::Error + Send + Sync>> {
        let receiver = self
            .msg_receiver
            .lock()
            .map_err(|_| "message receiver lock poisoned")?;
        Ok(receiver.recv()?)
    }
}
