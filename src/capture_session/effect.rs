use crate::capture_session::core::{Effect, Msg};
use crate::capture_session::main::CaptureSession;
use crate::frame_encoder;
use std::time::Instant;

impl CaptureSession {
    pub fn execute_effect(&self, effect: Effect) {
        match effect {
            Effect::SubscribeTick => loop {
                std::thread::sleep(self.config.tick_rate);
                if !self.send(Msg::Tick(Instant::now())) {
                    break;
                }
            },
            Effect::SubscribeCommands => {
                let commands = match self.device_display.lock() {
                    Ok(mut display) => display.commands(),
                    Err(_) => None,
                };
                let Some(commands) = commands else {
                    let _ = self.logger.error("Display has no command stream");
                    return;
                };
                while let Ok(command) = commands.recv() {
                    if !self.send(Msg::Command(command, Instant::now())) {
                        break;
                    }
                }
            }
            Effect::StartCamera { epoch } => {
                let result = self.device_camera.start(&self.config.video_constraints);
                self.send(Msg::CameraStartDone { epoch, result });
            }
            Effect::StopCamera => {
                let result = self.device_camera.stop();
                self.send(Msg::CameraStopDone(result));
            }
            Effect::CaptureFrame { generation } => {
                let result =
                    frame_encoder::capture(self.device_camera.as_ref(), self.config.jpeg_quality);
                self.send(Msg::FrameCaptureDone { generation, result });
            }
            Effect::ClassifyFrame { generation, frame } => {
                let result = self.emotion_classifier.submit(&frame);
                self.send(Msg::ClassifyDone { generation, result });
            }
        }
    }
}
