use crate::device_camera::interface::{CameraError, DeviceCamera, Frame, VideoConstraints};
use crate::library::logger::interface::Logger;
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

enum WorkerCommand {
    Frame(Sender<Result<Frame, CameraError>>),
    Stop,
}

struct Worker {
    commands: Sender<WorkerCommand>,
    handle: JoinHandle<()>,
}

/// Webcam backed by nokhwa. `nokhwa::Camera` is not `Send`, so each stream
/// lives on its own worker thread and is driven over a channel.
pub struct DeviceCameraNokhwa {
    logger: Arc<dyn Logger + Send + Sync>,
    index: u32,
    worker: Mutex<Option<Worker>>,
}

impl DeviceCameraNokhwa {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("camera").with_namespace("nokhwa"),
            index: 0,
            worker: Mutex::new(None),
        }
    }

    fn poisoned() -> CameraError {
        CameraError::Stream("camera worker lock poisoned".to_string())
    }
}

fn open_camera(index: u32, constraints: &VideoConstraints) -> Result<Camera, CameraError> {
    let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
        CameraFormat::new(
            Resolution::new(constraints.ideal_width, constraints.ideal_height),
            FrameFormat::MJPEG,
            30,
        ),
    ));

    let mut camera = Camera::new(CameraIndex::Index(index), requested).map_err(|e| {
        let message = e.to_string();
        if message.to_lowercase().contains("permission") {
            CameraError::PermissionDenied(message)
        } else {
            CameraError::Unavailable(message)
        }
    })?;

    camera
        .open_stream()
        .map_err(|e| CameraError::Unavailable(e.to_string()))?;

    Ok(camera)
}

fn grab(camera: &mut Camera) -> Result<Frame, CameraError> {
    let buffer = camera
        .frame()
        .map_err(|e| CameraError::Stream(e.to_string()))?;
    let decoded = buffer
        .decode_image::<RgbFormat>()
        .map_err(|e| CameraError::Stream(e.to_string()))?;
    let (width, height) = (decoded.width(), decoded.height());

    RgbImage::from_raw(width, height, decoded.into_raw())
        .map(Frame)
        .ok_or_else(|| CameraError::Stream("decoded frame has wrong size".to_string()))
}

fn run_worker(
    logger: Arc<dyn Logger + Send + Sync>,
    mut camera: Camera,
    commands: Receiver<WorkerCommand>,
) {
    while let Ok(command) = commands.recv() {
        match command {
            WorkerCommand::Frame(reply) => {
                let _ = reply.send(grab(&mut camera));
            }
            WorkerCommand::Stop => break,
        }
    }

    if let Err(e) = camera.stop_stream() {
        let _ = logger.error(&format!("Failed to stop stream: {}", e));
    }
    let _ = logger.info("Camera stopped");
}

impl DeviceCamera for DeviceCameraNokhwa {
    fn start(&self, constraints: &VideoConstraints) -> Result<(), CameraError> {
        self.stop()?;

        let _ = self.logger.info(&format!(
            "Opening camera {} at {}x{}...",
            self.index, constraints.ideal_width, constraints.ideal_height
        ));

        let (command_sender, command_receiver) = channel();
        let (opened_sender, opened_receiver) = channel();
        let index = self.index;
        let constraints = *constraints;
        let logger = self.logger.clone();

        let handle = std::thread::spawn(move || match open_camera(index, &constraints) {
            Ok(camera) => {
                let _ = opened_sender.send(Ok(()));
                run_worker(logger, camera, command_receiver);
            }
            Err(e) => {
                let _ = opened_sender.send(Err(e));
            }
        });

        let opened = opened_receiver
            .recv()
            .map_err(|_| CameraError::Unavailable("camera worker exited".to_string()))
            .and_then(|opened| opened);

        match opened {
            Ok(()) => {
                *self.worker.lock().map_err(|_| Self::poisoned())? = Some(Worker {
                    commands: command_sender,
                    handle,
                });
                let _ = self.logger.info("Camera started");
                Ok(())
            }
            Err(e) => {
                let _ = handle.join();
                let _ = self.logger.error(&e.to_string());
                Err(e)
            }
        }
    }

    fn stop(&self) -> Result<(), CameraError> {
        let worker = self.worker.lock().map_err(|_| Self::poisoned())?.take();

        if let Some(worker) = worker {
            let _ = worker.commands.send(WorkerCommand::Stop);
            worker
                .handle
                .join()
                .map_err(|_| CameraError::Stream("camera worker panicked".to_string()))?;
        }

        Ok(())
    }

    fn is_streaming(&self) -> bool {
        self.worker
            .lock()
            .map(|worker| worker.is_some())
            .unwrap_or(false)
    }

    fn current_frame(&self) -> Result<Option<Frame>, CameraError> {
        let (reply_sender, reply_receiver) = channel();

        {
            let worker = self.worker.lock().map_err(|_| Self::poisoned())?;
            let Some(worker) = worker.as_ref() else {
                return Ok(None);
            };
            worker
                .commands
                .send(WorkerCommand::Frame(reply_sender))
                .map_err(|_| CameraError::Stream("camera worker exited".to_string()))?;
        }

        let frame = reply_receiver
            .recv()
            .map_err(|_| CameraError::Stream("camera worker exited".to_string()))??;

        Ok(Some(frame))
    }
}

impl Drop for DeviceCameraNokhwa {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
