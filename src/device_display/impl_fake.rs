use crate::device_display::interface::{Command, DeviceDisplay, SessionView};
use crate::library::logger::interface::Logger;
use std::error::Error;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// Records every view and lets tests push commands in.
pub struct DeviceDisplayFake {
    logger: Arc<dyn Logger + Send + Sync>,
    views: Arc<Mutex<Vec<SessionView>>>,
    command_sender: Sender<Command>,
    command_receiver: Option<Receiver<Command>>,
}

impl DeviceDisplayFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        let (command_sender, command_receiver) = channel();
        Self {
            logger: logger.with_namespace("display").with_namespace("fake"),
            views: Arc::new(Mutex::new(Vec::new())),
            command_sender,
            command_receiver: Some(command_receiver),
        }
    }

    #[allow(dead_code)]
    pub fn command_sender(&self) -> Sender<Command> {
        self.command_sender.clone()
    }

    #[allow(dead_code)]
    pub fn views(&self) -> Arc<Mutex<Vec<SessionView>>> {
        self.views.clone()
    }
}

impl DeviceDisplay for DeviceDisplayFake {
    fn render(&mut self, view: &SessionView) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.logger.info(&format!(
            "render(label={:?}, error={:?}, loading={})",
            view.emotion_label, view.error_message, view.is_loading
        ))?;
        self.views
            .lock()
            .map_err(|_| "fake display views poisoned")?
            .push(view.clone());
        Ok(())
    }

    fn commands(&mut self) -> Option<Receiver<Command>> {
        self.command_receiver.take()
    }
}
