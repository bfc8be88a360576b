use crate::device_display::interface::{Command, DeviceDisplay, SessionView};
use std::error::Error;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const WINDOW_TITLE: &str = "Facial Expression Detection";

#[derive(Default)]
struct Shared {
    view: SessionView,
    /// Bumped whenever `view.image` changes so the texture is re-uploaded only then.
    image_version: u64,
}

/// The session-facing half. Renders land in shared state read by [`GuiWindow`].
pub struct DeviceDisplayGui {
    shared: Arc<Mutex<Shared>>,
    command_receiver: Option<Receiver<Command>>,
}

/// The eframe half. Must run on the main thread.
pub struct GuiWindow {
    shared: Arc<Mutex<Shared>>,
    command_sender: Sender<Command>,
    texture: Option<egui::TextureHandle>,
    texture_version: u64,
}

impl DeviceDisplayGui {
    pub fn new() -> (Self, GuiWindow) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        let (command_sender, command_receiver) = channel();

        (
            Self {
                shared: shared.clone(),
                command_receiver: Some(command_receiver),
            },
            GuiWindow {
                shared,
                command_sender,
                texture: None,
                texture_version: 0,
            },
        )
    }
}

impl DeviceDisplay for DeviceDisplayGui {
    fn render(&mut self, view: &SessionView) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut shared = self.shared.lock().map_err(|_| "gui state poisoned")?;
        if shared.view.image != view.image {
            shared.image_version += 1;
        }
        shared.view = view.clone();
        Ok(())
    }

    fn commands(&mut self) -> Option<Receiver<Command>> {
        self.command_receiver.take()
    }
}

/// The view minus the image, which lives on the GPU as a texture.
fn text_only(view: &SessionView) -> SessionView {
    SessionView {
        emotion_label: view.emotion_label.clone(),
        error_message: view.error_message.clone(),
        debug_lines: view.debug_lines.clone(),
        image: None,
        camera_active: view.camera_active,
        auto_capture_enabled: view.auto_capture_enabled,
        is_loading: view.is_loading,
        consecutive_failures: view.consecutive_failures,
    }
}

impl GuiWindow {
    pub fn command_sender(&self) -> Sender<Command> {
        self.command_sender.clone()
    }

    /// Blocks until the window is closed.
    pub fn run(self) -> Result<(), eframe::Error> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default().with_inner_size([720.0, 820.0]),
            ..Default::default()
        };

        eframe::run_native(WINDOW_TITLE, options, Box::new(|_cc| Box::new(self)))
    }

    fn send(&self, command: Command) {
        let _ = self.command_sender.send(command);
    }

    fn sync_texture(&mut self, ctx: &egui::Context, shared: &Shared) {
        if shared.image_version == self.texture_version {
            return;
        }
        self.texture_version = shared.image_version;

        let Some(canvas) = &shared.view.image else {
            self.texture = None;
            return;
        };

        let image = egui::ColorImage::from_rgb(
            [canvas.width() as usize, canvas.height() as usize],
            canvas.image().as_raw(),
        );

        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(ctx.load_texture("processed-image", image, egui::TextureOptions::LINEAR))
            }
        }
    }

    fn controls(&self, ui: &mut egui::Ui, view: &SessionView) {
        ui.horizontal(|ui| {
            if !view.camera_active {
                if ui.button("Start Camera").clicked() {
                    self.send(Command::StartCamera);
                }
                return;
            }

            if ui.button("Stop Camera").clicked() {
                self.send(Command::StopCamera);
            }

            let capture_label = if view.is_loading {
                "Processing..."
            } else {
                "Capture & Analyze"
            };
            if ui
                .add_enabled(!view.is_loading, egui::Button::new(capture_label))
                .clicked()
            {
                self.send(Command::Capture);
            }

            let auto_label = if view.auto_capture_enabled {
                "Stop Auto-Capture"
            } else {
                "Start Auto-Capture"
            };
            if ui.button(auto_label).clicked() {
                self.send(Command::ToggleAutoCapture);
            }
        });
    }

    fn results(&self, ui: &mut egui::Ui, view: &SessionView) {
        if !view.emotion_label.is_empty() {
            ui.label("Detected Emotion:");
            ui.heading(&view.emotion_label);
        }

        if let Some(error) = &view.error_message {
            ui.colored_label(egui::Color32::from_rgb(220, 60, 60), format!("Error: {}", error));
        }

        if !view.debug_lines.is_empty() {
            ui.separator();
            for line in &view.debug_lines {
                ui.monospace(line);
            }
        }

        if view.consecutive_failures > 0 {
            ui.label(format!("Consecutive failures: {}", view.consecutive_failures));
        }
    }
}

impl eframe::App for GuiWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let shared = self.shared.clone();
        let view = {
            let Ok(shared) = shared.lock() else {
                return;
            };
            self.sync_texture(ctx, &shared);
            text_only(&shared.view)
        };

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(WINDOW_TITLE);
            ui.add_space(8.0);

            if !view.camera_active {
                ui.label("Camera inactive");
            }
            self.controls(ui, &view);
            ui.add_space(8.0);
            self.results(ui, &view);
            ui.add_space(8.0);

            if let Some(texture) = &self.texture {
                ui.label("Processed Image:");
                ui.add(
                    egui::Image::from_texture(egui::load::SizedTexture::from_handle(texture))
                        .max_width(ui.available_width()),
                );
            }
        });

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
