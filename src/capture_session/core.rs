use crate::capture_session::scheduler::{CaptureScheduler, CaptureTrigger};
use crate::config::Config;
use crate::device_camera::interface::CameraError;
use crate::device_display::interface::Command;
use crate::emotion_classifier::interface::{ClassificationResponse, ClientError, DebugInfo};
use crate::frame_encoder::{Canvas, CaptureError, CapturedFrame, EncodedFrame};
use crate::overlay;
use std::time::Instant;

pub const CAMERA_INACTIVE_MESSAGE: &str = "Camera is not active. Please start the camera first.";

/// What the user sees. Only `transition` writes to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    emotion_label: String,
    error_message: Option<String>,
    debug_info: Option<DebugInfo>,
    consecutive_failures: u32,
    camera_active: bool,
    auto_capture_enabled: bool,
    is_loading: bool,
    last_rendered_image: Option<Canvas>,
    revision: u64,
}

impl SessionState {
    pub fn emotion_label(&self) -> &str {
        &self.emotion_label
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn debug_info(&self) -> Option<&DebugInfo> {
        self.debug_info.as_ref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn camera_active(&self) -> bool {
        self.camera_active
    }

    pub fn auto_capture_enabled(&self) -> bool {
        self.auto_capture_enabled
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_rendered_image(&self) -> Option<&Canvas> {
        self.last_rendered_image.as_ref()
    }

    /// Bumped on every write, lets the runner skip redundant renders.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    pub(super) fn set_camera_active(&mut self, active: bool) {
        self.camera_active = active;
        self.touch();
    }

    pub(super) fn set_auto_capture_enabled(&mut self, enabled: bool) {
        self.auto_capture_enabled = enabled;
        self.touch();
    }

    pub(super) fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
        self.touch();
    }

    pub(super) fn set_error(&mut self, message: Option<String>) {
        self.error_message = message;
        self.touch();
    }

    pub(super) fn set_debug_info(&mut self, debug_info: DebugInfo) {
        self.debug_info = Some(debug_info);
        self.touch();
    }

    pub(super) fn set_image(&mut self, image: Canvas) {
        self.last_rendered_image = Some(image);
        self.touch();
    }

    pub(super) fn record_success(&mut self, label: String) {
        self.emotion_label = label;
        self.consecutive_failures = 0;
        self.touch();
    }

    pub(super) fn record_failure(&mut self, message: String) {
        self.error_message = Some(message);
        self.emotion_label.clear();
        self.consecutive_failures += 1;
        self.touch();
    }
}

/// The capture cycle currently allowed to write results.
#[derive(Debug, Clone, PartialEq)]
pub struct InFlight {
    pub generation: u64,
    pub canvas: Option<Canvas>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub session: SessionState,
    pub scheduler: CaptureScheduler,
    pub generation: u64,
    pub in_flight: Option<InFlight>,
    /// Bumped on every stop so a start that finishes late can be told apart.
    pub camera_epoch: u64,
    pub camera_starting: bool,
    /// `StopCamera` effects whose `CameraStopDone` has not come back yet.
    pub pending_stops: u32,
    /// A start asked for while a stop was still releasing the stream.
    pub start_deferred: bool,
    pub running: bool,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            session: SessionState::default(),
            scheduler: CaptureScheduler::new(),
            generation: 0,
            in_flight: None,
            camera_epoch: 0,
            camera_starting: false,
            pending_stops: 0,
            start_deferred: false,
            running: true,
        }
    }
}

#[derive(Debug)]
pub enum Msg {
    Tick(Instant),
    Command(Command, Instant),
    CameraStartDone {
        epoch: u64,
        result: Result<(), CameraError>,
    },
    CameraStopDone(Result<(), CameraError>),
    FrameCaptureDone {
        generation: u64,
        result: Result<Option<CapturedFrame>, CaptureError>,
    },
    ClassifyDone {
        generation: u64,
        result: Result<ClassificationResponse, ClientError>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SubscribeTick,
    SubscribeCommands,
    StartCamera { epoch: u64 },
    StopCamera,
    CaptureFrame { generation: u64 },
    ClassifyFrame { generation: u64, frame: EncodedFrame },
}

pub fn init() -> (Model, Vec<Effect>) {
    (
        Model::default(),
        vec![Effect::SubscribeTick, Effect::SubscribeCommands],
    )
}

pub fn transition(config: &Config, model: Model, msg: Msg) -> (Model, Vec<Effect>) {
    match msg {
        Msg::Tick(now) => on_tick(model, now),
        Msg::Command(command, now) => on_command(config, model, command, now),
        Msg::CameraStartDone { epoch, result } => on_camera_started(model, epoch, result),
        Msg::CameraStopDone(result) => on_camera_stopped(model, result),
        Msg::FrameCaptureDone { generation, result } => {
            on_frame_captured(model, generation, result)
        }
        Msg::ClassifyDone { generation, result } => on_classified(model, generation, result),
    }
}

fn on_tick(mut model: Model, now: Instant) -> (Model, Vec<Effect>) {
    if !model.session.camera_active() {
        return (model, vec![]);
    }

    match model.scheduler.poll(now) {
        Some(trigger) => begin_capture(model, trigger),
        None => (model, vec![]),
    }
}

fn on_command(
    config: &Config,
    mut model: Model,
    command: Command,
    now: Instant,
) -> (Model, Vec<Effect>) {
    match command {
        Command::StartCamera => {
            if model.session.camera_active() || model.camera_starting || model.start_deferred {
                return (model, vec![]);
            }
            model.session.set_error(None);
            if model.pending_stops > 0 {
                model.start_deferred = true;
                return (model, vec![]);
            }
            start_camera(model)
        }
        Command::StopCamera => stop_camera(model),
        Command::Capture => begin_capture(model, CaptureTrigger::Manual),
        Command::EnableAutoCapture => (enable_auto_capture(config, model, now), vec![]),
        Command::DisableAutoCapture => (disable_auto_capture(model), vec![]),
        Command::ToggleAutoCapture => {
            if model.session.auto_capture_enabled() {
                (disable_auto_capture(model), vec![])
            } else {
                (enable_auto_capture(config, model, now), vec![])
            }
        }
        Command::Quit => {
            let (mut model, effects) = stop_camera(model);
            model.running = false;
            (model, effects)
        }
    }
}

fn enable_auto_capture(config: &Config, mut model: Model, now: Instant) -> Model {
    if !model.session.camera_active() {
        return model;
    }
    model
        .scheduler
        .enable_auto(now, config.auto_capture_interval);
    model.session.set_auto_capture_enabled(true);
    model
}

fn disable_auto_capture(mut model: Model) -> Model {
    model.scheduler.disable_auto();
    if model.session.auto_capture_enabled() {
        model.session.set_auto_capture_enabled(false);
    }
    model
}

fn start_camera(mut model: Model) -> (Model, Vec<Effect>) {
    model.start_deferred = false;
    model.camera_starting = true;
    let epoch = model.camera_epoch;
    (model, vec![Effect::StartCamera { epoch }])
}

/// Tears the stream down and invalidates whatever cycle is still running.
fn stop_camera(model: Model) -> (Model, Vec<Effect>) {
    let mut model = disable_auto_capture(model);

    model.camera_epoch += 1;
    model.camera_starting = false;
    model.start_deferred = false;
    model.pending_stops += 1;
    model.in_flight = None;
    if model.session.is_loading() {
        model.session.set_loading(false);
    }
    if model.session.camera_active() {
        model.session.set_camera_active(false);
    }

    (model, vec![Effect::StopCamera])
}

fn on_camera_started(
    mut model: Model,
    epoch: u64,
    result: Result<(), CameraError>,
) -> (Model, Vec<Effect>) {
    if epoch != model.camera_epoch {
        // Stopped while starting. Release whatever got bound.
        return match result {
            Ok(()) => {
                model.pending_stops += 1;
                (model, vec![Effect::StopCamera])
            }
            Err(_) => (model, vec![]),
        };
    }

    model.camera_starting = false;
    match result {
        Ok(()) => model.session.set_camera_active(true),
        Err(error) => model.session.set_error(Some(error.to_string())),
    }
    (model, vec![])
}

fn on_camera_stopped(mut model: Model, result: Result<(), CameraError>) -> (Model, Vec<Effect>) {
    model.pending_stops = model.pending_stops.saturating_sub(1);
    if let Err(error) = result {
        model.session.set_error(Some(error.to_string()));
    }

    if model.pending_stops == 0 && model.start_deferred {
        return start_camera(model);
    }
    (model, vec![])
}

fn begin_capture(mut model: Model, trigger: CaptureTrigger) -> (Model, Vec<Effect>) {
    if !model.session.camera_active() {
        model
            .session
            .set_error(Some(CAMERA_INACTIVE_MESSAGE.to_string()));
        return (model, vec![]);
    }

    // A periodic fire never piles up behind a slow cycle. A manual capture
    // supersedes it instead.
    if matches!(trigger, CaptureTrigger::Periodic { .. }) && model.in_flight.is_some() {
        return (model, vec![]);
    }

    model.generation += 1;
    let generation = model.generation;
    model.in_flight = Some(InFlight {
        generation,
        canvas: None,
    });
    model.session.set_loading(true);

    (model, vec![Effect::CaptureFrame { generation }])
}

fn is_current(model: &Model, generation: u64) -> bool {
    model
        .in_flight
        .as_ref()
        .is_some_and(|in_flight| in_flight.generation == generation)
}

fn finish_cycle(model: &mut Model) -> Option<InFlight> {
    model.session.set_loading(false);
    model.in_flight.take()
}

fn on_frame_captured(
    mut model: Model,
    generation: u64,
    result: Result<Option<CapturedFrame>, CaptureError>,
) -> (Model, Vec<Effect>) {
    if !is_current(&model, generation) {
        return (model, vec![]);
    }

    match result {
        Ok(Some(captured)) => {
            model.session.set_image(captured.canvas.clone());
            if let Some(in_flight) = model.in_flight.as_mut() {
                in_flight.canvas = Some(captured.canvas);
            }
            (
                model,
                vec![Effect::ClassifyFrame {
                    generation,
                    frame: captured.encoded,
                }],
            )
        }
        Ok(None) => {
            finish_cycle(&mut model);
            (model, vec![])
        }
        Err(error) => {
            finish_cycle(&mut model);
            model.session.record_failure(error.to_string());
            (model, vec![])
        }
    }
}

fn on_classified(
    mut model: Model,
    generation: u64,
    result: Result<ClassificationResponse, ClientError>,
) -> (Model, Vec<Effect>) {
    if !is_current(&model, generation) {
        return (model, vec![]);
    }

    let in_flight = finish_cycle(&mut model);

    let detection = result.and_then(|mut response| {
        if let Some(debug_info) = response.debug_info.take() {
            model.session.set_debug_info(debug_info);
        }
        response.into_detection()
    });

    match detection {
        Ok(detection) => {
            if let Some(mut canvas) = in_flight.and_then(|in_flight| in_flight.canvas) {
                overlay::render(&mut canvas, Some(&detection));
                model.session.set_image(canvas);
            }
            model.session.record_success(overlay::format_label(&detection));
        }
        Err(error) => model.session.record_failure(error.to_string()),
    }

    (model, vec![])
}
