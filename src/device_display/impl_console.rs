use crate::device_display::interface::{Command, DeviceDisplay, SessionView};
use std::error::Error;
use std::io::BufRead;
use std::sync::mpsc::{channel, Receiver};

const HELP: &str = "commands: s=start camera  x=stop camera  c=capture  a=toggle auto-capture  q=quit";

/// Prints the session to stdout and reads one-letter commands from stdin.
pub struct DeviceDisplayConsole {
    commands_taken: bool,
}

impl DeviceDisplayConsole {
    pub fn new() -> Self {
        Self {
            commands_taken: false,
        }
    }
}

pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_lowercase().as_str() {
        "s" | "start" => Some(Command::StartCamera),
        "x" | "stop" => Some(Command::StopCamera),
        "c" | "capture" => Some(Command::Capture),
        "a" | "auto" => Some(Command::ToggleAutoCapture),
        "q" | "quit" => Some(Command::Quit),
        _ => None,
    }
}

pub fn format_view(view: &SessionView) -> Vec<String> {
    let mut lines = vec![format!(
        "camera: {}  auto-capture: {}  failures: {}{}",
        if view.camera_active { "on" } else { "off" },
        if view.auto_capture_enabled { "on" } else { "off" },
        view.consecutive_failures,
        if view.is_loading { "  Processing..." } else { "" },
    )];

    if !view.emotion_label.is_empty() {
        lines.push(format!("Detected Emotion: {}", view.emotion_label));
    }
    if let Some(error) = &view.error_message {
        lines.push(format!("Error: {}", error));
    }
    lines.extend(view.debug_lines.iter().cloned());
    if let Some(image) = &view.image {
        lines.push(format!("image: {}x{}", image.width(), image.height()));
    }

    lines
}

impl DeviceDisplay for DeviceDisplayConsole {
    fn render(&mut self, view: &SessionView) -> Result<(), Box<dyn Error + Send + Sync>> {
        println!("────────────────────────────────");
        for line in format_view(view) {
            println!("{}", line);
        }
        Ok(())
    }

    fn commands(&mut self) -> Option<Receiver<Command>> {
        if self.commands_taken {
            return None;
        }
        self.commands_taken = true;

        let (sender, receiver) = channel();
        println!("{}", HELP);

        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match parse_command(&line) {
                    Some(command) => {
                        if sender.send(command).is_err() {
                            return;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => println!("{}", HELP),
                }
            }
            let _ = sender.send(Command::Quit);
        });

        Some(receiver)
    }
}
