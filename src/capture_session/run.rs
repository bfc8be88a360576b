use crate::capture_session::core::{init, transition, Effect, Msg};
use crate::capture_session::main::CaptureSession;

impl CaptureSession {
    /// Drives the session until a `Quit` command arrives. Teardown effects
    /// issued by the final transition run before this returns.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (mut model, effects) = init();

        self.render(&model)?;
        let mut rendered_revision = model.session.revision();

        self.execute_effects(effects);

        while model.running {
            let msg = self.recv()?;

            if !matches!(msg, Msg::Tick(_)) {
                let _ = self.logger.info(&format!("msg: {:?}", msg));
            }

            let (new_model, effects) = transition(&self.config, model, msg);
            model = new_model;

            if !effects.is_empty() {
                let _ = self.logger.info(&format!("effects: {:?}", effects));
            }

            if model.session.revision() != rendered_revision {
                self.render(&model)?;
                rendered_revision = model.session.revision();
            }

            if model.running {
                self.execute_effects(effects);
            } else {
                for effect in effects {
                    self.execute_effect(effect);
                }
            }
        }

        let _ = self.logger.info("Session ended");
        Ok(())
    }

    fn execute_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            let self_clone = self.clone();
            std::thread::spawn(move || self_clone.execute_effect(effect));
        }
    }
}
