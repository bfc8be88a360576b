use crate::emotion_classifier::interface::{
    ClassificationResponse, ClientError, DebugInfo, DetectionResult, EmotionClassifier, Position,
};
use crate::frame_encoder::EncodedFrame;
use crate::library::logger::interface::Logger;
use rand::distr::{Distribution, Uniform};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const EMOTIONS: [&str; 7] = [
    "angry", "disgust", "fear", "happy", "neutral", "sad", "surprise",
];

/// Answers without a network. Scripted replies are handed out first, then it
/// invents a face in the middle of the frame with a random emotion.
pub struct EmotionClassifierFake {
    logger: Arc<dyn Logger + Send + Sync>,
    scripted: Mutex<VecDeque<Result<ClassificationResponse, ClientError>>>,
}

impl EmotionClassifierFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("classifier").with_namespace("fake"),
            scripted: Mutex::new(VecDeque::new()),
        }
    }

    #[allow(dead_code)]
    pub fn push_reply(&self, reply: Result<ClassificationResponse, ClientError>) {
        if let Ok(mut scripted) = self.scripted.lock() {
            scripted.push_back(reply);
        }
    }

    fn random_response(frame: &EncodedFrame) -> Result<ClassificationResponse, ClientError> {
        let mut rng = rand::rng();

        let index_dist =
            Uniform::new(0, EMOTIONS.len()).map_err(|e| ClientError::Network(e.to_string()))?;
        let confidence_dist =
            Uniform::new(0.4f32, 1.0).map_err(|e| ClientError::Network(e.to_string()))?;

        let size = (frame.width.min(frame.height) as f32 / 2.0).max(1.0);

        Ok(ClassificationResponse {
            error: None,
            debug_info: Some(DebugInfo {
                strategy: "fake".to_string(),
                faces_found: 1,
            }),
            results: Some(vec![DetectionResult {
                emotion: EMOTIONS[index_dist.sample(&mut rng)].to_string(),
                confidence: confidence_dist.sample(&mut rng),
                position: Position {
                    x: (frame.width as f32 - size) / 2.0,
                    y: (frame.height as f32 - size) / 2.0,
                    width: size,
                    height: size,
                },
            }]),
        })
    }
}

impl EmotionClassifier for EmotionClassifierFake {
    fn submit(&self, frame: &EncodedFrame) -> Result<ClassificationResponse, ClientError> {
        let _ = self.logger.info(&format!("Classifying {:?}...", frame));

        let scripted = self
            .scripted
            .lock()
            .map_err(|_| ClientError::Network("fake classifier lock poisoned".to_string()))?
            .pop_front();

        match scripted {
            Some(reply) => reply,
            None => Self::random_response(frame),
        }
    }
}
