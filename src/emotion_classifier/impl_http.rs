use crate::emotion_classifier::interface::{ClassificationResponse, ClientError, EmotionClassifier};
use crate::frame_encoder::EncodedFrame;
use crate::library::logger::interface::Logger;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use std::sync::Arc;

pub struct EmotionClassifierHttp {
    logger: Arc<dyn Logger + Send + Sync>,
    client: Client,
    endpoint_url: String,
}

impl EmotionClassifierHttp {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>, endpoint_url: &str) -> Self {
        Self {
            logger: logger.with_namespace("classifier").with_namespace("http"),
            client: Client::new(),
            endpoint_url: endpoint_url.to_string(),
        }
    }
}

fn network(error: reqwest::Error) -> ClientError {
    ClientError::Network(error.to_string())
}

impl EmotionClassifier for EmotionClassifierHttp {
    fn submit(&self, frame: &EncodedFrame) -> Result<ClassificationResponse, ClientError> {
        let _ = self.logger.info(&format!(
            "POST {} ({} bytes)",
            self.endpoint_url,
            frame.jpeg.len()
        ));

        let part = Part::bytes(frame.jpeg.clone())
            .file_name("frame.jpg")
            .mime_str("image/jpeg")
            .map_err(network)?;
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(&self.endpoint_url)
            .multipart(form)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                let error = network(e);
                let _ = self.logger.error(&error.to_string());
                error
            })?;

        let body: ClassificationResponse = response.json().map_err(network)?;

        let _ = self.logger.info(&format!(
            "Response: error={:?} results={}",
            body.error,
            body.results.as_ref().map_or(0, |results| results.len())
        ));

        Ok(body)
    }
}
