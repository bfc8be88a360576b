use crate::frame_encoder::EncodedFrame;
use serde::Deserialize;

/// Face bounds in pixel space of the submitted frame.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectionResult {
    pub emotion: String,
    /// In `[0, 1]`.
    pub confidence: f32,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DebugInfo {
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub faces_found: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ClassificationResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub debug_info: Option<DebugInfo>,
    #[serde(default)]
    pub results: Option<Vec<DetectionResult>>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("Server error: {0}")]
    Network(String),
    #[error("{0}")]
    Remote(String),
    #[error("No faces detected in the image")]
    NoFace,
}

impl ClassificationResponse {
    /// An `error` field wins over results. Only the first result counts.
    pub fn into_detection(self) -> Result<DetectionResult, ClientError> {
        if let Some(error) = self.error {
            return Err(ClientError::Remote(error));
        }

        self.results
            .and_then(|results| results.into_iter().next())
            .ok_or(ClientError::NoFace)
    }
}

pub trait EmotionClassifier {
    fn submit(&self, frame: &EncodedFrame) -> Result<ClassificationResponse, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> ClassificationResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_happy_response() {
        let response = parse(
            r#"{"debug_info":{"strategy":"haar","faces_found":1},
                "results":[{"emotion":"happy","confidence":0.91,
                            "position":{"x":120,"y":80,"width":200,"height":200}}]}"#,
        );

        assert_eq!(
            response.debug_info,
            Some(DebugInfo {
                strategy: "haar".to_string(),
                faces_found: 1
            })
        );
        let detection = response.into_detection().unwrap();
        assert_eq!(detection.emotion, "happy");
        assert_eq!(detection.position.x, 120.0);
    }

    #[test]
    fn test_error_field_takes_priority() {
        let response = parse(
            r#"{"error":"no_face_detected",
                "results":[{"emotion":"sad","confidence":0.5,
                            "position":{"x":0,"y":0,"width":1,"height":1}}]}"#,
        );

        assert_eq!(
            response.into_detection(),
            Err(ClientError::Remote("no_face_detected".to_string()))
        );
    }

    #[test]
    fn test_empty_results_is_no_face() {
        assert_eq!(
            parse(r#"{"results":[]}"#).into_detection(),
            Err(ClientError::NoFace)
        );
        assert_eq!(parse("{}").into_detection(), Err(ClientError::NoFace));
    }

    #[test]
    fn test_first_result_is_authoritative() {
        let response = parse(
            r#"{"results":[
                {"emotion":"angry","confidence":0.7,"position":{"x":1,"y":2,"width":3,"height":4}},
                {"emotion":"happy","confidence":0.9,"position":{"x":5,"y":6,"width":7,"height":8}}]}"#,
        );

        assert_eq!(response.into_detection().unwrap().emotion, "angry");
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ClientError::Network("connection refused".to_string()).to_string(),
            "Server error: connection refused"
        );
        assert_eq!(
            ClientError::NoFace.to_string(),
            "No faces detected in the image"
        );
    }
}
