use crate::device_camera::interface::VideoConstraints;
use chrono::Offset;
use std::time::Duration;

pub const DEFAULT_ENDPOINT_URL: &str = "https://face-expression-detector-backend.onrender.com/predict";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    Gui,
    Console,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraKind {
    Fake,
    Webcam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    Http,
    Fake,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
    #[error("webcam support was not compiled in, rebuild with --features webcam")]
    WebcamUnsupported,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint_url: String,
    pub auto_capture_interval: Duration,
    pub tick_rate: Duration,
    pub jpeg_quality: u8,
    pub video_constraints: VideoConstraints,
    pub logger_timezone: chrono::FixedOffset,
    pub display: DisplayKind,
    pub camera: CameraKind,
    pub classifier: ClassifierKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            auto_capture_interval: Duration::from_millis(2000),
            tick_rate: Duration::from_millis(50),
            jpeg_quality: 95,
            video_constraints: VideoConstraints::default(),
            logger_timezone: utc(),
            display: DisplayKind::Gui,
            camera: if cfg!(feature = "webcam") {
                CameraKind::Webcam
            } else {
                CameraKind::Fake
            },
            classifier: ClassifierKind::Http,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_vars(|key| std::env::var(key).ok())?;
        config.logger_timezone = *chrono::Local::now().offset();
        Ok(config)
    }

    /// Overlays `EXPRESSION_SNAP_*` variables from `lookup` on top of the defaults.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup("EXPRESSION_SNAP_ENDPOINT") {
            if url.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key: "EXPRESSION_SNAP_ENDPOINT",
                    value: url,
                });
            }
            config.endpoint_url = url.trim().to_string();
        }

        if let Some(value) = lookup("EXPRESSION_SNAP_INTERVAL_MS") {
            let millis = value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|millis| *millis > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    key: "EXPRESSION_SNAP_INTERVAL_MS",
                    value: value.clone(),
                })?;
            config.auto_capture_interval = Duration::from_millis(millis);
        }

        if let Some(value) = lookup("EXPRESSION_SNAP_JPEG_QUALITY") {
            config.jpeg_quality = value
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|quality| (1..=100).contains(quality))
                .ok_or_else(|| ConfigError::Invalid {
                    key: "EXPRESSION_SNAP_JPEG_QUALITY",
                    value: value.clone(),
                })?;
        }

        if let Some(value) = lookup("EXPRESSION_SNAP_DISPLAY") {
            config.display = match value.trim().to_lowercase().as_str() {
                "gui" => DisplayKind::Gui,
                "console" => DisplayKind::Console,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "EXPRESSION_SNAP_DISPLAY",
                        value,
                    })
                }
            };
        }

        if let Some(value) = lookup("EXPRESSION_SNAP_CAMERA") {
            config.camera = match value.trim().to_lowercase().as_str() {
                "fake" => CameraKind::Fake,
                "webcam" if cfg!(feature = "webcam") => CameraKind::Webcam,
                "webcam" => return Err(ConfigError::WebcamUnsupported),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "EXPRESSION_SNAP_CAMERA",
                        value,
                    })
                }
            };
        }

        if let Some(value) = lookup("EXPRESSION_SNAP_CLASSIFIER") {
            config.classifier = match value.trim().to_lowercase().as_str() {
                "http" => ClassifierKind::Http,
                "fake" => ClassifierKind::Fake,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "EXPRESSION_SNAP_CLASSIFIER",
                        value,
                    })
                }
            };
        }

        Ok(config)
    }
}

fn utc() -> chrono::FixedOffset {
    chrono::Utc.fix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(vars(&[])).unwrap();

        assert_eq!(config.endpoint_url, DEFAULT_ENDPOINT_URL);
        assert_eq!(config.auto_capture_interval, Duration::from_millis(2000));
        assert_eq!(config.jpeg_quality, 95);
        assert_eq!(config.video_constraints.ideal_width, 640);
        assert_eq!(config.video_constraints.ideal_height, 480);
        assert_eq!(config.classifier, ClassifierKind::Http);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("EXPRESSION_SNAP_ENDPOINT", "http://127.0.0.1:5000/predict"),
            ("EXPRESSION_SNAP_INTERVAL_MS", "500"),
            ("EXPRESSION_SNAP_JPEG_QUALITY", "80"),
            ("EXPRESSION_SNAP_DISPLAY", "Console"),
            ("EXPRESSION_SNAP_CAMERA", "fake"),
            ("EXPRESSION_SNAP_CLASSIFIER", "fake"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint_url, "http://127.0.0.1:5000/predict");
        assert_eq!(config.auto_capture_interval, Duration::from_millis(500));
        assert_eq!(config.jpeg_quality, 80);
        assert_eq!(config.display, DisplayKind::Console);
        assert_eq!(config.camera, CameraKind::Fake);
        assert_eq!(config.classifier, ClassifierKind::Fake);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let result = Config::from_vars(vars(&[("EXPRESSION_SNAP_INTERVAL_MS", "0")]));

        assert_eq!(
            result.unwrap_err(),
            ConfigError::Invalid {
                key: "EXPRESSION_SNAP_INTERVAL_MS",
                value: "0".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_out_of_range_quality() {
        assert!(Config::from_vars(vars(&[("EXPRESSION_SNAP_JPEG_QUALITY", "0")])).is_err());
        assert!(Config::from_vars(vars(&[("EXPRESSION_SNAP_JPEG_QUALITY", "101")])).is_err());
    }

    #[test]
    fn test_rejects_unknown_display() {
        let result = Config::from_vars(vars(&[("EXPRESSION_SNAP_DISPLAY", "lcd")]));

        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                key: "EXPRESSION_SNAP_DISPLAY",
                ..
            })
        ));
    }

    #[cfg(not(feature = "webcam"))]
    #[test]
    fn test_webcam_requires_feature() {
        let result = Config::from_vars(vars(&[("EXPRESSION_SNAP_CAMERA", "webcam")]));

        assert_eq!(result.unwrap_err(), ConfigError::WebcamUnsupported);
    }
}
