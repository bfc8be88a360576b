use crate::device_camera::interface::{CameraError, DeviceCamera, Frame};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, RgbImage};

/// Off-screen raster surface a captured frame is copied into. The overlay
/// draws on the same surface before it is shown.
#[derive(Clone, PartialEq)]
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RgbImage {
        &mut self.image
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Canvas({}x{})", self.width(), self.height())
    }
}

#[derive(Clone, PartialEq)]
pub struct EncodedFrame {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Debug for EncodedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EncodedFrame({}x{}, {} bytes)",
            self.width,
            self.height,
            self.jpeg.len()
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedFrame {
    pub canvas: Canvas,
    pub encoded: EncodedFrame,
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Capture error: {0}")]
    Frame(String),
    #[error("Capture error: {0}")]
    Encode(#[from] image::ImageError),
}

impl From<CameraError> for CaptureError {
    fn from(error: CameraError) -> Self {
        match error {
            CameraError::PermissionDenied(message)
            | CameraError::Unavailable(message)
            | CameraError::Stream(message) => CaptureError::Frame(message),
        }
    }
}

pub fn rasterize(frame: &Frame) -> Canvas {
    Canvas {
        image: frame.0.clone(),
    }
}

pub fn encode(canvas: &Canvas, quality: u8) -> Result<EncodedFrame, CaptureError> {
    let mut jpeg = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, quality);
    encoder.encode(
        canvas.image.as_raw(),
        canvas.width(),
        canvas.height(),
        ExtendedColorType::Rgb8,
    )?;

    Ok(EncodedFrame {
        jpeg,
        width: canvas.width(),
        height: canvas.height(),
    })
}

/// Grabs the frame currently on the stream and encodes it. `Ok(None)` when
/// the camera has nothing to give.
pub fn capture<C: DeviceCamera + ?Sized>(
    camera: &C,
    quality: u8,
) -> Result<Option<CapturedFrame>, CaptureError> {
    let Some(frame) = camera.current_frame()? else {
        return Ok(None);
    };

    let canvas = rasterize(&frame);
    let encoded = encode(&canvas, quality)?;

    Ok(Some(CapturedFrame { canvas, encoded }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_camera::impl_fake::DeviceCameraFake;
    use crate::device_camera::interface::VideoConstraints;
    use crate::library::logger::impl_fake::LoggerFake;
    use image::{GenericImageView, Rgb};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_encode_produces_jpeg_at_native_size() {
        let frame = Frame(RgbImage::from_pixel(320, 240, Rgb([10, 200, 30])));
        let canvas = rasterize(&frame);

        let encoded = encode(&canvas, 95).unwrap();

        assert_eq!((encoded.width, encoded.height), (320, 240));
        assert_eq!(&encoded.jpeg[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&encoded.jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (320, 240));
    }

    #[test]
    fn test_capture_without_stream_is_noop() {
        let camera = DeviceCameraFake::new(Arc::new(LoggerFake::new()))
            .with_latency(Duration::ZERO);

        assert!(capture(&camera, 95).unwrap().is_none());
    }

    #[test]
    fn test_capture_from_stream() {
        let camera = DeviceCameraFake::new(Arc::new(LoggerFake::new()))
            .with_latency(Duration::ZERO);
        camera.start(&VideoConstraints::default()).unwrap();

        let captured = capture(&camera, 95).unwrap().unwrap();

        assert_eq!((captured.canvas.width(), captured.canvas.height()), (640, 480));
        assert_eq!(captured.encoded.width, 640);
        assert!(!captured.encoded.jpeg.is_empty());
    }

    #[test]
    fn test_camera_failure_message() {
        let error: CaptureError = CameraError::Stream("device lost".to_string()).into();

        assert_eq!(error.to_string(), "Capture error: device lost");
    }
}
