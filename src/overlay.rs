pub mod font;

use crate::emotion_classifier::interface::{DetectionResult, Position};
use crate::frame_encoder::Canvas;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const LINE_WIDTH: i32 = 3;
/// Glyph pixels are drawn as `FONT_SCALE`-sized squares, about 20 px tall.
pub const FONT_SCALE: u32 = 3;
/// Boxes starting at or above this row get their label underneath.
const TOP_MARGIN: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPlacement {
    Above,
    Below,
}

pub fn format_confidence(confidence: f32) -> String {
    format!("{:.1}%", confidence as f64 * 100.0)
}

pub fn format_label(detection: &DetectionResult) -> String {
    format!(
        "{} ({})",
        detection.emotion,
        format_confidence(detection.confidence)
    )
}

pub fn label_placement(position: &Position) -> LabelPlacement {
    if position.y > TOP_MARGIN {
        LabelPlacement::Above
    } else {
        LabelPlacement::Below
    }
}

/// Baseline origin of the label text.
pub fn label_anchor(position: &Position) -> (i32, i32) {
    let x = position.x.round() as i32;
    match label_placement(position) {
        LabelPlacement::Above => (x, (position.y - 10.0).round() as i32),
        LabelPlacement::Below => (x, (position.y + position.height + 20.0).round() as i32),
    }
}

/// Draws the face box and its label onto `canvas`. Nothing happens without a
/// detection.
pub fn render(canvas: &mut Canvas, detection: Option<&DetectionResult>) {
    let Some(detection) = detection else {
        return;
    };

    let image = canvas.image_mut();
    let position = within_canvas(&detection.position, image.width(), image.height());
    draw_box(image, &position);

    let (x, baseline) = label_anchor(&position);
    draw_text(image, x, baseline, &format_label(detection));
}

/// Clamps each box edge to at most one canvas length past the border, which
/// keeps server-supplied geometry from overflowing the `i32` pixel math.
fn within_canvas(position: &Position, width: u32, height: u32) -> Position {
    let edge = |value: f32, limit: u32| value.clamp(-(limit as f32), 2.0 * limit as f32);

    let left = edge(position.x, width);
    let right = edge(position.x + position.width, width);
    let top = edge(position.y, height);
    let bottom = edge(position.y + position.height, height);

    Position {
        x: left,
        y: top,
        width: right - left,
        height: bottom - top,
    }
}

fn draw_box(image: &mut RgbImage, position: &Position) {
    let left = position.x.round() as i32;
    let top = position.y.round() as i32;
    let width = position.width.round() as i32;
    let height = position.height.round() as i32;

    // Stroke is centred on the box edge like a canvas strokeRect.
    for offset in -(LINE_WIDTH / 2)..=(LINE_WIDTH / 2) {
        let w = width + 2 * offset;
        let h = height + 2 * offset;
        if w <= 0 || h <= 0 {
            continue;
        }
        let rect = Rect::at(left - offset, top - offset).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(image, rect, BOX_COLOR);
    }
}

fn draw_text(image: &mut RgbImage, x: i32, baseline: i32, text: &str) {
    let top = baseline.saturating_sub((font::GLYPH_HEIGHT * FONT_SCALE) as i32);
    let mut cursor = x;

    for ch in text.chars() {
        if cursor >= image.width() as i32 {
            break;
        }
        if let Some(glyph) = font::glyph_bits(ch) {
            for (row, pattern) in glyph.iter().enumerate() {
                for col in 0..font::GLYPH_WIDTH {
                    if (pattern >> (font::GLYPH_WIDTH - 1 - col)) & 1 == 1 {
                        let rect = Rect::at(
                            cursor + (col * FONT_SCALE) as i32,
                            top + (row as u32 * FONT_SCALE) as i32,
                        )
                        .of_size(FONT_SCALE, FONT_SCALE);
                        draw_filled_rect_mut(image, rect, BOX_COLOR);
                    }
                }
            }
        }
        cursor = cursor.saturating_add((font::ADVANCE * FONT_SCALE) as i32);
    }
}
