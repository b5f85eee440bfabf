//! Text shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A text shape.
///
/// The core has no font engine, so bounds are estimated from character
/// counts; the app-side painter lays the text out for display. The fill
/// color doubles as the text color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Position (top-left corner of the text bounding box).
    pub position: Point,
    /// The text content.
    pub content: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Text {
    /// Default font size for new text objects.
    pub const DEFAULT_FONT_SIZE: f64 = 24.0;

    /// Average glyph advance as a fraction of the font size.
    const GLYPH_ASPECT: f64 = 0.6;

    /// Line height as a fraction of the font size.
    const LINE_HEIGHT: f64 = 1.2;

    /// Create a new text shape.
    pub fn new(position: Point, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content,
            font_size: Self::DEFAULT_FONT_SIZE,
            style: ShapeStyle::default(),
        }
    }

    /// Estimated layout size (width, height).
    pub fn estimated_size(&self) -> (f64, f64) {
        let longest = self
            .content
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);
        let lines = self.content.lines().count().max(1);
        (
            longest as f64 * self.font_size * Self::GLYPH_ASPECT,
            lines as f64 * self.font_size * Self::LINE_HEIGHT,
        )
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let (width, height) = self.estimated_size();
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + width,
            self.position.y + height,
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    fn to_path(&self) -> BezPath {
        self.bounds().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        self.position = affine * self.position;
        let scale = affine.as_coeffs();
        self.font_size *= scale[0].abs().max(scale[3].abs());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_creation() {
        let text = Text::new(Point::new(120.0, 140.0), "hello".to_string());
        assert_eq!(text.content, "hello");
        assert!((text.font_size - Text::DEFAULT_FONT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds_grow_with_content() {
        let short = Text::new(Point::ZERO, "hi".to_string());
        let long = Text::new(Point::ZERO, "hello, whiteboard".to_string());
        assert!(long.bounds().width() > short.bounds().width());
    }

    #[test]
    fn test_multiline_height() {
        let one = Text::new(Point::ZERO, "a".to_string());
        let two = Text::new(Point::ZERO, "a\nb".to_string());
        assert!(two.bounds().height() > one.bounds().height());
    }

    #[test]
    fn test_hit_test() {
        let text = Text::new(Point::new(0.0, 0.0), "hello".to_string());
        assert!(text.hit_test(Point::new(5.0, 5.0), 0.0));
        assert!(!text.hit_test(Point::new(500.0, 5.0), 0.0));
    }
}
