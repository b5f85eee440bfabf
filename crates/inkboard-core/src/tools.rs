//! Tool system for the whiteboard.
//!
//! The controller tracks which tool is active plus any in-flight pen
//! stroke. Shape tools (rectangle, circle, text) are momentary: they
//! insert one object and hand control back to Select.

use crate::shapes::{Freehand, Shape, ShapeStyle};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Hand,
    Rectangle,
    Circle,
    Text,
    Pen,
}

impl ToolKind {
    /// Whether clicking objects selects them under this tool.
    pub fn selection_enabled(self) -> bool {
        matches!(self, ToolKind::Select)
    }

    /// Whether this tool inserts one object then returns to Select.
    pub fn is_momentary(self) -> bool {
        matches!(self, ToolKind::Rectangle | ToolKind::Circle | ToolKind::Text)
    }

    /// Pointer cursor to show over the canvas.
    pub fn cursor(self, dragging: bool) -> CursorStyle {
        match self {
            ToolKind::Hand if dragging => CursorStyle::Grabbing,
            ToolKind::Hand => CursorStyle::Grab,
            ToolKind::Pen => CursorStyle::Crosshair,
            _ => CursorStyle::Default,
        }
    }
}

/// Cursor shown over the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    Default,
    Grab,
    Grabbing,
    Crosshair,
}

/// State of a tool interaction.
#[derive(Debug, Clone, Default)]
pub enum ToolState {
    /// Tool is idle, waiting for interaction.
    #[default]
    Idle,
    /// A pen stroke is in progress.
    Drawing {
        /// World-space points accumulated so far.
        points: Vec<Point>,
    },
    /// The hand tool is dragging the view.
    Panning,
}

/// Stroke simplification tolerance applied when a pen stroke ends.
const PEN_SIMPLIFY_TOLERANCE: f64 = 0.5;

/// Manages the current tool and its state.
#[derive(Debug, Clone)]
pub struct ToolController {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: ToolState,
    /// Style applied to newly created shapes.
    pub current_style: ShapeStyle,
}

impl Default for ToolController {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            state: ToolState::default(),
            current_style: ShapeStyle::default(),
        }
    }
}

impl ToolController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch tools, cancelling any interaction in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.state = ToolState::Idle;
    }

    /// Hand control back to Select after a momentary tool fires.
    pub fn return_to_select(&mut self) {
        self.set_tool(ToolKind::Select);
    }

    /// Whether a pen stroke is in progress.
    pub fn is_drawing(&self) -> bool {
        matches!(self.state, ToolState::Drawing { .. })
    }

    /// Points of the in-flight pen stroke, for preview painting.
    pub fn stroke_preview(&self) -> Option<&[Point]> {
        match &self.state {
            ToolState::Drawing { points } => Some(points),
            _ => None,
        }
    }

    /// Begin a pen stroke at a world point. Ignored unless Pen is active.
    pub fn begin_stroke(&mut self, point: Point) {
        if self.current_tool != ToolKind::Pen {
            return;
        }
        self.state = ToolState::Drawing {
            points: vec![point],
        };
    }

    /// Extend the in-flight pen stroke.
    pub fn extend_stroke(&mut self, point: Point) {
        if let ToolState::Drawing { points } = &mut self.state {
            points.push(point);
        }
    }

    /// Finish the pen stroke, returning the resulting shape.
    ///
    /// Returns None for a stray release (no stroke in progress or a
    /// single-point tap). Pen strokes are outline-only: the stroke color
    /// and width come from the current style and the fill is dropped.
    pub fn finish_stroke(&mut self) -> Option<Shape> {
        let ToolState::Drawing { points } = std::mem::take(&mut self.state) else {
            return None;
        };
        if points.len() < 2 {
            return None;
        }
        let mut freehand = Freehand::from_points(points);
        freehand.simplify(PEN_SIMPLIFY_TOLERANCE);
        freehand.style = ShapeStyle {
            fill_color: None,
            ..self.current_style.clone()
        };
        Some(Shape::Freehand(freehand))
    }

    /// Abort the in-flight pen stroke without producing a shape.
    pub fn cancel_stroke(&mut self) {
        if self.is_drawing() {
            self.state = ToolState::Idle;
        }
    }

    /// Note the start of a hand-tool drag.
    pub fn begin_pan(&mut self) {
        if self.current_tool == ToolKind::Hand {
            self.state = ToolState::Panning;
        }
    }

    /// Note the end of a hand-tool drag.
    pub fn end_pan(&mut self) {
        if matches!(self.state, ToolState::Panning) {
            self.state = ToolState::Idle;
        }
    }

    /// Whether a hand-tool drag is in progress.
    pub fn is_panning(&self) -> bool {
        matches!(self.state, ToolState::Panning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_select() {
        let tools = ToolController::new();
        assert_eq!(tools.current_tool, ToolKind::Select);
        assert!(tools.current_tool.selection_enabled());
    }

    #[test]
    fn test_selection_disabled_for_pen_and_hand() {
        assert!(!ToolKind::Pen.selection_enabled());
        assert!(!ToolKind::Hand.selection_enabled());
        assert!(!ToolKind::Rectangle.selection_enabled());
    }

    #[test]
    fn test_momentary_tools() {
        assert!(ToolKind::Rectangle.is_momentary());
        assert!(ToolKind::Circle.is_momentary());
        assert!(ToolKind::Text.is_momentary());
        assert!(!ToolKind::Pen.is_momentary());
        assert!(!ToolKind::Select.is_momentary());
    }

    #[test]
    fn test_stroke_lifecycle() {
        let mut tools = ToolController::new();
        tools.set_tool(ToolKind::Pen);

        tools.begin_stroke(Point::new(0.0, 0.0));
        tools.extend_stroke(Point::new(10.0, 0.0));
        tools.extend_stroke(Point::new(20.0, 5.0));
        assert!(tools.is_drawing());

        let shape = tools.finish_stroke().unwrap();
        assert!(matches!(shape, Shape::Freehand(_)));
        assert!(!tools.is_drawing());
    }

    #[test]
    fn test_stroke_drops_fill() {
        let mut tools = ToolController::new();
        tools.set_tool(ToolKind::Pen);
        tools.begin_stroke(Point::new(0.0, 0.0));
        tools.extend_stroke(Point::new(10.0, 10.0));

        let Some(Shape::Freehand(freehand)) = tools.finish_stroke() else {
            panic!("expected freehand shape");
        };
        assert!(freehand.style.fill_color.is_none());
    }

    #[test]
    fn test_single_point_tap_discarded() {
        let mut tools = ToolController::new();
        tools.set_tool(ToolKind::Pen);
        tools.begin_stroke(Point::new(0.0, 0.0));
        assert!(tools.finish_stroke().is_none());
    }

    #[test]
    fn test_stroke_ignored_without_pen() {
        let mut tools = ToolController::new();
        tools.begin_stroke(Point::new(0.0, 0.0));
        assert!(!tools.is_drawing());
        assert!(tools.finish_stroke().is_none());
    }

    #[test]
    fn test_tool_switch_cancels_stroke() {
        let mut tools = ToolController::new();
        tools.set_tool(ToolKind::Pen);
        tools.begin_stroke(Point::new(0.0, 0.0));
        tools.set_tool(ToolKind::Select);
        assert!(!tools.is_drawing());
    }

    #[test]
    fn test_hand_cursor() {
        assert_eq!(ToolKind::Hand.cursor(false), CursorStyle::Grab);
        assert_eq!(ToolKind::Hand.cursor(true), CursorStyle::Grabbing);
        assert_eq!(ToolKind::Select.cursor(false), CursorStyle::Default);
    }
}
