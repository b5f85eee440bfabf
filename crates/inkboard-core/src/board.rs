//! Board: the live editor state for one document.
//!
//! Ties the scene, history ledger, viewport and tool controller together
//! and runs the edit loop: every mutation drains scene events, refits the
//! surface to the content, and records a history snapshot unless a
//! restore operation (undo, redo, load, import) is in flight.

use crate::history::HistoryLedger;
use crate::scene::{Scene, SceneError, SceneEvent, SceneSnapshot};
use crate::shapes::{Ellipse, Rectangle, Shape, ShapeId, ShapeStyle, Text};
use crate::snap::maybe_snap;
use crate::store::{DocumentStore, StoreError};
use crate::tools::{ToolController, ToolKind};
use crate::viewport::Viewport;
use kurbo::{Point, Size, Vec2};
use thiserror::Error;

/// Errors surfaced by board operations.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Default geometry for objects inserted by the shape tools.
const DEFAULT_RECT_POS: Point = Point::new(100.0, 100.0);
const DEFAULT_RECT_SIZE: (f64, f64) = (160.0, 100.0);
const DEFAULT_CIRCLE_CENTER: Point = Point::new(210.0, 180.0);
const DEFAULT_CIRCLE_RADIUS: f64 = 60.0;
const DEFAULT_TEXT_POS: Point = Point::new(120.0, 140.0);
const DEFAULT_TEXT_CONTENT: &str = "Double-click to edit";

/// Hit-test tolerance for click selection, in world pixels.
const SELECT_TOLERANCE: f64 = 4.0;

/// Live editor state for one open document.
pub struct Board {
    pub scene: Scene,
    pub ledger: HistoryLedger,
    pub viewport: Viewport,
    pub tools: ToolController,
    /// Whether object placement snaps to the grid.
    pub snap_enabled: bool,
}

impl Board {
    /// Create a board with an empty scene.
    pub fn new(visible: Size) -> Self {
        Self {
            scene: Scene::new(),
            ledger: HistoryLedger::new(),
            viewport: Viewport::new(visible),
            tools: ToolController::new(),
            snap_enabled: true,
        }
    }

    /// Load a document into the board.
    ///
    /// An absent document is created fresh (empty scene, empty ledger). A
    /// document with a saved scene restores it and seeds the ledger with
    /// that snapshot so the loaded state is the undo floor.
    pub async fn load(&mut self, store: &dyn DocumentStore, id: &str) -> Result<(), BoardError> {
        let record = match store.get(id).await {
            Ok(record) => record,
            Err(StoreError::NotFound(_)) => store.create(id).await?,
            Err(e) => return Err(e.into()),
        };

        self.scene = Scene::new();
        match record.scene {
            Some(snapshot) => {
                {
                    let _guard = self.ledger.begin_restore();
                    self.scene.apply_snapshot(&snapshot)?;
                    self.sync();
                }
                self.ledger.reset(snapshot);
            }
            None => self.ledger.clear(),
        }
        Ok(())
    }

    /// Persist the current scene into the document record.
    pub async fn save(&self, store: &dyn DocumentStore, id: &str) -> Result<(), BoardError> {
        let snapshot = self.scene.to_snapshot()?;
        store.put_scene(id, &snapshot).await?;
        Ok(())
    }

    /// Replace the scene from imported JSON text.
    ///
    /// A malformed payload returns an error and leaves both the scene and
    /// the ledger untouched. On success the ledger is reset so the import
    /// becomes the undo floor.
    pub fn import_json(&mut self, text: &str) -> Result<(), BoardError> {
        let snapshot = SceneSnapshot::from_json_str(text)?;
        {
            let _guard = self.ledger.begin_restore();
            self.scene.apply_snapshot(&snapshot)?;
            self.sync();
        }
        self.ledger.reset(snapshot);
        Ok(())
    }

    /// Undo one step. No-op at the history floor.
    pub fn undo(&mut self) -> Result<(), BoardError> {
        let Some(target) = self.ledger.undo_target().cloned() else {
            return Ok(());
        };
        {
            let _guard = self.ledger.begin_restore();
            self.scene.apply_snapshot(&target)?;
            self.sync();
        }
        self.ledger.commit_undo();
        Ok(())
    }

    /// Redo one step. No-op at the history top.
    pub fn redo(&mut self) -> Result<(), BoardError> {
        let Some(target) = self.ledger.redo_target().cloned() else {
            return Ok(());
        };
        {
            let _guard = self.ledger.begin_restore();
            self.scene.apply_snapshot(&target)?;
            self.sync();
        }
        self.ledger.commit_redo();
        Ok(())
    }

    /// Drain scene events, refit the viewport, and record a history entry
    /// if any object changed.
    ///
    /// Called after every mutation; run inside a restore guard during
    /// programmatic loads so the refit happens but no history records.
    pub fn sync(&mut self) {
        let events = self.scene.take_events();
        if events.is_empty() {
            return;
        }

        let bounds = self.scene.content_bounds();
        self.viewport
            .recompute_width(bounds.map_or(0.0, |b| b.x1.max(0.0)));
        if let Some(b) = bounds {
            self.viewport.ensure_height(b.y1.max(0.0));
        }

        let object_changed = events.iter().any(|e| {
            matches!(
                e,
                SceneEvent::ObjectAdded(_)
                    | SceneEvent::ObjectModified(_)
                    | SceneEvent::ObjectRemoved(_)
            )
        });
        if object_changed && !self.ledger.is_restoring() {
            match self.scene.to_snapshot() {
                Ok(snapshot) => self.ledger.record(snapshot),
                Err(e) => log::warn!("skipping history record: {}", e),
            }
        }
    }

    /// Insert the default rectangle, select it, return to Select.
    pub fn add_rectangle(&mut self) -> ShapeId {
        let mut rect = Rectangle::new(
            maybe_snap(DEFAULT_RECT_POS, self.snap_enabled),
            DEFAULT_RECT_SIZE.0,
            DEFAULT_RECT_SIZE.1,
        );
        rect.style = self.tools.current_style.clone();
        self.insert_shape(Shape::Rectangle(rect))
    }

    /// Insert the default circle, select it, return to Select.
    pub fn add_circle(&mut self) -> ShapeId {
        let mut circle = Ellipse::circle(
            maybe_snap(DEFAULT_CIRCLE_CENTER, self.snap_enabled),
            DEFAULT_CIRCLE_RADIUS,
        );
        circle.style = self.tools.current_style.clone();
        self.insert_shape(Shape::Ellipse(circle))
    }

    /// Insert the default text placeholder, select it, return to Select.
    pub fn add_text(&mut self) -> ShapeId {
        let mut text = Text::new(
            maybe_snap(DEFAULT_TEXT_POS, self.snap_enabled),
            DEFAULT_TEXT_CONTENT.to_string(),
        );
        text.style = self.tools.current_style.clone();
        self.insert_shape(Shape::Text(text))
    }

    fn insert_shape(&mut self, shape: Shape) -> ShapeId {
        let id = self.scene.add_shape(shape);
        self.scene.select(Some(id));
        if self.tools.current_tool.is_momentary() {
            self.tools.return_to_select();
        }
        self.sync();
        id
    }

    /// Handle a primary click on the canvas at a world point.
    pub fn click_at(&mut self, world: Point) {
        if !self.tools.current_tool.selection_enabled() {
            return;
        }
        let hit = self.scene.topmost_at(world, SELECT_TOLERANCE);
        self.scene.select(hit);
        self.scene.take_events();
    }

    /// Move the selected object by a world-space delta, snapping its new
    /// origin to the grid when enabled.
    pub fn move_selection(&mut self, delta: Vec2) {
        let Some(id) = self.scene.selected() else {
            return;
        };
        let snap = self.snap_enabled;
        self.scene.modify_shape(id, |shape| {
            shape.translate(delta);
            if snap {
                let origin = shape.bounds().origin();
                let snapped = maybe_snap(origin, true);
                shape.translate(snapped - origin);
            }
        });
        self.sync();
    }

    /// Delete the selected object.
    pub fn delete_selection(&mut self) {
        if let Some(id) = self.scene.selected() {
            self.scene.remove_shape(id);
            self.sync();
        }
    }

    /// Apply the current tool style to the selected object.
    pub fn apply_style_to_selection(&mut self) {
        let Some(id) = self.scene.selected() else {
            return;
        };
        let style: ShapeStyle = self.tools.current_style.clone();
        self.scene.modify_shape(id, |shape| {
            // Outline-only shapes keep their missing fill.
            let keep_fill_empty = shape.style().fill_color.is_none();
            *shape.style_mut() = style;
            if keep_fill_empty {
                shape.style_mut().fill_color = None;
            }
        });
        self.sync();
    }

    /// Begin a pen stroke at a world point.
    pub fn stroke_begin(&mut self, world: Point) {
        self.tools.begin_stroke(world);
    }

    /// Extend the in-flight pen stroke.
    pub fn stroke_extend(&mut self, world: Point) {
        self.tools.extend_stroke(world);
    }

    /// Finish the pen stroke, committing the freehand shape.
    pub fn stroke_finish(&mut self) -> Option<ShapeId> {
        let shape = self.tools.finish_stroke()?;
        let id = self.scene.add_shape(shape);
        self.sync();
        Some(id)
    }

    /// Switch tools, dropping selection when the new tool disables it.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.set_tool(tool);
        if !tool.selection_enabled() {
            self.scene.select(None);
            self.scene.take_events();
        }
        self.viewport.clamp_pan();
    }

    /// Select a tool, toggling back to Select when it is already active.
    pub fn toggle_tool(&mut self, tool: ToolKind) {
        if self.tools.current_tool == tool && tool != ToolKind::Select {
            self.set_tool(ToolKind::Select);
        } else {
            self.set_tool(tool);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MAX_HISTORY;
    use crate::shapes::SerializableColor;
    use crate::store::{MemoryStore, block_on};

    fn board() -> Board {
        Board::new(Size::new(800.0, 600.0))
    }

    #[test]
    fn test_insert_records_history_and_selects() {
        let mut board = board();
        let id = board.add_rectangle();
        assert_eq!(board.scene.selected(), Some(id));
        assert_eq!(board.ledger.len(), 1);
        assert_eq!(board.tools.current_tool, ToolKind::Select);
    }

    #[test]
    fn test_undo_redo_restores_scene() {
        let mut board = board();
        board.add_rectangle();
        board.add_circle();
        assert_eq!(board.scene.len(), 2);

        board.undo().unwrap();
        assert_eq!(board.scene.len(), 1);
        // The restore itself must not have recorded a new entry.
        assert_eq!(board.ledger.len(), 2);

        board.redo().unwrap();
        assert_eq!(board.scene.len(), 2);
        assert_eq!(board.ledger.len(), 2);
    }

    #[test]
    fn test_undo_floor_is_noop() {
        let mut board = board();
        board.add_rectangle();
        board.undo().unwrap();
        board.undo().unwrap();
        assert_eq!(board.scene.len(), 1);
    }

    #[test]
    fn test_edit_after_undo_truncates_redo() {
        let mut board = board();
        board.add_rectangle();
        board.add_circle();
        board.undo().unwrap();

        board.add_text();
        assert!(!board.ledger.can_redo());
        board.redo().unwrap();
        assert_eq!(board.scene.len(), 2);
    }

    #[test]
    fn test_history_capped() {
        let mut board = board();
        for _ in 0..(MAX_HISTORY + 10) {
            board.add_rectangle();
        }
        assert_eq!(board.ledger.len(), MAX_HISTORY);
    }

    #[test]
    fn test_surface_grows_with_content() {
        let mut board = board();
        let id = board.add_rectangle();
        board.scene.select(Some(id));
        board.move_selection(Vec2::new(2000.0, 7000.0));

        assert!(board.viewport.surface_width >= 2260.0);
        assert!(board.viewport.surface_height >= 7200.0);
    }

    #[test]
    fn test_move_with_snap() {
        let mut board = board();
        board.snap_enabled = true;
        let id = board.add_rectangle();
        board.move_selection(Vec2::new(3.0, 7.0));

        let origin = board.scene.shape(id).unwrap().bounds().origin();
        assert!((origin.x % 10.0).abs() < f64::EPSILON);
        assert!((origin.y % 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_delete_selection() {
        let mut board = board();
        board.add_rectangle();
        board.delete_selection();
        assert!(board.scene.is_empty());
        assert_eq!(board.scene.selected(), None);
        // Insert + delete = two history entries.
        assert_eq!(board.ledger.len(), 2);
    }

    #[test]
    fn test_apply_style_preserves_missing_fill() {
        let mut board = board();
        board.set_tool(ToolKind::Pen);
        board.stroke_begin(Point::new(0.0, 0.0));
        board.stroke_extend(Point::new(50.0, 50.0));
        let id = board.stroke_finish().unwrap();

        board.set_tool(ToolKind::Select);
        board.scene.select(Some(id));
        board.tools.current_style.fill_color = Some(SerializableColor::from_hex("#ff0000").unwrap());
        board.apply_style_to_selection();

        assert!(board.scene.shape(id).unwrap().style().fill_color.is_none());
    }

    #[test]
    fn test_click_selects_topmost() {
        let mut board = board();
        board.add_rectangle();
        let top = board.add_circle();

        board.click_at(Point::new(210.0, 180.0));
        assert_eq!(board.scene.selected(), Some(top));

        board.click_at(Point::new(5000.0, 5000.0));
        assert_eq!(board.scene.selected(), None);
    }

    #[test]
    fn test_pen_tool_disables_selection() {
        let mut board = board();
        let id = board.add_rectangle();
        board.scene.select(Some(id));

        board.set_tool(ToolKind::Pen);
        assert_eq!(board.scene.selected(), None);
        board.click_at(Point::new(150.0, 150.0));
        assert_eq!(board.scene.selected(), None);
    }

    #[test]
    fn test_snap_defaults_on() {
        let board = board();
        assert!(board.snap_enabled);
    }

    #[test]
    fn test_toggle_tool_returns_to_select() {
        let mut board = board();
        board.toggle_tool(ToolKind::Pen);
        assert_eq!(board.tools.current_tool, ToolKind::Pen);
        board.toggle_tool(ToolKind::Pen);
        assert_eq!(board.tools.current_tool, ToolKind::Select);

        board.toggle_tool(ToolKind::Hand);
        board.toggle_tool(ToolKind::Pen);
        assert_eq!(board.tools.current_tool, ToolKind::Pen);
    }

    #[test]
    fn test_load_missing_creates_document() {
        let store = MemoryStore::new();
        let mut board = board();
        block_on(board.load(&store, "doc-1")).unwrap();

        assert!(board.scene.is_empty());
        assert!(board.ledger.is_empty());
        assert!(block_on(store.exists("doc-1")).unwrap());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let store = MemoryStore::new();
        let mut board = board();
        board.add_rectangle();
        board.add_circle();
        block_on(board.save(&store, "doc-1")).unwrap();

        let mut reopened = Board::new(Size::new(800.0, 600.0));
        block_on(reopened.load(&store, "doc-1")).unwrap();

        assert_eq!(reopened.scene.len(), 2);
        // Loaded state is the undo floor.
        assert_eq!(reopened.ledger.len(), 1);
        assert!(!reopened.ledger.can_undo());
    }

    #[test]
    fn test_import_invalid_leaves_state() {
        let mut board = board();
        board.add_rectangle();

        assert!(board.import_json("{not json").is_err());
        assert!(board.import_json(r#"{"shapes": 42}"#).is_err());
        assert_eq!(board.scene.len(), 1);
        assert_eq!(board.ledger.len(), 1);
    }

    #[test]
    fn test_import_resets_history() {
        let mut board = board();
        board.add_rectangle();
        let exported = board.scene.to_snapshot().unwrap().to_json_string();

        let mut other = Board::new(Size::new(800.0, 600.0));
        other.add_circle();
        other.add_text();
        other.import_json(&exported).unwrap();

        assert_eq!(other.scene.len(), 1);
        assert_eq!(other.ledger.len(), 1);
        assert!(!other.ledger.can_undo());
    }
}
