//! Scene: the drawing surface document.
//!
//! The scene owns all drawable objects plus the active selection, and
//! reports every mutation through [`SceneEvent`]s so the editor layer can
//! react (viewport growth, history recording) without being wired to any
//! particular renderer.

use crate::shapes::{Shape, ShapeId};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Scene serialization errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to serialize scene: {0}")]
    Serialization(String),
    #[error("malformed scene snapshot: {0}")]
    Malformed(String),
}

/// An opaque serialized scene at a point in time.
///
/// The history ledger and the document store move these around without
/// looking inside; only [`Scene::apply_snapshot`] interprets the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneSnapshot(serde_json::Value);

impl SceneSnapshot {
    /// Parse a snapshot from JSON text (file import).
    pub fn from_json_str(text: &str) -> Result<Self, SceneError> {
        serde_json::from_str(text)
            .map(SceneSnapshot)
            .map_err(|e| SceneError::Malformed(e.to_string()))
    }

    /// Pretty-printed JSON text (file export).
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "null".to_string())
    }

    /// Access the raw JSON value.
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Events emitted by scene mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    ObjectAdded(ShapeId),
    ObjectModified(ShapeId),
    ObjectRemoved(ShapeId),
    SelectionChanged,
}

/// Serialized form of the scene content.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SceneData {
    shapes: HashMap<ShapeId, Shape>,
    z_order: Vec<ShapeId>,
}

/// The live drawing surface.
#[derive(Debug, Default)]
pub struct Scene {
    /// All shapes, keyed by ID.
    shapes: HashMap<ShapeId, Shape>,
    /// Z-order of shapes (back to front).
    z_order: Vec<ShapeId>,
    /// Currently active object, if any.
    selection: Option<ShapeId>,
    /// Pending events since the last drain.
    events: Vec<SceneEvent>,
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape on top of the z-order.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        self.z_order.push(id);
        self.shapes.insert(id, shape);
        self.events.push(SceneEvent::ObjectAdded(id));
        id
    }

    /// Remove a shape, clearing the selection if it pointed at it.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        let shape = self.shapes.remove(&id)?;
        self.z_order.retain(|&shape_id| shape_id != id);
        if self.selection == Some(id) {
            self.selection = None;
            self.events.push(SceneEvent::SelectionChanged);
        }
        self.events.push(SceneEvent::ObjectRemoved(id));
        Some(shape)
    }

    /// Mutate a shape in place, emitting an `ObjectModified` event.
    ///
    /// Returns false if the shape does not exist.
    pub fn modify_shape(&mut self, id: ShapeId, f: impl FnOnce(&mut Shape)) -> bool {
        let Some(shape) = self.shapes.get_mut(&id) else {
            return false;
        };
        f(shape);
        self.events.push(SceneEvent::ObjectModified(id));
        true
    }

    /// Get a shape by ID.
    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    /// Shapes in z-order (back to front).
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.z_order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// The topmost shape at a point (front-to-back hit test).
    pub fn topmost_at(&self, point: Point, tolerance: f64) -> Option<ShapeId> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .find(|id| {
                self.shapes
                    .get(id)
                    .is_some_and(|s| s.hit_test(point, tolerance))
            })
    }

    /// Bounding box of all shapes, None when empty.
    pub fn content_bounds(&self) -> Option<Rect> {
        let mut result: Option<Rect> = None;
        for shape in self.shapes.values() {
            let bounds = shape.bounds();
            result = Some(match result {
                Some(r) => r.union(bounds),
                None => bounds,
            });
        }
        result
    }

    /// Set (or clear) the active object.
    pub fn select(&mut self, id: Option<ShapeId>) {
        let id = id.filter(|id| self.shapes.contains_key(id));
        if self.selection != id {
            self.selection = id;
            self.events.push(SceneEvent::SelectionChanged);
        }
    }

    /// The active object, if any.
    pub fn selected(&self) -> Option<ShapeId> {
        self.selection
    }

    /// The active shape, if any.
    pub fn selected_shape(&self) -> Option<&Shape> {
        self.selection.and_then(|id| self.shapes.get(&id))
    }

    /// Check if the scene has no shapes.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Drain pending events.
    pub fn take_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Serialize the scene content to an opaque snapshot.
    ///
    /// Round-trips through a JSON value so the snapshot carries no live
    /// references into the scene.
    pub fn to_snapshot(&self) -> Result<SceneSnapshot, SceneError> {
        #[derive(Serialize)]
        struct SceneDataRef<'a> {
            shapes: &'a HashMap<ShapeId, Shape>,
            z_order: &'a Vec<ShapeId>,
        }
        serde_json::to_value(SceneDataRef {
            shapes: &self.shapes,
            z_order: &self.z_order,
        })
        .map(SceneSnapshot)
        .map_err(|e| SceneError::Serialization(e.to_string()))
    }

    /// Replace the scene content from a snapshot.
    ///
    /// Deserializes into a staging value first: a malformed snapshot
    /// returns an error and leaves the current content untouched. On
    /// success, `ObjectAdded` events are emitted for the restored shapes
    /// (callers performing undo/redo/import suppress history recording
    /// with a restore guard).
    pub fn apply_snapshot(&mut self, snapshot: &SceneSnapshot) -> Result<(), SceneError> {
        let data: SceneData = serde_json::from_value(snapshot.0.clone())
            .map_err(|e| SceneError::Malformed(e.to_string()))?;
        // Snapshots written by to_snapshot always satisfy this, but imported
        // files may reference unknown ids in z_order.
        if data.z_order.iter().any(|id| !data.shapes.contains_key(id)) {
            return Err(SceneError::Malformed(
                "z_order references unknown shape id".to_string(),
            ));
        }

        self.shapes = data.shapes;
        self.z_order = data.z_order;
        if self.selection.take().is_some() {
            self.events.push(SceneEvent::SelectionChanged);
        }
        for &id in &self.z_order {
            self.events.push(SceneEvent::ObjectAdded(id));
        }
        Ok(())
    }
}
