//! Inkboard Core Library
//!
//! Platform-agnostic data structures and logic for the Inkboard whiteboard:
//! scene content, undo/redo history, viewport autoscaling, tools,
//! document persistence, and export.

pub mod board;
pub mod export;
pub mod history;
pub mod scene;
pub mod shapes;
pub mod snap;
pub mod store;
pub mod tools;
pub mod viewport;

pub use board::{Board, BoardError};
pub use history::{HistoryLedger, MAX_HISTORY, RestoreGuard};
pub use scene::{Scene, SceneError, SceneEvent, SceneSnapshot};
pub use snap::{GRID_SIZE, maybe_snap, snap_to_grid};
pub use tools::{CursorStyle, ToolController, ToolKind, ToolState};
pub use viewport::Viewport;
