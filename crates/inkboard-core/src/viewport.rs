//! Viewport: auto-growing surface size plus pan/zoom transform.
//!
//! The drawing surface is kept large enough to contain all objects while
//! fitting the visible window width. Height only ever grows, so vertical
//! space is never lost once gained; width tracks the wider of the visible
//! area and the content extent.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Horizontal margin added past the rightmost content edge.
pub const WIDTH_MARGIN: f64 = 200.0;

/// Vertical margin added below the lowest content edge.
pub const HEIGHT_MARGIN: f64 = 800.0;

/// Starting surface height.
pub const INITIAL_HEIGHT: f64 = 6000.0;

/// Width subtracted from the visible area to avoid spurious scrollbars.
pub const WIDTH_INSET: f64 = 2.0;

/// Minimum allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.1;

/// Maximum allowed zoom factor.
pub const MAX_ZOOM: f64 = 8.0;

/// Multiplier for one zoom-in/out step.
pub const ZOOM_STEP: f64 = 1.2;

/// Viewport state for the editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    /// Drawing surface width in pixels.
    pub surface_width: f64,
    /// Drawing surface height in pixels. Only grows.
    pub surface_height: f64,
    /// Pan offset applied to the view transform.
    pub pan: Vec2,
    /// Zoom factor, clamped to [MIN_ZOOM, MAX_ZOOM].
    pub zoom: f64,
    /// Size of the visible window onto the surface.
    pub visible: Size,
}

impl Viewport {
    /// Create a viewport for a visible window size.
    pub fn new(visible: Size) -> Self {
        Self {
            surface_width: (visible.width - WIDTH_INSET).max(0.0),
            surface_height: INITIAL_HEIGHT,
            pan: Vec2::ZERO,
            zoom: 1.0,
            visible,
        }
    }

    /// Update the visible window size (window resize), then re-fit the
    /// surface width to the given content extent.
    pub fn set_visible_size(&mut self, visible: Size, content_max_x: f64) {
        self.visible = visible;
        self.recompute_width(content_max_x);
    }

    /// Recompute the surface width from the content extent.
    ///
    /// Called after any object add/modify/remove and on resize. Always
    /// re-clamps the pan afterwards since the fit may have changed.
    pub fn recompute_width(&mut self, content_max_x: f64) {
        self.surface_width = (self.visible.width - WIDTH_INSET)
            .max((content_max_x + WIDTH_MARGIN).ceil());
        self.clamp_pan();
    }

    /// Grow the surface height to contain the content extent. Never
    /// shrinks.
    pub fn ensure_height(&mut self, content_max_y: f64) {
        if content_max_y + HEIGHT_MARGIN > self.surface_height {
            self.surface_height = content_max_y + HEIGHT_MARGIN;
        }
    }

    /// Whether the surface is wider than the visible window (horizontal
    /// scrolling enabled).
    pub fn overflows_x(&self) -> bool {
        self.surface_width > self.visible.width
    }

    /// Clamp the horizontal pan offset.
    ///
    /// When the content fits the visible width there is nothing to scroll
    /// and pan.x snaps to 0; otherwise content may only scroll left
    /// (pan.x ≤ 0) so no negative space appears right of the origin.
    pub fn clamp_pan(&mut self) {
        if self.overflows_x() {
            self.pan.x = self.pan.x.min(0.0);
        } else {
            self.pan.x = 0.0;
        }
    }

    /// Apply a raw pointer delta to the pan offset (hand-tool drag).
    ///
    /// Intentionally unclamped; the gesture release re-clamps.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// The view transform from world to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen: Point) -> Point {
        (Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)) * screen
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world: Point) -> Point {
        self.transform() * world
    }

    /// Zoom keeping the given screen point fixed, clamping the result.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;

        // Adjust pan so world_point stays under screen_point.
        let new_screen = self.world_to_screen(world_point);
        self.pan += Vec2::new(
            screen_point.x - new_screen.x,
            screen_point.y - new_screen.y,
        );
        self.clamp_pan();
    }

    /// Set an absolute zoom factor re-centered on the visible center.
    pub fn set_zoom(&mut self, factor: f64) {
        let target = factor.clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom_at(self.visible_center(), target / self.zoom);
    }

    /// One zoom step in.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_STEP);
    }

    /// One zoom step out.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / ZOOM_STEP);
    }

    /// Reset to 100%.
    pub fn zoom_reset(&mut self) {
        self.set_zoom(1.0);
    }

    fn visible_center(&self) -> Point {
        Point::new(self.visible.width / 2.0, self.visible.height / 2.0)
    }
}
