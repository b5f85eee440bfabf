//! Paints the scene onto an egui painter.

use egui::epaint::PathShape;
use egui::{Align2, Color32, FontId, Painter, Pos2, Stroke, StrokeKind};
use inkboard_core::Board;
use inkboard_core::shapes::{SerializableColor, Shape};
use inkboard_core::snap::GRID_SIZE;
use kurbo::PathEl;

/// Curve flattening tolerance for display, in screen pixels.
const FLATTEN_TOLERANCE: f64 = 0.3;

/// Selection highlight color (matches the default fill).
const SELECTION_COLOR: Color32 = Color32::from_rgb(0x1e, 0x90, 0xff);

pub fn color32(color: SerializableColor) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

/// Paint the whole board: grid, shapes, selection, pen preview.
pub fn paint_scene(painter: &Painter, origin: Pos2, zoom: f32, board: &Board) {
    let to_screen =
        |p: kurbo::Point| origin + egui::vec2(p.x as f32 * zoom, p.y as f32 * zoom);

    if board.snap_enabled {
        paint_grid(painter, origin, zoom, board);
    }

    for shape in board.scene.shapes_ordered() {
        paint_shape(painter, &to_screen, zoom, shape);
    }

    if let Some(selected) = board.scene.selected_shape() {
        let b = selected.bounds();
        let rect = egui::Rect::from_min_max(
            to_screen(kurbo::Point::new(b.x0, b.y0)),
            to_screen(kurbo::Point::new(b.x1, b.y1)),
        )
        .expand(3.0);
        painter.rect_stroke(
            rect,
            2.0,
            Stroke::new(1.5, SELECTION_COLOR),
            StrokeKind::Outside,
        );
    }

    if let Some(points) = board.tools.stroke_preview() {
        let style = &board.tools.current_style;
        let screen_points: Vec<Pos2> = points.iter().map(|p| to_screen(*p)).collect();
        painter.add(egui::Shape::line(
            screen_points,
            Stroke::new(
                style.stroke_width as f32 * zoom,
                color32(style.stroke_color),
            ),
        ));
    }
}

fn paint_grid(painter: &Painter, origin: Pos2, zoom: f32, board: &Board) {
    let step = GRID_SIZE as f32 * zoom;
    if step < 4.0 {
        return;
    }
    let color = Color32::from_gray(225);
    let width = (board.viewport.surface_width * board.viewport.zoom) as f32;
    let height = (board.viewport.surface_height * board.viewport.zoom) as f32;

    let mut x = 0.0;
    while x <= width {
        painter.vline(
            origin.x + x,
            origin.y..=(origin.y + height),
            Stroke::new(1.0, color),
        );
        x += step;
    }
    let mut y = 0.0;
    while y <= height {
        painter.hline(
            origin.x..=(origin.x + width),
            origin.y + y,
            Stroke::new(1.0, color),
        );
        y += step;
    }
}

fn paint_shape(
    painter: &Painter,
    to_screen: &impl Fn(kurbo::Point) -> Pos2,
    zoom: f32,
    shape: &Shape,
) {
    let style = shape.style();
    let stroke = Stroke::new(
        style.stroke_width as f32 * zoom,
        color32(style.stroke_color),
    );
    let fill = style.fill_color.map(color32);

    match shape {
        Shape::Rectangle(rect) => {
            let screen_rect = egui::Rect::from_min_max(
                to_screen(rect.position),
                to_screen(kurbo::Point::new(
                    rect.position.x + rect.width,
                    rect.position.y + rect.height,
                )),
            );
            if let Some(fill) = fill {
                painter.rect_filled(screen_rect, 0.0, fill);
            }
            painter.rect_stroke(screen_rect, 0.0, stroke, StrokeKind::Middle);
        }
        Shape::Ellipse(ellipse) => {
            if (ellipse.radius_x - ellipse.radius_y).abs() < f64::EPSILON {
                let center = to_screen(ellipse.center);
                let radius = ellipse.radius_x as f32 * zoom;
                if let Some(fill) = fill {
                    painter.circle_filled(center, radius, fill);
                }
                painter.circle_stroke(center, radius, stroke);
            } else {
                let points = flatten_points(shape, to_screen);
                painter.add(egui::Shape::Path(PathShape {
                    points,
                    closed: true,
                    fill: fill.unwrap_or(Color32::TRANSPARENT),
                    stroke: stroke.into(),
                }));
            }
        }
        Shape::Text(text) => {
            let color = style.fill_color.unwrap_or(style.stroke_color);
            painter.text(
                to_screen(text.position),
                Align2::LEFT_TOP,
                &text.content,
                FontId::proportional(text.font_size as f32 * zoom),
                color32(color),
            );
        }
        Shape::Freehand(freehand) => {
            let points: Vec<Pos2> = freehand.points.iter().map(|p| to_screen(*p)).collect();
            painter.add(egui::Shape::line(points, stroke));
        }
    }
}

/// Flatten a shape outline into screen-space points.
fn flatten_points(shape: &Shape, to_screen: &impl Fn(kurbo::Point) -> Pos2) -> Vec<Pos2> {
    let mut points = Vec::new();
    kurbo::flatten(shape.to_path(), FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) => points.push(to_screen(p)),
        _ => {}
    });
    points
}
