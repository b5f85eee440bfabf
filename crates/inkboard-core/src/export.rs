//! Scene export: JSON, SVG, and rasterized PNG.
//!
//! The PNG path is a small CPU rasterizer: shape outlines are flattened
//! to polygons and filled with the nonzero winding rule, strokes are
//! expanded to fill outlines first. Text objects are not rasterized (the
//! core carries no font engine); they survive in the JSON and SVG exports.

use crate::scene::{Scene, SceneError};
use crate::shapes::{SerializableColor, Shape, ShapeStyle};
use kurbo::{Affine, BezPath, PathEl, Point, Rect, Stroke};
use std::fmt::Write as _;
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("PNG encoding failed: {0}")]
    Png(String),
    #[error("nothing to export: scene is empty")]
    EmptyScene,
}

/// Pixel multiplier for raster export.
const PNG_SCALE: f64 = 2.0;

/// Padding around the content in exported images.
const EXPORT_MARGIN: f64 = 20.0;

/// Curve flattening tolerance for rasterization.
const FLATTEN_TOLERANCE: f64 = 0.25;

/// Serialize the scene to pretty-printed JSON text.
pub fn scene_to_json(scene: &Scene) -> Result<String, ExportError> {
    Ok(scene.to_snapshot()?.to_json_string())
}

/// Render the scene to an SVG document sized to the content.
pub fn scene_to_svg(scene: &Scene) -> Result<String, ExportError> {
    let bounds = export_bounds(scene)?;
    let mut svg = String::new();
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\" \
         viewBox=\"{:.2} {:.2} {:.2} {:.2}\">\n",
        bounds.width(),
        bounds.height(),
        bounds.x0,
        bounds.y0,
        bounds.width(),
        bounds.height(),
    );

    for shape in scene.shapes_ordered() {
        write_svg_shape(&mut svg, shape);
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

/// Render the scene to an encoded PNG at [`PNG_SCALE`]x resolution.
pub fn scene_to_png(scene: &Scene) -> Result<Vec<u8>, ExportError> {
    let bounds = export_bounds(scene)?;
    let width = (bounds.width() * PNG_SCALE).ceil().max(1.0) as u32;
    let height = (bounds.height() * PNG_SCALE).ceil().max(1.0) as u32;

    // World-to-pixel transform: shift content to the origin, then scale.
    let transform =
        Affine::scale(PNG_SCALE) * Affine::translate((-bounds.x0, -bounds.y0));

    let mut raster = Raster::new(width, height);
    for shape in scene.shapes_ordered() {
        // Text is preserved in JSON/SVG exports instead.
        if matches!(shape, Shape::Text(_)) {
            continue;
        }
        let path = transform * shape.to_path();
        let style = shape.style();
        if let Some(fill) = style.fill_color {
            raster.fill_path(&path, fill);
        }
        if style.stroke_width > 0.0 {
            let outline = kurbo::stroke(
                path.iter(),
                &Stroke::new(style.stroke_width * PNG_SCALE),
                &kurbo::StrokeOpts::default(),
                FLATTEN_TOLERANCE,
            );
            raster.fill_path(&outline, style.stroke_color);
        }
    }

    raster.encode_png()
}

/// Content bounding box padded by the export margin.
fn export_bounds(scene: &Scene) -> Result<Rect, ExportError> {
    scene
        .content_bounds()
        .map(|b| b.inflate(EXPORT_MARGIN, EXPORT_MARGIN))
        .ok_or(ExportError::EmptyScene)
}

fn write_svg_shape(svg: &mut String, shape: &Shape) {
    let style = shape.style();
    match shape {
        Shape::Rectangle(rect) => {
            let _ = write!(
                svg,
                "  <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\"{}/>\n",
                rect.position.x,
                rect.position.y,
                rect.width,
                rect.height,
                svg_paint(style),
            );
        }
        Shape::Ellipse(ellipse) => {
            let _ = write!(
                svg,
                "  <ellipse cx=\"{:.2}\" cy=\"{:.2}\" rx=\"{:.2}\" ry=\"{:.2}\"{}/>\n",
                ellipse.center.x,
                ellipse.center.y,
                ellipse.radius_x,
                ellipse.radius_y,
                svg_paint(style),
            );
        }
        Shape::Text(text) => {
            let color = style.fill_color.unwrap_or(style.stroke_color);
            let _ = write!(
                svg,
                "  <text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{:.1}\" fill=\"{}\">{}</text>\n",
                text.position.x,
                text.position.y + text.font_size,
                text.font_size,
                color.to_hex(),
                xml_escape(&text.content),
            );
        }
        Shape::Freehand(freehand) => {
            let mut points = String::new();
            for p in &freehand.points {
                let _ = write!(points, "{:.2},{:.2} ", p.x, p.y);
            }
            let _ = write!(
                svg,
                "  <polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.1}\" \
                 stroke-linecap=\"round\" stroke-linejoin=\"round\"/>\n",
                points.trim_end(),
                style.stroke_color.to_hex(),
                style.stroke_width,
            );
        }
    }
}

fn svg_paint(style: &ShapeStyle) -> String {
    let fill = style
        .fill_color
        .map_or_else(|| "none".to_string(), |c| c.to_hex());
    format!(
        " fill=\"{}\" stroke=\"{}\" stroke-width=\"{:.1}\"",
        fill,
        style.stroke_color.to_hex(),
        style.stroke_width,
    )
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// RGBA8 pixel buffer with nonzero-winding polygon fill.
struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

/// A flattened polygon edge in pixel space.
struct Edge {
    top: Point,
    bottom: Point,
    /// +1 when the original edge pointed downward, -1 upward.
    winding: i32,
}

impl Raster {
    fn new(width: u32, height: u32) -> Self {
        // White background.
        Self {
            width,
            height,
            pixels: vec![255; (width as usize) * (height as usize) * 4],
        }
    }

    /// Fill a closed path with the nonzero winding rule.
    fn fill_path(&mut self, path: &BezPath, color: SerializableColor) {
        let edges = flatten_to_edges(path);
        if edges.is_empty() {
            return;
        }

        let y_min = edges
            .iter()
            .map(|e| e.top.y)
            .fold(f64::INFINITY, f64::min)
            .floor()
            .max(0.0) as u32;
        let y_max = edges
            .iter()
            .map(|e| e.bottom.y)
            .fold(f64::NEG_INFINITY, f64::max)
            .ceil()
            .min(self.height as f64) as u32;

        let mut crossings: Vec<(f64, i32)> = Vec::new();
        for row in y_min..y_max {
            let scan_y = row as f64 + 0.5;
            crossings.clear();
            for edge in &edges {
                if edge.top.y <= scan_y && scan_y < edge.bottom.y {
                    let t = (scan_y - edge.top.y) / (edge.bottom.y - edge.top.y);
                    let x = edge.top.x + t * (edge.bottom.x - edge.top.x);
                    crossings.push((x, edge.winding));
                }
            }
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            let mut span_start = 0.0;
            for &(x, dir) in crossings.iter() {
                if winding == 0 {
                    span_start = x;
                }
                winding += dir;
                if winding == 0 {
                    self.fill_span(row, span_start, x, color);
                }
            }
        }
    }

    fn fill_span(&mut self, row: u32, x0: f64, x1: f64, color: SerializableColor) {
        let start = x0.round().max(0.0) as usize;
        let end = (x1.round() as usize).min(self.width as usize);
        let row_offset = (row as usize) * (self.width as usize) * 4;
        for x in start..end {
            let i = row_offset + x * 4;
            blend_pixel(&mut self.pixels[i..i + 4], color);
        }
    }

    fn encode_png(&self) -> Result<Vec<u8>, ExportError> {
        let mut data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut data, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| ExportError::Png(e.to_string()))?;
            writer
                .write_image_data(&self.pixels)
                .map_err(|e| ExportError::Png(e.to_string()))?;
        }
        Ok(data)
    }
}

/// Source-over blend of a color onto one RGBA8 pixel.
fn blend_pixel(dst: &mut [u8], color: SerializableColor) {
    if color.a == 255 {
        dst[0] = color.r;
        dst[1] = color.g;
        dst[2] = color.b;
        dst[3] = 255;
        return;
    }
    let alpha = color.a as u32;
    let inv = 255 - alpha;
    dst[0] = ((color.r as u32 * alpha + dst[0] as u32 * inv) / 255) as u8;
    dst[1] = ((color.g as u32 * alpha + dst[1] as u32 * inv) / 255) as u8;
    dst[2] = ((color.b as u32 * alpha + dst[2] as u32 * inv) / 255) as u8;
    dst[3] = dst[3].max(color.a);
}

/// Flatten a path into winding-tagged edges, closing open subpaths.
fn flatten_to_edges(path: &BezPath) -> Vec<Edge> {
    let mut edges = Vec::new();
    let mut subpath_start = Point::ZERO;
    let mut current = Point::ZERO;

    let mut push = |a: Point, b: Point| {
        if (a.y - b.y).abs() < f64::EPSILON {
            return;
        }
        if a.y < b.y {
            edges.push(Edge {
                top: a,
                bottom: b,
                winding: 1,
            });
        } else {
            edges.push(Edge {
                top: b,
                bottom: a,
                winding: -1,
            });
        }
    };

    kurbo::flatten(path.iter(), FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => {
            if current != subpath_start {
                push(current, subpath_start);
            }
            subpath_start = p;
            current = p;
        }
        PathEl::LineTo(p) => {
            push(current, p);
            current = p;
        }
        PathEl::ClosePath => {
            push(current, subpath_start);
            current = subpath_start;
        }
        // flatten emits no curves
        _ => {}
    });
    if current != subpath_start {
        push(current, subpath_start);
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Ellipse, Freehand, Rectangle, Text};
    use kurbo::Shape as KurboShape;

    fn scene_with_rect() -> Scene {
        let mut scene = Scene::new();
        scene.add_shape(Shape::Rectangle(Rectangle::new(
            Point::new(100.0, 100.0),
            160.0,
            100.0,
        )));
        scene
    }

    #[test]
    fn test_json_export_parses_back() {
        let scene = scene_with_rect();
        let json = scene_to_json(&scene).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("shapes").is_some());
        assert!(value.get("z_order").is_some());
    }

    #[test]
    fn test_svg_contains_shapes() {
        let mut scene = scene_with_rect();
        scene.add_shape(Shape::Ellipse(Ellipse::circle(Point::new(210.0, 180.0), 60.0)));
        scene.add_shape(Shape::Freehand(Freehand::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(50.0, 50.0),
        ])));
        scene.add_shape(Shape::Text(Text::new(
            Point::new(120.0, 140.0),
            "a < b & c".to_string(),
        )));

        let svg = scene_to_svg(&scene).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<rect"));
        assert!(svg.contains("<ellipse"));
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_empty_scene_rejected() {
        let scene = Scene::new();
        assert!(matches!(scene_to_svg(&scene), Err(ExportError::EmptyScene)));
        assert!(matches!(scene_to_png(&scene), Err(ExportError::EmptyScene)));
    }

    #[test]
    fn test_png_has_signature_and_size() {
        let scene = scene_with_rect();
        let data = scene_to_png(&scene).unwrap();
        assert_eq!(&data[..8], &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n']);

        // Dimensions live in the IHDR chunk right after the signature.
        let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
        let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
        // 160x100 rect + 20px margin on each side, at 2x.
        assert_eq!(width, 400);
        assert_eq!(height, 280);
    }

    #[test]
    fn test_fill_covers_ellipse_interior() {
        let mut raster = Raster::new(40, 40);
        let path = kurbo::Ellipse::new((20.0, 20.0), (15.0, 10.0), 0.0).to_path(0.1);
        raster.fill_path(&path, SerializableColor::new(0, 0, 255, 255));

        let center = (20 * 40 + 20) * 4;
        assert_eq!(&raster.pixels[center..center + 3], &[0, 0, 255]);
        let corner = 0;
        assert_eq!(&raster.pixels[corner..corner + 3], &[255, 255, 255]);
    }

    #[test]
    fn test_fill_covers_rect_interior() {
        let mut raster = Raster::new(20, 20);
        let path = Rect::new(5.0, 5.0, 15.0, 15.0).to_path(0.1);
        raster.fill_path(&path, SerializableColor::new(255, 0, 0, 255));

        let center = (10 * 20 + 10) * 4;
        assert_eq!(&raster.pixels[center..center + 3], &[255, 0, 0]);
        let corner = 0;
        assert_eq!(&raster.pixels[corner..corner + 3], &[255, 255, 255]);
    }
}
