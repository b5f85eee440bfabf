//! Editor screen: toolbar, canvas, and keyboard handling for one document.

use crate::{file_ops, paint};
use inkboard_core::export;
use inkboard_core::shapes::{SerializableColor, Shape, ShapeId, ShapeStyle};
use inkboard_core::store::DocumentStore;
use inkboard_core::tools::{CursorStyle, ToolKind};
use inkboard_core::Board;
use kurbo::{Point, Size, Vec2};

pub struct EditorScreen {
    doc_id: String,
    board: Board,
    /// Transient status line (save/import results).
    status: Option<String>,
    /// Fatal load error; the canvas is read-only garbage if set.
    load_error: Option<String>,
    /// Text object being edited, with the edit buffer.
    editing_text: Option<(ShapeId, String)>,
    /// World position of the last drag sample (Select tool).
    drag_world_last: Option<Point>,
    /// Pan delta accumulated by the hand tool this frame.
    pan_delta: Vec2,
}

impl EditorScreen {
    /// Open a document, loading it synchronously from the store.
    pub fn open(store: &dyn DocumentStore, doc_id: String, visible: Size) -> Self {
        let mut board = Board::new(visible);
        let load_error = pollster::block_on(board.load(store, &doc_id))
            .err()
            .map(|e| format!("Could not load document: {}", e));
        if let Some(error) = &load_error {
            log::error!("{}", error);
        }
        Self {
            doc_id,
            board,
            status: None,
            load_error,
            editing_text: None,
            drag_world_last: None,
            pan_delta: Vec2::ZERO,
        }
    }

    /// Show the editor. Returns true when the user navigates back home.
    pub fn show(&mut self, ctx: &egui::Context, store: &dyn DocumentStore) -> bool {
        self.pan_delta = Vec2::ZERO;
        self.handle_shortcuts(ctx, store);

        let mut go_home = false;
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            go_home = self.show_toolbar(ui, store);
        });

        if let Some(error) = &self.load_error {
            egui::TopBottomPanel::top("load-error").show(ctx, |ui| {
                ui.colored_label(egui::Color32::RED, error);
            });
        }

        self.show_canvas(ctx);
        self.show_text_editor(ctx);
        go_home
    }

    fn show_toolbar(&mut self, ui: &mut egui::Ui, store: &dyn DocumentStore) -> bool {
        let mut go_home = false;
        ui.horizontal_wrapped(|ui| {
            if ui.button("⬅ Home").clicked() {
                go_home = true;
            }
            ui.separator();

            for (tool, label) in [
                (ToolKind::Select, "Select"),
                (ToolKind::Hand, "Hand"),
                (ToolKind::Pen, "Pen"),
            ] {
                if ui
                    .selectable_label(self.board.tools.current_tool == tool, label)
                    .clicked()
                {
                    self.board.toggle_tool(tool);
                }
            }
            ui.separator();

            if ui.button("Rect").clicked() {
                self.board.set_tool(ToolKind::Rectangle);
                self.board.add_rectangle();
            }
            if ui.button("Circle").clicked() {
                self.board.set_tool(ToolKind::Circle);
                self.board.add_circle();
            }
            if ui.button("Text").clicked() {
                self.board.set_tool(ToolKind::Text);
                self.board.add_text();
            }
            ui.separator();

            if ui
                .add_enabled(self.board.ledger.can_undo(), egui::Button::new("Undo"))
                .clicked()
            {
                let result = self.board.undo().err();
                self.report(result);
            }
            if ui
                .add_enabled(self.board.ledger.can_redo(), egui::Button::new("Redo"))
                .clicked()
            {
                let result = self.board.redo().err();
                self.report(result);
            }
            if ui
                .add_enabled(
                    self.board.scene.selected().is_some(),
                    egui::Button::new("Delete"),
                )
                .clicked()
            {
                self.board.delete_selection();
            }
            ui.separator();

            self.show_style_controls(ui);
            ui.separator();

            ui.checkbox(&mut self.board.snap_enabled, "Snap");
            ui.separator();

            if ui.button("−").clicked() {
                self.board.viewport.zoom_out();
            }
            ui.label(format!("{:.0}%", self.board.viewport.zoom * 100.0));
            if ui.button("+").clicked() {
                self.board.viewport.zoom_in();
            }
            if ui.button("100%").clicked() {
                self.board.viewport.zoom_reset();
            }
            ui.separator();

            if ui.button("Save").clicked() {
                self.save(store);
            }
            if ui.button("Import JSON").clicked() {
                self.import_json();
            }
            ui.menu_button("Export", |ui| {
                if ui.button("JSON").clicked() {
                    self.export_json();
                    ui.close();
                }
                if ui.button("SVG").clicked() {
                    self.export_svg();
                    ui.close();
                }
                if ui.button("PNG").clicked() {
                    self.export_png();
                    ui.close();
                }
            });

            ui.separator();
            ui.weak(&self.doc_id);
            if let Some(status) = &self.status {
                ui.separator();
                ui.weak(status);
            }
        });
        go_home
    }

    fn show_style_controls(&mut self, ui: &mut egui::Ui) {
        let style = &mut self.board.tools.current_style;

        let mut stroke_rgb = [
            style.stroke_color.r,
            style.stroke_color.g,
            style.stroke_color.b,
        ];
        ui.label("Stroke");
        if ui.color_edit_button_srgb(&mut stroke_rgb).changed() {
            style.stroke_color =
                SerializableColor::new(stroke_rgb[0], stroke_rgb[1], stroke_rgb[2], 255);
        }

        let mut width = style.stroke_width as f32;
        if ui
            .add(egui::DragValue::new(&mut width).range(0.0..=32.0).speed(0.5))
            .changed()
        {
            style.stroke_width = width as f64;
        }

        let mut has_fill = style.fill_color.is_some();
        if ui.checkbox(&mut has_fill, "Fill").changed() {
            style.fill_color = has_fill.then(ShapeStyle::default_fill);
        }
        if let Some(fill) = &mut style.fill_color {
            let mut fill_rgb = [fill.r, fill.g, fill.b];
            if ui.color_edit_button_srgb(&mut fill_rgb).changed() {
                *fill = SerializableColor::new(fill_rgb[0], fill_rgb[1], fill_rgb[2], 255);
            }
        }

        if ui
            .add_enabled(
                self.board.scene.selected().is_some(),
                egui::Button::new("Apply"),
            )
            .on_hover_text("Apply the current style to the selected object")
            .clicked()
        {
            self.board.apply_style_to_selection();
        }
    }

    fn show_canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::from_gray(235)))
            .show(ctx, |ui| {
                let avail = ui.available_size();
                let content_max_x = self
                    .board
                    .scene
                    .content_bounds()
                    .map_or(0.0, |b| b.x1.max(0.0));
                self.board.viewport.set_visible_size(
                    Size::new(avail.x as f64, avail.y as f64),
                    content_max_x,
                );

                let pan = self.board.viewport.pan;
                let scroll = egui::ScrollArea::both()
                    .id_salt("canvas")
                    .scroll_offset(egui::vec2(-pan.x as f32, -pan.y as f32))
                    .show(ui, |ui| {
                        let zoom = self.board.viewport.zoom as f32;
                        let desired = egui::vec2(
                            (self.board.viewport.surface_width * self.board.viewport.zoom)
                                as f32,
                            (self.board.viewport.surface_height * self.board.viewport.zoom)
                                as f32,
                        );
                        let (response, painter) =
                            ui.allocate_painter(desired, egui::Sense::click_and_drag());

                        painter.rect_filled(response.rect, 0.0, egui::Color32::WHITE);
                        paint::paint_scene(&painter, response.rect.min, zoom, &self.board);
                        self.handle_pointer(&response, response.rect.min);
                    });

                // The scroll position is the source of truth for the pan;
                // hand-tool drags are folded back in afterwards.
                self.board.viewport.pan = Vec2::new(
                    -(scroll.state.offset.x as f64),
                    -(scroll.state.offset.y as f64),
                );
                self.board.viewport.pan_by(self.pan_delta);
                if !self.board.tools.is_panning() {
                    self.board.viewport.clamp_pan();
                }
            });
    }

    fn handle_pointer(&mut self, response: &egui::Response, origin: egui::Pos2) {
        let tool = self.board.tools.current_tool;
        response.clone().on_hover_cursor(cursor_icon(
            tool.cursor(self.board.tools.is_panning()),
        ));

        let Some(pos) = response.interact_pointer_pos() else {
            return;
        };
        let zoom = self.board.viewport.zoom;
        let world = Point::new(
            (pos.x - origin.x) as f64 / zoom,
            (pos.y - origin.y) as f64 / zoom,
        );

        match tool {
            ToolKind::Select => {
                if response.drag_started() || response.clicked() {
                    self.board.click_at(world);
                    self.drag_world_last = Some(world);
                }
                if response.dragged() {
                    if let (Some(last), Some(id)) =
                        (self.drag_world_last, self.board.scene.selected())
                    {
                        let delta = world - last;
                        // Live feedback only; the edit is committed (and
                        // snapped) once on release.
                        self.board.scene.modify_shape(id, |s| s.translate(delta));
                        self.board.scene.take_events();
                        self.drag_world_last = Some(world);
                    }
                }
                if response.drag_stopped()
                    && self.drag_world_last.take().is_some()
                    && self.board.scene.selected().is_some()
                {
                    self.board.move_selection(Vec2::ZERO);
                }
                if response.double_clicked() {
                    if let Some(id) = self.board.scene.selected() {
                        if let Some(Shape::Text(text)) = self.board.scene.shape(id) {
                            self.editing_text = Some((id, text.content.clone()));
                        }
                    }
                }
            }
            ToolKind::Hand => {
                if response.drag_started() {
                    self.board.tools.begin_pan();
                }
                if response.dragged() {
                    let d = response.drag_delta();
                    self.pan_delta += Vec2::new(d.x as f64, d.y as f64);
                }
                if response.drag_stopped() {
                    self.board.tools.end_pan();
                }
            }
            ToolKind::Pen => {
                if response.drag_started() {
                    self.board.stroke_begin(world);
                } else if response.dragged() {
                    self.board.stroke_extend(world);
                }
                if response.drag_stopped() {
                    self.board.stroke_finish();
                }
            }
            _ => {}
        }
    }

    fn show_text_editor(&mut self, ctx: &egui::Context) {
        let Some((id, mut buffer)) = self.editing_text.take() else {
            return;
        };
        let mut open = true;
        let mut commit = false;
        let mut cancel = false;
        egui::Window::new("Edit text")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.text_edit_multiline(&mut buffer);
                ui.horizontal(|ui| {
                    if ui.button("Apply").clicked() {
                        commit = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        if commit {
            let content = buffer;
            self.board.scene.modify_shape(id, |shape| {
                if let Shape::Text(text) = shape {
                    text.content = content;
                }
            });
            self.board.sync();
        } else if open && !cancel {
            self.editing_text = Some((id, buffer));
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context, store: &dyn DocumentStore) {
        use egui::{Key, Modifiers};

        let mut undo = false;
        let mut redo = false;
        let mut save = false;
        let mut delete = false;
        let typing = ctx.memory(|m| m.focused().is_some());
        ctx.input_mut(|i| {
            undo = i.consume_key(Modifiers::COMMAND, Key::Z);
            redo = i.consume_key(Modifiers::COMMAND | Modifiers::SHIFT, Key::Z)
                || i.consume_key(Modifiers::COMMAND, Key::Y);
            save = i.consume_key(Modifiers::COMMAND, Key::S);
            if !typing {
                delete = i.consume_key(Modifiers::NONE, Key::Delete)
                    || i.consume_key(Modifiers::NONE, Key::Backspace);
            }
        });

        if undo {
            let result = self.board.undo().err();
            self.report(result);
        }
        if redo {
            let result = self.board.redo().err();
            self.report(result);
        }
        if save {
            self.save(store);
        }
        if delete && self.editing_text.is_none() {
            self.board.delete_selection();
        }
    }

    fn save(&mut self, store: &dyn DocumentStore) {
        self.status = Some("Saving…".to_string());
        match pollster::block_on(self.board.save(store, &self.doc_id)) {
            Ok(()) => self.status = Some("Saved".to_string()),
            Err(e) => {
                log::error!("save failed: {}", e);
                self.status = Some(format!("Save failed: {}", e));
            }
        }
    }

    fn import_json(&mut self) {
        let Some((text, path)) = file_ops::import_json() else {
            return;
        };
        match self.board.import_json(&text) {
            Ok(()) => self.status = Some(format!("Imported {}", path.display())),
            Err(e) => self.status = Some(format!("Import failed: {}", e)),
        }
    }

    fn export_json(&mut self) {
        match export::scene_to_json(&self.board.scene) {
            Ok(text) => file_ops::export_text(&self.doc_id, "json", &text),
            Err(e) => self.status = Some(format!("Export failed: {}", e)),
        }
    }

    fn export_svg(&mut self) {
        match export::scene_to_svg(&self.board.scene) {
            Ok(text) => file_ops::export_text(&self.doc_id, "svg", &text),
            Err(e) => self.status = Some(format!("Export failed: {}", e)),
        }
    }

    fn export_png(&mut self) {
        match export::scene_to_png(&self.board.scene) {
            Ok(bytes) => file_ops::export_bytes(&self.doc_id, "png", &bytes),
            Err(e) => self.status = Some(format!("Export failed: {}", e)),
        }
    }

    fn report(&mut self, error: Option<inkboard_core::BoardError>) {
        if let Some(e) = error {
            log::error!("{}", e);
            self.status = Some(e.to_string());
        }
    }
}

fn cursor_icon(style: CursorStyle) -> egui::CursorIcon {
    match style {
        CursorStyle::Default => egui::CursorIcon::Default,
        CursorStyle::Grab => egui::CursorIcon::Grab,
        CursorStyle::Grabbing => egui::CursorIcon::Grabbing,
        CursorStyle::Crosshair => egui::CursorIcon::Crosshair,
    }
}
