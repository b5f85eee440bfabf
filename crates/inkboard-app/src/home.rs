//! Home screen: pick an existing document or start a new one.

use inkboard_core::store::DocumentStore;

/// Action requested by the home screen.
pub enum HomeAction {
    Open(String),
}

#[derive(Default)]
pub struct HomeScreen {
    /// Document id typed into the open-by-id field.
    open_id: String,
    /// Last store error, shown inline.
    error: Option<String>,
    /// Cached document list; refreshed when None.
    documents: Option<Vec<String>>,
}

impl HomeScreen {
    pub fn show(&mut self, ctx: &egui::Context, store: &dyn DocumentStore) -> Option<HomeAction> {
        let mut action = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.heading("Inkboard");
                ui.label("A whiteboard for sketching ideas");
                ui.add_space(20.0);

                if ui.button("New canvas").clicked() {
                    let id = uuid::Uuid::new_v4().to_string();
                    self.documents = None;
                    action = Some(HomeAction::Open(id));
                }

                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    ui.label("Open by id:");
                    ui.text_edit_singleline(&mut self.open_id);
                    let id = self.open_id.trim();
                    if ui.button("Open").clicked() && !id.is_empty() {
                        action = Some(HomeAction::Open(id.to_string()));
                    }
                });

                if let Some(error) = &self.error {
                    ui.colored_label(egui::Color32::RED, error);
                }

                ui.add_space(20.0);
                ui.separator();
                ui.label("Recent documents");
            });

            let documents = match &self.documents {
                Some(docs) => docs.clone(),
                None => match pollster::block_on(store.list()) {
                    Ok(mut docs) => {
                        docs.sort();
                        self.error = None;
                        self.documents = Some(docs.clone());
                        docs
                    }
                    Err(e) => {
                        self.error = Some(format!("Could not list documents: {}", e));
                        Vec::new()
                    }
                },
            };

            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    if documents.is_empty() {
                        ui.weak("No documents yet");
                    }
                    for id in &documents {
                        ui.horizontal(|ui| {
                            if ui.button(id).clicked() {
                                action = Some(HomeAction::Open(id.clone()));
                            }
                            if ui.small_button("Delete").clicked() {
                                if let Err(e) = pollster::block_on(store.delete(id)) {
                                    self.error = Some(format!("Delete failed: {}", e));
                                }
                                self.documents = None;
                            }
                        });
                    }
                });
            });
        });

        action
    }
}
