//! Top-level application: screen routing and the shared document store.

use crate::editor::EditorScreen;
use crate::home::{HomeAction, HomeScreen};
use inkboard_core::store::{DocumentStore, FileStore, MemoryStore};
use std::sync::Arc;

/// Which screen is showing.
enum Screen {
    Home,
    Editor(EditorScreen),
}

/// The Inkboard application.
pub struct InkboardApp {
    store: Arc<dyn DocumentStore>,
    screen: Screen,
    home: HomeScreen,
}

impl InkboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let store: Arc<dyn DocumentStore> = match FileStore::default_location() {
            Ok(store) => {
                log::info!("documents stored in {}", store.base_path().display());
                Arc::new(store)
            }
            Err(e) => {
                log::warn!("file store unavailable ({}), documents will not persist", e);
                Arc::new(MemoryStore::new())
            }
        };
        Self {
            store,
            screen: Screen::Home,
            home: HomeScreen::default(),
        }
    }

    fn open_document(&mut self, ctx: &egui::Context, id: String) {
        let visible = ctx.content_rect().size();
        let editor = EditorScreen::open(
            self.store.as_ref(),
            id,
            kurbo::Size::new(visible.x as f64, visible.y as f64),
        );
        self.screen = Screen::Editor(editor);
    }
}

impl eframe::App for InkboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match &mut self.screen {
            Screen::Home => {
                if let Some(action) = self.home.show(ctx, self.store.as_ref()) {
                    match action {
                        HomeAction::Open(id) => self.open_document(ctx, id),
                    }
                }
            }
            Screen::Editor(editor) => {
                let store = Arc::clone(&self.store);
                if editor.show(ctx, store.as_ref()) {
                    self.screen = Screen::Home;
                }
            }
        }
    }
}
