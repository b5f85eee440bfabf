//! Main application entry point.

fn main() -> eframe::Result {
    env_logger::init();
    log::info!("Starting Inkboard");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Inkboard"),
        ..Default::default()
    };
    eframe::run_native(
        "inkboard",
        options,
        Box::new(|cc| Ok(Box::new(inkboard_app::InkboardApp::new(cc)))),
    )
}
