//! Native file dialogs for import and export.

use std::path::PathBuf;

/// Ask for a save path and write text contents.
pub fn export_text(default_name: &str, extension: &str, contents: &str) {
    export_bytes(default_name, extension, contents.as_bytes());
}

/// Ask for a save path and write binary contents.
pub fn export_bytes(default_name: &str, extension: &str, contents: &[u8]) {
    let Some(path) = rfd::FileDialog::new()
        .set_file_name(format!("{}.{}", default_name, extension))
        .add_filter(extension.to_uppercase(), &[extension])
        .save_file()
    else {
        return;
    };
    if let Err(e) = std::fs::write(&path, contents) {
        log::error!("Failed to write {}: {}", path.display(), e);
    } else {
        log::info!("Exported {}", path.display());
    }
}

/// Pick a JSON file and read it, returning its text and path.
pub fn import_json() -> Option<(String, PathBuf)> {
    let path = rfd::FileDialog::new()
        .add_filter("JSON", &["json"])
        .pick_file()?;
    match std::fs::read_to_string(&path) {
        Ok(text) => Some((text, path)),
        Err(e) => {
            log::error!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}
