//! Inkboard application shell.

mod app;
mod editor;
mod file_ops;
mod home;
mod paint;

pub use app::InkboardApp;
