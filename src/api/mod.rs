pub mod format;
pub mod views;

pub use format::{render_envelope, render_tree, Node, RenderError, StatusMessage};
pub use views::{render, TreeRows};
