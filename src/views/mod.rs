pub mod details_panel;
pub mod tree_browser;

pub use details_panel::details_panel;
pub use tree_browser::tree_panel;
