//! Output rendering: HTML report and terminal table.

pub mod html;
pub mod text;

pub use html::render_html_report;
pub use text::render_tree_text;
