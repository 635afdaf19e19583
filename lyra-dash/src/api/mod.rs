//! HTTP API handlers for lyra-dash

pub mod layout;
pub mod ui;
pub mod update;

pub use layout::get_layout;
pub use ui::{serve_app_js, serve_index};
pub use update::post_update;
