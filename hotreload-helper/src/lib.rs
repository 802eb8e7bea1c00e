//! # hotreload-helper
//!
//! Tera-based renderer for the reload helper: a tiny companion plugin that
//! registers an `obsidian://hotreload-helper` URL action which disables and
//! re-enables the plugin named in its `id` parameter.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hotreload_helper::{HelperContext, Renderer};
//!
//! fn render_helper() {
//!     if let Ok(renderer) = Renderer::new() {
//!         if let Ok(files) = renderer.render(&HelperContext::default()) {
//!             for (path, content) in files {
//!                 println!("{}: {} bytes", path.display(), content.len());
//!             }
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{HelperContext, HELPER_ACTION, HELPER_ID};
pub use engine::{HelperFile, Renderer};
pub use error::RenderError;
