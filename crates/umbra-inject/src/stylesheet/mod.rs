//! Stylesheet templates.
//!
//! A template is CSS text with `{key}` placeholders and paired branch tags
//! (`{if_toplevel_start}` ... `{if_toplevel_end}`). Rendering substitutes
//! placeholders and comments out every branch that does not apply to the
//! frame level and background darkness being rendered for.

mod params;
mod parse;
mod render;

pub use params::{Background, BranchTag, FrameLevel, RenderAxes, RenderParams, StylesheetKey};
pub use parse::Template;
pub use render::render;
