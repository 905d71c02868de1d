//! Page-side injection for Umbra.
//!
//! - [`stylesheet`]: CSS templates with placeholder substitution and
//!   frame / background-darkness branches
//! - [`bundle`]: where template text comes from (compiled in or a directory)
//! - [`csp`]: Content-Security-Policy patching so injected `data:` styles load
//! - [`script`]: the auto-running payload handed to every page
//! - [`registration`]: content-script registration and inject details

pub mod bundle;
pub mod csp;
pub mod registration;
pub mod script;
pub mod stylesheet;

pub use bundle::{BundleDir, StaticBundle, TemplateError, TemplateSource};
pub use csp::{patch_response_headers, rewrite_header_value, CspError, HeaderPatch, ResponseHeader};
pub use registration::{
    InjectDetails, ManifestContentScript, ManifestError, RunAt, ScriptRegistration, ScriptSource,
};
pub use script::InjectionPayload;
pub use stylesheet::{
    render, Background, BranchTag, FrameLevel, RenderAxes, RenderParams, StylesheetKey, Template,
};
