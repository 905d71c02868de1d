//! Content-Security-Policy patching.
//!
//! Injected styles are delivered as `data:` URLs, which a page's CSP may
//! block. Response headers are rewritten so that `style-src` (or the
//! `default-src` it falls back to) also allows `data:`. Nothing else in the
//! policy is loosened.

mod headers;
mod policy;

pub use headers::{patch_response_headers, HeaderPatch, ResponseHeader, CSP_HEADER};
pub use policy::{patch_policy, rewrite_header_value, Policy};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CspError {
    #[error("header {0} has no value")]
    MissingValue(String),

    #[error("header {0} is not valid UTF-8")]
    InvalidEncoding(String),

    #[error("malformed directive name: {0:?}")]
    MalformedDirective(String),
}

#[cfg(test)]
mod tests;
