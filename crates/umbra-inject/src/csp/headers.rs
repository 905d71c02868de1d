use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{rewrite_header_value, CspError};

pub const CSP_HEADER: &str = "content-security-policy";

/// A response header as seen by the interception hook. The value arrives
/// either as text or as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseHeader {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_value: Option<Vec<u8>>,
}

impl ResponseHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            binary_value: None,
        }
    }

    fn text(&self) -> Result<String, CspError> {
        if let Some(value) = &self.value {
            return Ok(value.clone());
        }
        match &self.binary_value {
            Some(bytes) => String::from_utf8(bytes.clone())
                .map_err(|_| CspError::InvalidEncoding(self.name.clone())),
            None => Err(CspError::MissingValue(self.name.clone())),
        }
    }
}

/// The hook's answer. `response_headers: None` leaves the response alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<Vec<ResponseHeader>>,
}

impl HeaderPatch {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn is_unchanged(&self) -> bool {
        self.response_headers.is_none()
    }
}

/// Rewrite every CSP header in `headers`.
///
/// Never fails: if any CSP header cannot be handled, the error is logged
/// and the response passes through unmodified.
pub fn patch_response_headers(headers: &[ResponseHeader]) -> HeaderPatch {
    match try_patch(headers) {
        Ok(Some(headers)) => HeaderPatch {
            response_headers: Some(headers),
        },
        Ok(None) => HeaderPatch::unchanged(),
        Err(e) => {
            error!(error = %e, "failed to patch Content-Security-Policy, passing headers through");
            HeaderPatch::unchanged()
        }
    }
}

fn try_patch(headers: &[ResponseHeader]) -> Result<Option<Vec<ResponseHeader>>, CspError> {
    let mut changed = false;
    let mut out = Vec::with_capacity(headers.len());

    for header in headers {
        if !header.name.eq_ignore_ascii_case(CSP_HEADER) {
            out.push(header.clone());
            continue;
        }
        let original = header.text()?;
        let rewritten = rewrite_header_value(&original)?;
        if rewritten != original {
            debug!(from = %original, to = %rewritten, "patched CSP header");
            changed = true;
        }
        out.push(ResponseHeader {
            name: header.name.clone(),
            value: Some(rewritten),
            binary_value: None,
        });
    }

    Ok(changed.then_some(out))
}
