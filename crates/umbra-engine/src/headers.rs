//! Response-header interception for top-level navigations.

use umbra_inject::{patch_response_headers, HeaderPatch, ResponseHeader};

use crate::host::ResourceType;

/// Decide how to modify an intercepted response's headers.
///
/// Only top-level documents are patched. Runs synchronously and never
/// fails; see [`patch_response_headers`].
pub fn on_headers_received(resource: ResourceType, headers: &[ResponseHeader]) -> HeaderPatch {
    if resource != ResourceType::MainFrame {
        return HeaderPatch::unchanged();
    }
    patch_response_headers(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csp(value: &str) -> Vec<ResponseHeader> {
        vec![ResponseHeader::new("Content-Security-Policy", value)]
    }

    #[test]
    fn main_frame_headers_are_patched() {
        let patch = on_headers_received(ResourceType::MainFrame, &csp("default-src 'self'"));
        assert_eq!(
            patch.response_headers.unwrap()[0].value.as_deref(),
            Some("default-src 'self'; style-src 'self' data:")
        );
    }

    #[test]
    fn other_resources_pass_through() {
        for resource in [ResourceType::SubFrame, ResourceType::Stylesheet, ResourceType::Other] {
            assert!(on_headers_received(resource, &csp("default-src 'self'")).is_unchanged());
        }
    }

    #[test]
    fn resource_type_parses_browser_names() {
        let t: ResourceType = serde_json::from_str("\"main_frame\"").unwrap();
        assert_eq!(t, ResourceType::MainFrame);
        let t: ResourceType = serde_json::from_str("\"xmlhttprequest\"").unwrap();
        assert_eq!(t, ResourceType::Other);
    }
}
