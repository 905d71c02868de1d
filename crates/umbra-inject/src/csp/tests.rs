use super::*;

fn rewrite(value: &str) -> String {
    rewrite_header_value(value).unwrap()
}

// -----------------------------------------------------------------
// Single policies
// -----------------------------------------------------------------

#[test]
fn default_src_is_copied_into_new_style_src() {
    assert_eq!(
        rewrite("default-src 'self'"),
        "default-src 'self'; style-src 'self' data:"
    );
}

#[test]
fn default_src_none_gets_data_only_style_src() {
    assert_eq!(
        rewrite("default-src 'none'"),
        "default-src 'none'; style-src data:"
    );
}

#[test]
fn style_src_with_data_is_untouched() {
    let value = "style-src 'self' data:";
    assert_eq!(rewrite(value), value);
}

#[test]
fn style_src_without_data_gets_it_appended() {
    assert_eq!(
        rewrite("script-src 'self'; style-src 'self' https://cdn.example"),
        "script-src 'self'; style-src 'self' https://cdn.example data:"
    );
}

#[test]
fn style_src_wins_over_default_src() {
    assert_eq!(
        rewrite("default-src *; style-src 'self'"),
        "default-src *; style-src 'self' data:"
    );
}

#[test]
fn default_src_allowing_data_is_untouched() {
    let value = "default-src 'self' data:; img-src *";
    assert_eq!(rewrite(value), value);
}

#[test]
fn no_style_or_default_src_is_untouched() {
    let value = "img-src 'self'; frame-ancestors 'none'";
    assert_eq!(rewrite(value), value);
}

#[test]
fn empty_directive_has_bare_name() {
    assert_eq!(
        rewrite("upgrade-insecure-requests; default-src 'self'"),
        "upgrade-insecure-requests; default-src 'self'; style-src 'self' data:"
    );
}

#[test]
fn repeated_directive_keeps_position_and_last_value() {
    assert_eq!(
        rewrite("style-src a; img-src b; style-src c"),
        "style-src c data:; img-src b"
    );
}

#[test]
fn whitespace_and_empty_directives_are_normalized_when_patched() {
    assert_eq!(
        rewrite("  default-src   'self'  ;; ;img-src *  "),
        "default-src 'self'; img-src *; style-src 'self' data:"
    );
}

#[test]
fn data_source_match_is_case_insensitive() {
    let value = "style-src DATA:";
    assert_eq!(rewrite(value), value);
}

// -----------------------------------------------------------------
// Multiple policies
// -----------------------------------------------------------------

#[test]
fn each_policy_is_patched_independently() {
    assert_eq!(
        rewrite("default-src 'self', img-src *, style-src 'none'"),
        "default-src 'self'; style-src 'self' data: , img-src * , style-src 'none' data:"
    );
}

#[test]
fn unchanged_multi_policy_value_is_returned_verbatim() {
    let value = "img-src *,  style-src data:";
    assert_eq!(rewrite(value), value);
}

#[test]
fn rewriting_is_idempotent() {
    for value in [
        "default-src 'self'",
        "default-src 'none'",
        "style-src 'self'",
        "default-src 'self', img-src *, style-src 'none'",
        "upgrade-insecure-requests; default-src https:",
    ] {
        let once = rewrite(value);
        assert_eq!(rewrite(&once), once, "{value}");
    }
}

#[test]
fn malformed_directive_is_an_error() {
    assert_eq!(
        rewrite_header_value("default-src 'self'; st<yle-src x"),
        Err(CspError::MalformedDirective("st<yle-src".into()))
    );
}

#[test]
fn directive_names_match_case_insensitively_and_keep_their_spelling() {
    let policy = Policy::parse("Default-Src 'self'").unwrap();
    assert_eq!(policy.get("default-src"), Some(&["'self'".to_string()][..]));
    assert_eq!(policy.to_string(), "Default-Src 'self'");
    assert!(Policy::parse(" ; ").unwrap().is_empty());
}

#[test]
fn patching_leaves_other_directive_spelling_alone() {
    assert_eq!(
        rewrite_header_value("Script-SRC 'self'; STYLE-SRC 'self'; Img-Src *").unwrap(),
        "Script-SRC 'self'; STYLE-SRC 'self' data:; Img-Src *"
    );
    assert_eq!(
        rewrite_header_value("DEFAULT-SRC 'none'").unwrap(),
        "DEFAULT-SRC 'none'; style-src data:"
    );
}

#[test]
fn repeated_directive_in_other_case_keeps_first_spelling() {
    let policy = Policy::parse("style-src a; img-src b; Style-Src c").unwrap();
    assert_eq!(policy.to_string(), "style-src c; img-src b");
}

// -----------------------------------------------------------------
// Header interception
// -----------------------------------------------------------------

#[test]
fn only_csp_headers_are_rewritten() {
    let headers = vec![
        ResponseHeader::new("Content-Type", "text/html"),
        ResponseHeader::new("Content-Security-Policy", "default-src 'self'"),
        ResponseHeader::new("Content-Security-Policy-Report-Only", "default-src 'self'"),
    ];
    let patch = patch_response_headers(&headers);
    let out = patch.response_headers.unwrap();

    assert_eq!(out.len(), 3);
    assert_eq!(out[0], headers[0]);
    assert_eq!(
        out[1].value.as_deref(),
        Some("default-src 'self'; style-src 'self' data:")
    );
    assert_eq!(out[1].name, "Content-Security-Policy");
    assert_eq!(out[2], headers[2]);
}

#[test]
fn nothing_to_patch_yields_empty_patch() {
    let headers = vec![
        ResponseHeader::new("content-security-policy", "style-src data:"),
        ResponseHeader::new("x-frame-options", "deny"),
    ];
    assert!(patch_response_headers(&headers).is_unchanged());
    assert!(patch_response_headers(&[]).is_unchanged());
}

#[test]
fn binary_values_are_decoded() {
    let headers = vec![ResponseHeader {
        name: "content-security-policy".into(),
        value: None,
        binary_value: Some(b"default-src 'none'".to_vec()),
    }];
    let out = patch_response_headers(&headers).response_headers.unwrap();
    assert_eq!(out[0].value.as_deref(), Some("default-src 'none'; style-src data:"));
    assert_eq!(out[0].binary_value, None);
}

#[test]
fn failures_pass_headers_through() {
    let missing = vec![ResponseHeader {
        name: "content-security-policy".into(),
        value: None,
        binary_value: None,
    }];
    assert!(patch_response_headers(&missing).is_unchanged());

    let invalid = vec![ResponseHeader {
        name: "content-security-policy".into(),
        value: None,
        binary_value: Some(vec![0xff, 0xfe]),
    }];
    assert!(patch_response_headers(&invalid).is_unchanged());

    let malformed = vec![ResponseHeader::new("content-security-policy", "default-src 'self'; a{b")];
    assert!(patch_response_headers(&malformed).is_unchanged());
}

#[test]
fn patch_serializes_camel_case() {
    let patch = patch_response_headers(&[ResponseHeader::new(
        "content-security-policy",
        "default-src 'none'",
    )]);
    let json = serde_json::to_value(&patch).unwrap();
    assert_eq!(
        json["responseHeaders"][0]["value"],
        "default-src 'none'; style-src data:"
    );
    assert_eq!(serde_json::to_value(HeaderPatch::unchanged()).unwrap(), serde_json::json!({}));
}
