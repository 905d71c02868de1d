use super::*;

#[test]
fn hex_forms() {
    assert_eq!(
        parse_color("#7fd7ff").unwrap(),
        Color::from_rgba(0x7f, 0xd7, 0xff, 255)
    );
    assert_eq!(parse_color(" #f00 ").unwrap(), Color::from_rgba(255, 0, 0, 255));
    assert_eq!(parse_color("#8080ff80").unwrap().a, 0x80);
}

#[test]
fn functional_forms() {
    assert_eq!(
        parse_color("rgb(10, 20, 30)").unwrap(),
        Color::from_rgba(10, 20, 30, 255)
    );
    assert_eq!(parse_color("rgba(0,0,0,0.5)").unwrap().a, 128);
    assert_eq!(parse_color("rgba(0,0,0,64)").unwrap().a, 64);
}

#[test]
fn rejects_malformed_colors() {
    for bad in [
        "",
        "white",
        "#xyz",
        "#12345",
        "rgba(300,0,0,1.0)",
        "rgba(0,0,0,1.5)",
        "rgb(10,20)",
    ] {
        assert!(parse_color(bad).is_err(), "{bad:?} should not parse");
        assert!(!validate_color(bad));
    }
}

#[test]
fn error_names_the_notation() {
    let err = parse_color("#12345").unwrap_err().to_string();
    assert!(err.contains("hex"), "{err}");
    let err = parse_color("hsl(0, 0%, 0%)").unwrap_err().to_string();
    assert!(err.contains("unrecognized"), "{err}");
}

#[test]
fn dark_background_detection() {
    assert!(is_dark_background("#000000", "#ffffff").unwrap());
    assert!(!is_dark_background("#ffffff", "#000000").unwrap());
    assert!(!is_dark_background("#808080", "#808080").unwrap());
    assert!(is_dark_background("#000", "bogus").is_err());
}
