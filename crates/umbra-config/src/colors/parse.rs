//! Recognisers for the two colour notations a preference may use.

use regex::Regex;
use std::sync::LazyLock;
use umbra_common::types::Color;

/// `#` followed by 3, 6 or 8 hex digits.
static HEX_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[[:xdigit:]]{3}|[[:xdigit:]]{6}|[[:xdigit:]]{8})$").unwrap());

/// `rgb(...)` / `rgba(...)` with three channels and an optional alpha.
static FUNCTIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^rgba?\((?P<channels>\s*\d{1,3}\s*,\s*\d{1,3}\s*,\s*\d{1,3}\s*)(?:,\s*(?P<alpha>\d*\.?\d+)\s*)?\)$",
    )
    .unwrap()
});

/// Which notation a colour string is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Notation {
    Hex,
    Functional,
}

impl Notation {
    pub(super) fn detect(s: &str) -> Option<Self> {
        if s.starts_with('#') {
            Some(Notation::Hex)
        } else if s.starts_with("rgb(") || s.starts_with("rgba(") {
            Some(Notation::Functional)
        } else {
            None
        }
    }

    pub(super) fn label(self) -> &'static str {
        match self {
            Notation::Hex => "hex",
            Notation::Functional => "rgb()",
        }
    }

    pub(super) fn read(self, s: &str) -> Option<Color> {
        match self {
            Notation::Hex => read_hex(s),
            Notation::Functional => read_functional(s),
        }
    }
}

fn read_hex(s: &str) -> Option<Color> {
    if !HEX_DIGITS.is_match(s) {
        return None;
    }
    let digits = &s[1..];
    if digits.len() != 3 {
        return Color::from_hex(digits);
    }
    // Short form: each digit doubles, `#abc` == `#aabbcc`.
    let mut channels = digits
        .chars()
        .map(|c| c.to_digit(16).map(|v| (v * 0x11) as u8));
    Some(Color::from_rgba(
        channels.next()??,
        channels.next()??,
        channels.next()??,
        u8::MAX,
    ))
}

fn read_functional(s: &str) -> Option<Color> {
    let caps = FUNCTIONAL.captures(s)?;
    let channels = caps["channels"]
        .split(',')
        .map(|part| part.trim().parse::<u8>().ok())
        .collect::<Option<Vec<u8>>>()?;
    let [r, g, b] = channels[..] else {
        return None;
    };
    let a = match caps.name("alpha") {
        Some(alpha) => read_alpha(alpha.as_str())?,
        None => u8::MAX,
    };
    Some(Color::from_rgba(r, g, b, a))
}

/// Fractional alpha is CSS-style `0.0..=1.0`; whole numbers are a raw byte.
fn read_alpha(text: &str) -> Option<u8> {
    if text.contains('.') {
        let fraction: f64 = text.parse().ok()?;
        (0.0..=1.0)
            .contains(&fraction)
            .then(|| (fraction * 255.0).round() as u8)
    } else {
        text.parse::<u8>().ok()
    }
}
