//! Colour strings as they appear in preferences.
//!
//! Hex (`#rgb`, `#rrggbb`, `#rrggbbaa`) and functional
//! (`rgb(r, g, b)`, `rgba(r, g, b, a)`) notations are understood. Named
//! CSS colours are not.

mod parse;

#[cfg(test)]
mod tests;

use umbra_common::types::Color;
use umbra_common::ConfigError;

use parse::Notation;

/// Parse a preference colour into a [`Color`].
pub fn parse_color(s: &str) -> Result<Color, ConfigError> {
    let s = s.trim();
    let notation = Notation::detect(s)
        .ok_or_else(|| ConfigError::ParseError(format!("unrecognized color format: {s:?}")))?;
    notation.read(s).ok_or_else(|| {
        ConfigError::ParseError(format!("invalid {} color: {s:?}", notation.label()))
    })
}

pub fn validate_color(s: &str) -> bool {
    parse_color(s).is_ok()
}

/// Whether a page painted `background` behind `foreground` text counts as
/// dark, i.e. the background is the less luminous of the two.
pub fn is_dark_background(background: &str, foreground: &str) -> Result<bool, ConfigError> {
    Ok(parse_color(background)?.is_darker_than(&parse_color(foreground)?))
}
