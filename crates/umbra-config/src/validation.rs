//! Preference validation.
//!
//! Collects every problem into a single `ConfigError::ValidationError`
//! so the user sees all of them at once.

use umbra_common::ConfigError;

use crate::colors::validate_color;
use crate::methods::MethodCatalog;
use crate::schema::Preferences;

/// Run all validations on a preference set.
pub fn validate(prefs: &Preferences) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_colors(&mut errors, prefs);
    validate_methods(&mut errors, prefs, &MethodCatalog::builtin());

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_colors(errors: &mut Vec<String>, prefs: &Preferences) {
    let colors = [
        ("default_foreground_color", &prefs.default_foreground_color),
        ("default_background_color", &prefs.default_background_color),
        ("default_link_color", &prefs.default_link_color),
        ("default_visited_color", &prefs.default_visited_color),
        ("default_active_color", &prefs.default_active_color),
        ("default_selection_color", &prefs.default_selection_color),
    ];
    for (name, value) in colors {
        if !validate_color(value) {
            errors.push(format!("{name} = {value:?} is not a valid color"));
        }
    }
}

fn validate_methods(errors: &mut Vec<String>, prefs: &Preferences, catalog: &MethodCatalog) {
    if !catalog.contains(prefs.default_method) {
        errors.push(format!(
            "default_method = {} is not a known method",
            prefs.default_method
        ));
    }
    for (page, method) in &prefs.configured_pages {
        if !catalog.contains(*method) {
            errors.push(format!(
                "configured_pages.{page:?} = {method} is not a known method"
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::MethodId;

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&Preferences::default()).is_ok());
    }

    #[test]
    fn bad_color_is_reported() {
        let prefs = Preferences {
            default_link_color: "blue-ish".into(),
            ..Default::default()
        };
        let err = validate(&prefs).unwrap_err().to_string();
        assert!(err.contains("default_link_color"));
    }

    #[test]
    fn unknown_methods_are_reported() {
        let mut prefs = Preferences {
            default_method: MethodId(9),
            ..Default::default()
        };
        prefs
            .configured_pages
            .insert("example.com".into(), MethodId(12));
        let err = validate(&prefs).unwrap_err().to_string();
        assert!(err.contains("default_method = 9"));
        assert!(err.contains("\"example.com\" = 12"));
    }

    #[test]
    fn all_errors_are_collected() {
        let prefs = Preferences {
            default_foreground_color: "".into(),
            default_background_color: "nope".into(),
            default_method: MethodId(77),
            ..Default::default()
        };
        let Err(ConfigError::ValidationError(msg)) = validate(&prefs) else {
            panic!("expected validation error");
        };
        assert_eq!(msg.split("; ").count(), 3);
    }
}
