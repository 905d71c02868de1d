//! Default preference file with inline documentation.

pub(crate) fn default_preferences_toml() -> String {
    r##"# Umbra preferences
# Only set what you want to change -- missing keys use defaults.

# Master switch for every page.
enabled = true

# -1 default, 0 disabled, 1 stylesheet processor, 2 simple CSS, 3 invert
default_method = 1

# default_foreground_color = "#ffffff"
# default_background_color = "#000000"
# default_link_color = "#7fd7ff"
# default_visited_color = "#ffafff"
# default_active_color = "#ff0000"
# default_selection_color = "#8080ff"

# Keep the browser's "override document colors" setting untouched.
# do_not_set_override_document_colors_to_never = false

# global_toggle_hotkey = "Ctrl+Shift+F1"
# tab_toggle_hotkey = "Ctrl+Shift+F2"

# Per-page method, keyed by URL, host or parent domain.
[configured_pages]
# "example.com" = 0
"##
    .to_string()
}
