//! Notices edits to the preference file made outside the application.
//!
//! Editors often save with write-then-rename, so events are debounced and
//! one signal is sent per burst.

mod preferences_watcher;


pub use preferences_watcher::PreferencesWatcher;
