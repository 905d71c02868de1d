//! Reading the TOML preference file, seeding a documented default on
//! first run.

mod loader;
mod paths;
mod template;

#[cfg(test)]
mod tests;

pub use loader::{load_default, load_from_path, load_or_create};
pub use paths::{create_default_preferences, default_preferences_path};
