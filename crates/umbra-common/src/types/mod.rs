mod changes;
mod color;

pub use changes::{PrefChange, PrefChanges};
pub use color::Color;
