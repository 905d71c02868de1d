pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{ConfigError, HostError, UmbraError};
pub use events::{Event, EventBus};
pub use id::{FrameId, TabId};
pub use types::{Color, PrefChange, PrefChanges};

pub type Result<T> = std::result::Result<T, UmbraError>;
