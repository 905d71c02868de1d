use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque browser tab identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u64);

impl TabId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frame identifier within a tab. Frame 0 is the top-level document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(pub u64);

impl FrameId {
    pub const TOP_LEVEL: FrameId = FrameId(0);

    pub fn is_top_level(self) -> bool {
        self == Self::TOP_LEVEL
    }
}
