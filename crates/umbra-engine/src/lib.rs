//! Background engine for Umbra.
//!
//! Wires the preference store, the override maps and the injection
//! pieces to a browser host:
//!
//! - [`propagator`]: re-renders and re-installs the injected script
//! - [`router`]: answers requests from page contexts
//! - [`commands`]: hotkey commands
//! - [`headers`]: CSP patching for top-level navigations
//! - [`background`]: startup and the browser event loop

pub mod background;
pub mod commands;
pub mod headers;
pub mod host;
pub mod overrides;
pub mod propagator;
pub mod router;

#[cfg(test)]
pub(crate) mod testing;

pub use background::{Background, BrowserEvent};
pub use host::{Browser, MessageSender, RegisteredScript, ResourceType, TabInfo};
pub use overrides::Overrides;
pub use propagator::{CycleOutcome, PropagateError, Propagator};
pub use router::{Request, Router, RouterError};
