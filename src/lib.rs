//! Display Modes
//!
//! Save multi-monitor layouts into a handful of slots, recognise which one the
//! compositor is showing, and re-apply any of them on request. The compositor
//! is reached over its `org.gnome.Mutter.DisplayConfig` D-Bus interface.

pub mod apply;
pub mod config;
pub mod display;
pub mod error;
pub mod layout;
pub mod menu;
pub mod service;
pub mod store;
pub mod utils;

pub use apply::Orchestrator;
pub use error::{DisplayModesError, Result};
pub use layout::Layout;
pub use service::LayoutService;
