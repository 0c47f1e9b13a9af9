//! # Core Runtime
//!
//! Shared runtime infrastructure for the Lyrics Companion Core:
//!
//! - [`events`] - typed event bus connecting core modules to host UIs
//! - [`config`] - validated configuration holding the injected bridges and
//!   streaming vendor settings
//! - [`logging`] - `tracing` subscriber setup
//!
//! Every other core crate builds on this one; none of them install global
//! state except through [`logging::init_logging`].

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder, StreamingConfig};
pub use error::{CoreError, Result};
pub use events::{AuthEvent, CoreEvent, EventBus, EventSeverity, PlaybackEvent};
pub use logging::{init_logging, LogFormat, LoggingConfig};
