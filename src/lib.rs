//! Workspace facade crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (e.g., `core-auth`, `core-playback`, `core-catalog`).
//! Host applications can depend on `lcc-workspace` and enable the documented
//! features without needing to wire each crate individually.

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;
#[cfg(feature = "core-only")]
pub use core_auth;
#[cfg(feature = "core-only")]
pub use core_catalog;
#[cfg(feature = "core-only")]
pub use core_playback;
#[cfg(feature = "core-only")]
pub use core_runtime;
