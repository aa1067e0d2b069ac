//! Live minimap overlay for an infinite-canvas editor.
//!
//! The crate renders a miniature, clickable overview of a host canvas's nodes,
//! groups and edges, and keeps it in sync with the canvas by intercepting the
//! host's internal mutation methods. Everything here is host-agnostic and runs
//! natively: the host canvas, the overlay element and settings storage are
//! reached through the traits in [`host`]. The `overlay` crate binds those
//! traits to the browser.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`minimap`] | Overlay instance and lifecycle ([`minimap::CanvasMinimap`]) |
//! | [`intercept`] | Wrapping host canvas methods to observe mutations |
//! | [`events`] | Typed synchronous event bus |
//! | [`bounds`] | World/minimap coordinate model |
//! | [`scene`] | Pure scene renderer and scene description |
//! | [`svg`] | SVG markup surface |
//! | [`tracker`] | Per-frame viewport indicator updates |
//! | [`hit`] | Nearest-corner hit-testing |
//! | [`navigate`] | Click-to-navigation resolution |
//! | [`input`] | Modifier keys, buttons and the drag state machine |
//! | [`host`] | Host canvas, surface and overlay host interfaces |
//! | [`snapshot`] | Read-only canvas document model |
//! | [`geometry`] | `Vector2` and `BoundingBox` |
//! | [`config`] | Persisted settings |
//! | [`error`] | Error types |
//! | [`consts`] | Option defaults and interaction constants |

pub mod bounds;
pub mod config;
pub mod consts;
pub mod error;
pub mod events;
pub mod geometry;
pub mod hit;
pub mod host;
pub mod input;
pub mod intercept;
pub mod minimap;
pub mod navigate;
pub mod scene;
pub mod snapshot;
pub mod svg;
pub mod tracker;

#[cfg(test)]
mod test_support;

pub use config::MinimapSettings;
pub use error::{ConfigError, MinimapError};
pub use minimap::CanvasMinimap;
