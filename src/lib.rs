//! Mock-API hub: a fleet of per-API HTTP listeners plus a control-plane listener for
//! introspection and live reload.
//!
//! See `hub::HubController` for the entry point used by `main.rs`.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fileio;
pub mod hub;
pub mod loader;
pub mod logging;
pub mod server;
pub mod trie;
pub mod url;

pub use error::{HubError, HubResult};
pub use hub::HubController;
