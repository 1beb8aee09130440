//! startpage-app - View state and orchestration for the start page
//!
//! This crate implements the TEA (The Elm Architecture) pattern for the view
//! state machine, the settings synchronizer, the ViewController that binds
//! them to the channel, the Engine that drives everything, and configuration
//! loading.

pub mod config;
pub mod controller;
pub mod engine;
pub mod engine_event;
pub mod handler;
pub mod message;
pub mod settings_sync;
pub mod state;

// Re-export primary types
pub use controller::ViewController;
pub use engine::Engine;
pub use engine_event::EngineEvent;
pub use handler::{UpdateAction, UpdateResult};
pub use message::Message;
pub use settings_sync::{SettingsState, SettingsSynchronizer};
pub use state::{ViewFlow, ViewPhase, ViewSnapshot, ViewState, DEFAULT_TAB_COUNT};
