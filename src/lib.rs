// Area Selector - batch region-of-interest selection for microscopy stacks
//
// Library crate with the discovery, processing and batch logic.
// The binary crate (main.rs) provides the console and dialog front end.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::Metrics;
pub use models::{ProcessingConfiguration, RunState, Settings, Task, TaskRegistry};
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
