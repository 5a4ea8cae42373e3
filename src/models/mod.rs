//! Data models for the area selector.
//!
//! - [`ProcessingConfiguration`]: validated, immutable settings of one batch run
//! - [`Settings`]: serde mirror of the configuration defaults, loaded from YAML
//! - [`Task`] / [`TaskRegistry`]: the ordered list of images a run processes
//! - [`RunState`]: progress and per-task results of a batch run
//!
//! Configuration is frozen once built; the registry is produced once by
//! discovery and only read afterwards.

pub mod configuration;
pub mod run_state;
pub mod settings;
pub mod task;

pub use run_state::{RunState, TaskStatus};

pub use configuration::{
    ConfigError, InputFormat, PatternInput, PatternInputs, PatternSet, ProcessingConfiguration,
    ProcessingConfigurationBuilder, SelectionMode,
};
pub use settings::Settings;
pub use task::{OutputLocation, Task, TaskRegistry};
