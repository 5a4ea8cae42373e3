//! Services - the batch ROI workflow without any front end.
//!
//! # Components
//!
//! - [`pattern`]: compiles operator patterns into match predicates and the
//!   literal substitution used to derive companion file names
//! - [`discovery`]: turns a configuration into an ordered [`TaskRegistry`]
//!   through one of five selection modes
//! - [`processing`]: per-task pipeline (open, compose, acquire regions, mask,
//!   save, close) over the [`ImageToolkit`] and [`RegionManager`] traits
//! - [`batch`]: runs every task in order and records results
//!
//! Nothing here talks to a terminal or opens a window. Interaction goes
//! through the [`Environment`], [`ImageToolkit`] and [`RegionManager`] traits.
//!
//! [`TaskRegistry`]: crate::models::TaskRegistry

pub mod batch;
pub mod discovery;
pub mod pattern;
pub mod processing;

pub use batch::{BatchRunner, RunSummary, TaskResult, stop_channel};
pub use discovery::{DiscoveryError, Environment, OpenImage, discover};
pub use processing::{
    DrawingSurface, ImageHandle, ImageToolkit, Orchestrator, OutputNames, ProcessingError,
    Region, RegionManager, SkipReason, TaskOutcome, ToolkitError,
};
