// UI module - operator interaction
//
// - prompt: console questions with prefilled defaults
// - dialogs: native file choosers (rfd) implementing the discovery environment
// - configure: the main settings dialog, producing a ProcessingConfiguration

pub mod dialogs;
pub mod prompt;

pub use dialogs::{DialogEnvironment, show_error_dialog};
pub use prompt::Prompter;

use crate::models::{
    ConfigError, InputFormat, ProcessingConfiguration, SelectionMode, Settings,
};
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Failures of the main settings dialog
#[derive(Error, Debug)]
pub enum ConfigureError {
    #[error("Configuration cancelled by user")]
    Cancelled,

    #[error("Failed to read operator input: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

fn answered<T>(answer: Option<T>) -> Result<T, ConfigureError> {
    answer.ok_or(ConfigureError::Cancelled)
}

/// Ask the operator for the run settings, prefilled from `settings`.
///
/// The scan patterns are not asked here; discovery prompts for them only
/// in pattern matching mode.
pub fn configure<R: BufRead, W: Write>(
    settings: &Settings,
    prompter: &mut Prompter<R, W>,
) -> Result<ProcessingConfiguration, ConfigureError> {
    let selection_mode = answered(prompter.choose(
        "How should images be selected?",
        &SelectionMode::ALL,
        settings.selection_mode,
    )?)?;
    let input_format = answered(prompter.choose(
        "Input file type",
        &InputFormat::ALL,
        settings.input_format,
    )?)?;
    let main_pattern = answered(prompter.ask(
        "Pattern of the channel to edit",
        &settings.main_pattern,
    )?)?;
    let helper_pattern = answered(prompter.ask(
        "Pattern of the channel used to draw regions",
        &settings.helper_pattern,
    )?)?;
    let edited_suffix = answered(prompter.ask(
        "Suffix of the edited file",
        &settings.edited_suffix,
    )?)?;
    let import_existing_rois = answered(prompter.ask_bool(
        "Import saved regions when present?",
        settings.import_existing_rois,
    )?)?;
    let outputs_to_new_folder = answered(prompter.ask_bool(
        "Write outputs to a new folder?",
        settings.outputs_to_new_folder,
    )?)?;

    let config = settings
        .to_builder()
        .selection_mode(selection_mode)
        .input_format(input_format)
        .main_pattern(main_pattern)
        .helper_pattern(helper_pattern)
        .edited_suffix(edited_suffix)
        .import_existing_rois(import_existing_rois)
        .outputs_to_new_folder(outputs_to_new_folder)
        .build()?;

    tracing::info!(
        "Configured run: mode={}, format={}, main={}, helper={}",
        config.selection_mode(),
        config.input_format(),
        config.main_pattern(),
        config.helper_pattern()
    );

    Ok(config)
}
