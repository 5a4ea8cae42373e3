use crate::services::pattern::{self, MatchPredicate, PatternError, Substitution};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// How the set of images to process is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// The image currently active in the host toolkit
    ActiveImage,
    /// Every image open in the host toolkit
    AllOpenImages,
    /// Files picked in a multi-select chooser
    #[default]
    ManualFiles,
    /// A `.txt` file listing one image path per line
    ListFile,
    /// Recursive scan of one or more root directories
    PatternMatch,
}

impl SelectionMode {
    pub const ALL: [SelectionMode; 5] = [
        SelectionMode::ActiveImage,
        SelectionMode::AllOpenImages,
        SelectionMode::ManualFiles,
        SelectionMode::ListFile,
        SelectionMode::PatternMatch,
    ];

    /// Label shown to the operator
    pub fn label(&self) -> &'static str {
        match self {
            SelectionMode::ActiveImage => "active image",
            SelectionMode::AllOpenImages => "all open images",
            SelectionMode::ManualFiles => "manual file selection",
            SelectionMode::ListFile => "use list (txt)",
            SelectionMode::PatternMatch => "pattern matching (recommended)",
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How input images are opened by the image toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// Pre-split single channel TIFF files
    #[default]
    Tif,
    /// Raw microscopy container (e.g. OIB) imported as a hyperstack
    RawMicroscopy,
}

impl InputFormat {
    pub const ALL: [InputFormat; 2] = [InputFormat::Tif, InputFormat::RawMicroscopy];
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Tif => f.write_str("Tif"),
            InputFormat::RawMicroscopy => f.write_str("raw microscopy file"),
        }
    }
}

/// A filename pattern as typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PatternInput {
    pub pattern: String,
    #[serde(default)]
    pub is_regex: bool,
}

impl PatternInput {
    pub fn literal(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            is_regex: false,
        }
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            is_regex: true,
        }
    }

    pub fn compile(&self) -> Result<MatchPredicate, PatternError> {
        pattern::compile(&self.pattern, self.is_regex)
    }
}

/// The three pattern inputs driving a recursive scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternInputs {
    /// File names that must match to be included. Left empty, the pattern
    /// prompt offers the main pattern instead.
    pub positive_file: PatternInput,
    /// File names excluded even if the positive pattern matched
    pub negative_file: PatternInput,
    /// Directory names whose whole subtree is skipped
    pub negative_dir: PatternInput,
}

impl Default for PatternInputs {
    fn default() -> Self {
        Self {
            positive_file: PatternInput::default(),
            negative_file: PatternInput::default(),
            negative_dir: PatternInput::default(),
        }
    }
}

impl PatternInputs {
    /// Compile all three inputs, reporting the first invalid one.
    pub fn compile(&self) -> Result<PatternSet, ConfigError> {
        let compile_field = |field: &'static str, input: &PatternInput| {
            input
                .compile()
                .map_err(|source| ConfigError::InvalidRegex { field, source })
        };

        Ok(PatternSet {
            positive_file: compile_field("positive file pattern", &self.positive_file)?,
            negative_file: compile_field("negative file pattern", &self.negative_file)?,
            negative_dir: compile_field("negative directory pattern", &self.negative_dir)?,
        })
    }
}

/// Compiled predicates for a recursive scan.
#[derive(Debug, Clone)]
pub struct PatternSet {
    pub positive_file: MatchPredicate,
    pub negative_file: MatchPredicate,
    pub negative_dir: MatchPredicate,
}

impl PatternSet {
    /// A file is selected iff it matches the positive and not the negative pattern.
    pub fn accepts_file(&self, name: &str) -> bool {
        self.positive_file.matches(name) && !self.negative_file.matches(name)
    }

    /// A directory is descended into unless it matches the negative directory pattern.
    pub fn descends_into(&self, name: &str) -> bool {
        !self.negative_dir.matches(name)
    }
}

/// Errors detected while building a [`ProcessingConfiguration`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Pattern of the channel to edit must not be empty")]
    EmptyMainPattern,

    #[error("Invalid {field}: {source}")]
    InvalidRegex {
        field: &'static str,
        #[source]
        source: PatternError,
    },
}

/// Immutable settings for one batch run.
///
/// Built once through [`ProcessingConfigurationBuilder`], which validates the
/// patterns, and only read afterwards.
#[derive(Debug, Clone)]
pub struct ProcessingConfiguration {
    selection_mode: SelectionMode,
    input_format: InputFormat,
    main_pattern: String,
    helper_pattern: String,
    edited_suffix: String,
    patterns: PatternInputs,
    import_existing_rois: bool,
    outputs_to_new_folder: bool,
    fixed_output_dir: Option<Utf8PathBuf>,
    main_substitution: Substitution,
}

impl ProcessingConfiguration {
    pub fn builder() -> ProcessingConfigurationBuilder {
        ProcessingConfigurationBuilder::default()
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection_mode
    }

    pub fn input_format(&self) -> InputFormat {
        self.input_format
    }

    /// Pattern identifying the channel to edit
    pub fn main_pattern(&self) -> &str {
        &self.main_pattern
    }

    /// Pattern identifying the channel used to draw regions
    pub fn helper_pattern(&self) -> &str {
        &self.helper_pattern
    }

    pub fn edited_suffix(&self) -> &str {
        &self.edited_suffix
    }

    /// Raw pattern inputs for a recursive scan (prefill for the pattern prompt)
    pub fn patterns(&self) -> &PatternInputs {
        &self.patterns
    }

    /// Prefill for the pattern prompt.
    ///
    /// An unset positive pattern is replaced by the main pattern as a
    /// literal, so accepting the prompt selects the channel to edit.
    pub fn pattern_prompt_defaults(&self) -> PatternInputs {
        let mut defaults = self.patterns.clone();
        if defaults.positive_file.pattern.is_empty() {
            defaults.positive_file = PatternInput::literal(self.main_pattern.clone());
        }
        defaults
    }

    pub fn import_existing_rois(&self) -> bool {
        self.import_existing_rois
    }

    pub fn outputs_to_new_folder(&self) -> bool {
        self.outputs_to_new_folder
    }

    pub fn fixed_output_dir(&self) -> Option<&camino::Utf8Path> {
        self.fixed_output_dir.as_deref()
    }

    /// Literal substitution of the main pattern, used for companion names
    pub fn main_substitution(&self) -> &Substitution {
        &self.main_substitution
    }
}

/// Builder for [`ProcessingConfiguration`].
///
/// Defaults match the plugin's historical defaults.
#[derive(Debug, Clone)]
pub struct ProcessingConfigurationBuilder {
    selection_mode: SelectionMode,
    input_format: InputFormat,
    main_pattern: String,
    helper_pattern: String,
    edited_suffix: String,
    patterns: PatternInputs,
    import_existing_rois: bool,
    outputs_to_new_folder: bool,
    fixed_output_dir: Option<Utf8PathBuf>,
}

impl Default for ProcessingConfigurationBuilder {
    fn default() -> Self {
        Self {
            selection_mode: SelectionMode::default(),
            input_format: InputFormat::default(),
            main_pattern: "_C2_canny3d.tif".to_string(),
            helper_pattern: "_C4.tif".to_string(),
            edited_suffix: "_ed".to_string(),
            patterns: PatternInputs::default(),
            import_existing_rois: false,
            outputs_to_new_folder: false,
            fixed_output_dir: None,
        }
    }
}

impl ProcessingConfigurationBuilder {
    pub fn selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    pub fn input_format(mut self, format: InputFormat) -> Self {
        self.input_format = format;
        self
    }

    pub fn main_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.main_pattern = pattern.into();
        self
    }

    pub fn helper_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.helper_pattern = pattern.into();
        self
    }

    pub fn edited_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.edited_suffix = suffix.into();
        self
    }

    pub fn patterns(mut self, patterns: PatternInputs) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn positive_file(mut self, input: PatternInput) -> Self {
        self.patterns.positive_file = input;
        self
    }

    pub fn negative_file(mut self, input: PatternInput) -> Self {
        self.patterns.negative_file = input;
        self
    }

    pub fn negative_dir(mut self, input: PatternInput) -> Self {
        self.patterns.negative_dir = input;
        self
    }

    pub fn import_existing_rois(mut self, import: bool) -> Self {
        self.import_existing_rois = import;
        self
    }

    pub fn outputs_to_new_folder(mut self, enabled: bool) -> Self {
        self.outputs_to_new_folder = enabled;
        self
    }

    pub fn fixed_output_dir(mut self, dir: Option<Utf8PathBuf>) -> Self {
        self.fixed_output_dir = dir;
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyMainPattern`] if the main pattern is empty
    /// - [`ConfigError::InvalidRegex`] if any regex pattern input fails to compile
    pub fn build(self) -> Result<ProcessingConfiguration, ConfigError> {
        let main_substitution =
            Substitution::literal(&self.main_pattern).ok_or(ConfigError::EmptyMainPattern)?;

        let compiled = self.patterns.compile()?;
        if compiled.positive_file.is_nothing() && self.selection_mode == SelectionMode::PatternMatch
        {
            tracing::warn!("Positive file pattern is empty - pattern matching will select no files");
        }

        Ok(ProcessingConfiguration {
            selection_mode: self.selection_mode,
            input_format: self.input_format,
            main_pattern: self.main_pattern,
            helper_pattern: self.helper_pattern,
            edited_suffix: self.edited_suffix,
            patterns: self.patterns,
            import_existing_rois: self.import_existing_rois,
            outputs_to_new_folder: self.outputs_to_new_folder,
            fixed_output_dir: self.fixed_output_dir,
            main_substitution,
        })
    }
}
