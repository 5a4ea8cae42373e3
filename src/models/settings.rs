use super::configuration::{
    InputFormat, PatternInput, PatternInputs, ProcessingConfigurationBuilder, SelectionMode,
};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Default run settings loaded from `Area Selector.yaml`.
///
/// Every field is optional in the file; missing keys fall back to the
/// historical plugin defaults. The interactive dialogs use these values as
/// their prefill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub selection_mode: SelectionMode,
    pub input_format: InputFormat,

    /// Pattern of the file containing the channel to edit
    pub main_pattern: String,

    /// Pattern of the file containing the channel used to draw regions
    pub helper_pattern: String,

    /// Suffix appended to the edited file name
    pub edited_suffix: String,

    pub positive_file_pattern: String,
    pub positive_file_is_regex: bool,
    pub negative_file_pattern: String,
    pub negative_file_is_regex: bool,
    pub negative_dir_pattern: String,
    pub negative_dir_is_regex: bool,

    /// Reuse previously saved region archives instead of prompting
    pub import_existing_rois: bool,

    pub outputs_to_new_folder: bool,

    /// Consolidated output folder; prompted for when empty
    pub output_dir: String,

    /// Write debug-level logs
    pub debug_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            selection_mode: SelectionMode::ManualFiles,
            input_format: InputFormat::Tif,
            main_pattern: "_C2_canny3d.tif".to_string(),
            helper_pattern: "_C4.tif".to_string(),
            edited_suffix: "_ed".to_string(),
            positive_file_pattern: String::new(),
            positive_file_is_regex: false,
            negative_file_pattern: String::new(),
            negative_file_is_regex: false,
            negative_dir_pattern: String::new(),
            negative_dir_is_regex: false,
            import_existing_rois: false,
            outputs_to_new_folder: false,
            output_dir: String::new(),
            debug_mode: false,
        }
    }
}

impl Settings {
    /// Pattern inputs for a recursive scan
    pub fn pattern_inputs(&self) -> PatternInputs {
        PatternInputs {
            positive_file: PatternInput {
                pattern: self.positive_file_pattern.clone(),
                is_regex: self.positive_file_is_regex,
            },
            negative_file: PatternInput {
                pattern: self.negative_file_pattern.clone(),
                is_regex: self.negative_file_is_regex,
            },
            negative_dir: PatternInput {
                pattern: self.negative_dir_pattern.clone(),
                is_regex: self.negative_dir_is_regex,
            },
        }
    }

    /// Seed a configuration builder with these settings.
    pub fn to_builder(&self) -> ProcessingConfigurationBuilder {
        let fixed_output_dir = if self.output_dir.is_empty() {
            None
        } else {
            Some(Utf8PathBuf::from(&self.output_dir))
        };

        ProcessingConfigurationBuilder::default()
            .selection_mode(self.selection_mode)
            .input_format(self.input_format)
            .main_pattern(self.main_pattern.clone())
            .helper_pattern(self.helper_pattern.clone())
            .edited_suffix(self.edited_suffix.clone())
            .patterns(self.pattern_inputs())
            .import_existing_rois(self.import_existing_rois)
            .outputs_to_new_folder(self.outputs_to_new_folder)
            .fixed_output_dir(fixed_output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.selection_mode, SelectionMode::ManualFiles);
        assert_eq!(settings.main_pattern, "_C2_canny3d.tif");
        assert!(settings.positive_file_pattern.is_empty());
        assert!(!settings.import_existing_rois);
        assert!(!settings.debug_mode);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "selection_mode: pattern_match\nnegative_dir_pattern: \"742\"\n";
        let settings: Settings = serde_yaml_ng::from_str(yaml).unwrap();

        assert_eq!(settings.selection_mode, SelectionMode::PatternMatch);
        assert_eq!(settings.negative_dir_pattern, "742");
        assert_eq!(settings.helper_pattern, "_C4.tif");
    }

    #[test]
    fn test_to_builder_round_trips_into_configuration() {
        let settings = Settings {
            selection_mode: SelectionMode::ListFile,
            outputs_to_new_folder: true,
            output_dir: "/results".to_string(),
            negative_file_pattern: ".*tmp.*".to_string(),
            negative_file_is_regex: true,
            ..Settings::default()
        };

        let config = settings.to_builder().build().unwrap();
        assert_eq!(config.selection_mode(), SelectionMode::ListFile);
        assert!(config.outputs_to_new_folder());
        assert_eq!(config.fixed_output_dir().map(|p| p.as_str()), Some("/results"));
        assert_eq!(config.patterns().negative_file, PatternInput::regex(".*tmp.*"));
    }

    #[test]
    fn test_empty_output_dir_means_prompt() {
        let config = Settings::default().to_builder().build().unwrap();
        assert!(config.fixed_output_dir().is_none());
    }
}
