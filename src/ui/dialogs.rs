use super::prompt::Prompter;
use crate::models::PatternInputs;
use crate::services::discovery::{Environment, OpenImage};
use camino::{Utf8Path, Utf8PathBuf};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Discovery environment backed by native file dialogs and console prompts.
///
/// A standalone process has no image toolkit session, so the open-image
/// registry is always empty.
pub struct DialogEnvironment<R, W> {
    prompter: RefCell<Prompter<R, W>>,
    start_dir: Utf8PathBuf,
}

impl<R: BufRead, W: Write> DialogEnvironment<R, W> {
    pub fn new(prompter: Prompter<R, W>, start_dir: Utf8PathBuf) -> Self {
        Self {
            prompter: RefCell::new(prompter),
            start_dir,
        }
    }

    fn prompt_patterns_inner(
        &self,
        defaults: &PatternInputs,
    ) -> std::io::Result<Option<PatternInputs>> {
        let mut prompter = self.prompter.borrow_mut();

        let Some(positive_file) =
            prompter.ask_pattern("Files to include", &defaults.positive_file)?
        else {
            return Ok(None);
        };
        let Some(negative_file) =
            prompter.ask_pattern("Files to exclude", &defaults.negative_file)?
        else {
            return Ok(None);
        };
        let Some(negative_dir) =
            prompter.ask_pattern("Directories to exclude", &defaults.negative_dir)?
        else {
            return Ok(None);
        };

        Ok(Some(PatternInputs {
            positive_file,
            negative_file,
            negative_dir,
        }))
    }
}

fn to_utf8(path: PathBuf) -> Option<Utf8PathBuf> {
    Utf8PathBuf::try_from(path)
        .map_err(|e| {
            tracing::error!("Failed to convert path to UTF-8: {}", e);
            e
        })
        .ok()
}

fn to_utf8_all(paths: Vec<PathBuf>) -> Vec<Utf8PathBuf> {
    paths.into_iter().filter_map(to_utf8).collect()
}

impl<R: BufRead, W: Write> Environment for DialogEnvironment<R, W> {
    fn open_images(&self) -> Vec<OpenImage> {
        Vec::new()
    }

    fn current_image(&self) -> Option<OpenImage> {
        None
    }

    fn start_dir(&self) -> Utf8PathBuf {
        self.start_dir.clone()
    }

    fn choose_files(&self, start_dir: &Utf8Path) -> Option<Vec<Utf8PathBuf>> {
        FileDialog::new()
            .set_title("Select images of the channel to edit")
            .set_directory(start_dir)
            .add_filter("TIFF images", &["tif", "tiff"])
            .add_filter("All files", &["*"])
            .pick_files()
            .map(to_utf8_all)
    }

    fn choose_list_file(&self, start_dir: &Utf8Path) -> Option<Utf8PathBuf> {
        FileDialog::new()
            .set_title("Select the list of images (txt)")
            .set_directory(start_dir)
            .add_filter("Text files", &["txt"])
            .add_filter("All files", &["*"])
            .pick_file()
            .and_then(to_utf8)
    }

    fn choose_directories(&self, start_dir: &Utf8Path) -> Option<Vec<Utf8PathBuf>> {
        FileDialog::new()
            .set_title("Select directories to scan")
            .set_directory(start_dir)
            .pick_folders()
            .map(to_utf8_all)
    }

    fn choose_output_dir(&self, start_dir: &Utf8Path) -> Option<Utf8PathBuf> {
        FileDialog::new()
            .set_title("Select the output directory")
            .set_directory(start_dir)
            .pick_folder()
            .and_then(to_utf8)
    }

    fn prompt_patterns(&self, defaults: &PatternInputs) -> Option<PatternInputs> {
        self.prompt_patterns_inner(defaults).unwrap_or_else(|e| {
            tracing::error!("Failed to read pattern input: {}", e);
            None
        })
    }
}

/// Show a blocking native error dialog
pub fn show_error_dialog(title: &str, message: &str) {
    let _ = MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(title)
        .set_description(message)
        .set_buttons(MessageButtons::Ok)
        .show();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatternInput;
    use std::io::Cursor;

    fn environment(input: &str) -> DialogEnvironment<Cursor<Vec<u8>>, Vec<u8>> {
        DialogEnvironment::new(
            Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new()),
            Utf8PathBuf::from("/data"),
        )
    }

    #[test]
    fn test_no_open_images_outside_a_toolkit() {
        let env = environment("");

        assert!(env.open_images().is_empty());
        assert!(env.current_image().is_none());
        assert_eq!(env.start_dir(), Utf8PathBuf::from("/data"));
    }

    #[test]
    fn test_prompt_patterns_prefilled() {
        let env = environment("\n\n\n\n742\n\n");

        let patterns = env.prompt_patterns(&PatternInputs::default()).unwrap();

        assert_eq!(patterns.positive_file, PatternInput::literal(""));
        assert_eq!(patterns.negative_file, PatternInput::literal(""));
        assert_eq!(patterns.negative_dir, PatternInput::literal("742"));
    }

    #[test]
    fn test_prompt_patterns_cancelled_midway() {
        let env = environment("_C3.tif\nn\n");

        assert!(env.prompt_patterns(&PatternInputs::default()).is_none());
    }
}
