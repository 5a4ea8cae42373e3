//! Task discovery - turns a [`ProcessingConfiguration`] into a [`TaskRegistry`].
//!
//! Five selection strategies are supported (see [`SelectionMode`]):
//!
//! | Mode            | Source of tasks                                            |
//! |-----------------|------------------------------------------------------------|
//! | ActiveImage     | the image currently active in the host toolkit             |
//! | AllOpenImages   | every open image, in the toolkit's order                   |
//! | ManualFiles     | a multi-file chooser                                       |
//! | ListFile        | a `.txt` file with one image path per line                 |
//! | PatternMatch    | a recursive scan of chosen roots filtered by name patterns |
//!
//! Everything interactive (choosers, the pattern prompt, the open image list)
//! goes through the [`Environment`] trait so discovery can be driven by the
//! native dialogs in [`crate::ui`] or by a scripted fake in tests.
//!
//! The recursive scan uses an explicit LIFO stack seeded with the chosen
//! roots. Directories whose name matches the negative directory pattern are
//! never entered. Symbolic links are followed and there is no cycle
//! protection.

use crate::models::{
    ConfigError, OutputLocation, PatternInputs, PatternSet, ProcessingConfiguration,
    SelectionMode, Task, TaskRegistry,
};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use std::fs;
use std::io;
use thiserror::Error;

/// An image currently open in the host toolkit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenImage {
    /// Window title shown by the toolkit
    pub title: String,

    /// File the image was loaded from, `None` for unsaved images
    pub origin: Option<Utf8PathBuf>,
}

impl OpenImage {
    pub fn new(title: impl Into<String>, origin: Option<Utf8PathBuf>) -> Self {
        Self {
            title: title.into(),
            origin,
        }
    }

    fn to_task(&self) -> Result<Task, DiscoveryError> {
        self.origin
            .as_deref()
            .and_then(Task::from_path)
            .ok_or_else(|| DiscoveryError::ImageNotOnDisk(self.title.clone()))
    }
}

/// Interactive collaborators needed by discovery.
///
/// Every chooser returns `None` when the operator cancels.
#[cfg_attr(test, mockall::automock)]
pub trait Environment {
    /// Images open in the host toolkit, in its native order
    fn open_images(&self) -> Vec<OpenImage>;

    /// The toolkit's active image
    fn current_image(&self) -> Option<OpenImage>;

    /// Directory the choosers start in when nothing better is known
    fn start_dir(&self) -> Utf8PathBuf;

    /// Multi-select file chooser
    fn choose_files(&self, start_dir: &Utf8Path) -> Option<Vec<Utf8PathBuf>>;

    /// Single file chooser for the task list
    fn choose_list_file(&self, start_dir: &Utf8Path) -> Option<Utf8PathBuf>;

    /// Multi-select directory chooser for scan roots
    fn choose_directories(&self, start_dir: &Utf8Path) -> Option<Vec<Utf8PathBuf>>;

    /// Directory chooser for the consolidated output folder
    fn choose_output_dir(&self, start_dir: &Utf8Path) -> Option<Utf8PathBuf>;

    /// Secondary prompt for the scan patterns, prefilled with `defaults`
    fn prompt_patterns(&self, defaults: &PatternInputs) -> Option<PatternInputs>;
}

/// Errors that abort discovery (and therefore the whole run)
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Configuration cancelled by user")]
    ConfigurationCancelled,

    #[error("No image open")]
    NoImageOpen,

    #[error("Image '{0}' was not loaded from a file")]
    ImageNotOnDisk(String),

    #[error("List file not found: {0}")]
    ListFileNotFound(Utf8PathBuf),

    #[error("Invalid list file {path}: {reason}")]
    InvalidListFile { path: Utf8PathBuf, reason: String },

    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

/// Build the task registry for `config`.
///
/// Runs exactly one selection strategy, then resolves where outputs go.
///
/// # Errors
///
/// Any [`DiscoveryError`]; nothing has been processed when one is returned.
pub fn discover(
    config: &ProcessingConfiguration,
    env: &dyn Environment,
) -> Result<TaskRegistry, DiscoveryError> {
    tracing::info!("Discovering tasks using '{}'", config.selection_mode());

    let tasks = match config.selection_mode() {
        SelectionMode::ActiveImage => vec![active_image_task(env)?],
        SelectionMode::AllOpenImages => all_open_image_tasks(env)?,
        SelectionMode::ManualFiles => manual_file_tasks(env),
        SelectionMode::ListFile => list_file_tasks(env)?,
        SelectionMode::PatternMatch => pattern_match_tasks(&config.pattern_prompt_defaults(), env)?,
    };

    let output = resolve_output_location(config, &tasks, env)?;

    tracing::info!("Discovered {} tasks (output: {:?})", tasks.len(), output);

    Ok(TaskRegistry::new(tasks, output))
}

fn active_image_task(env: &dyn Environment) -> Result<Task, DiscoveryError> {
    let image = env.current_image().ok_or(DiscoveryError::NoImageOpen)?;
    image.to_task()
}

fn all_open_image_tasks(env: &dyn Environment) -> Result<Vec<Task>, DiscoveryError> {
    let images = env.open_images();

    match images.len() {
        0 => Err(DiscoveryError::NoImageOpen),
        1 => Ok(vec![active_image_task(env)?]),
        _ => Ok(images
            .iter()
            .filter_map(|image| match image.to_task() {
                Ok(task) => Some(task),
                Err(e) => {
                    tracing::warn!("Skipping open image: {}", e);
                    None
                }
            })
            .collect()),
    }
}

fn manual_file_tasks(env: &dyn Environment) -> Vec<Task> {
    let Some(files) = env.choose_files(&env.start_dir()) else {
        tracing::info!("File selection cancelled - no tasks");
        return Vec::new();
    };

    files
        .iter()
        .filter_map(|path| {
            let task = Task::from_path(path);
            if task.is_none() {
                tracing::warn!("Ignoring selection without a file name: {}", path);
            }
            task
        })
        .collect()
}

/// Prompt for a `.txt` task list until a readable one is chosen.
fn list_file_tasks(env: &dyn Environment) -> Result<Vec<Task>, DiscoveryError> {
    let mut start = env.start_dir();

    loop {
        let chosen = env
            .choose_list_file(&start)
            .ok_or(DiscoveryError::ConfigurationCancelled)?;

        if let Some(parent) = chosen.parent() {
            start = parent.to_path_buf();
        }

        if !is_txt(&chosen) {
            tracing::warn!("{} is not a .txt file - choose again", chosen);
            continue;
        }

        match read_task_list(&chosen) {
            Ok(tasks) => {
                tracing::info!("Read {} tasks from {}", tasks.len(), chosen);
                return Ok(tasks);
            }
            Err(e) => tracing::warn!("{} - choose again", e),
        }
    }
}

fn is_txt(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

/// Read a task list file.
///
/// # Errors
///
/// - [`DiscoveryError::ListFileNotFound`] if the file does not exist
/// - [`DiscoveryError::InvalidListFile`] if it cannot be read as UTF-8 text
pub fn read_task_list(path: &Utf8Path) -> Result<Vec<Task>, DiscoveryError> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DiscoveryError::ListFileNotFound(path.to_path_buf()),
        _ => DiscoveryError::InvalidListFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    Ok(parse_task_list(&content))
}

/// Parse task list content, one path per line. Blank lines are ignored.
pub fn parse_task_list(content: &str) -> Vec<Task> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(split_list_line)
        .collect()
}

/// Split a list line at its last `/` or `\`.
///
/// A line without any separator yields an empty parent directory. Root
/// parents (`/`, `C:\`) keep their separator.
pub fn split_list_line(line: &str) -> Task {
    match line.rfind(['/', '\\']) {
        Some(0) => Task::new(&line[1..], &line[..1]),
        // "C:" alone would be drive-relative
        Some(i) if line[..i].ends_with(':') => Task::new(&line[i + 1..], &line[..=i]),
        Some(i) => Task::new(&line[i + 1..], &line[..i]),
        None => Task::new(line, ""),
    }
}

fn pattern_match_tasks(
    defaults: &PatternInputs,
    env: &dyn Environment,
) -> Result<Vec<Task>, DiscoveryError> {
    let roots = env.choose_directories(&env.start_dir()).unwrap_or_default();
    if roots.is_empty() {
        tracing::info!("No root directory chosen - no tasks");
        return Ok(Vec::new());
    }

    let inputs = env
        .prompt_patterns(defaults)
        .ok_or(DiscoveryError::ConfigurationCancelled)?;

    // Regex inputs are validated before any directory is listed
    let patterns = inputs.compile()?;

    tracing::info!(
        "Pattern matching in {} root(s): positive={:?}, negative file={:?}, negative dir={:?}",
        roots.len(),
        patterns.positive_file,
        patterns.negative_file,
        patterns.negative_dir
    );

    Ok(walk_pattern_tree(&roots, &patterns))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Directory,
    File,
    Other,
}

struct DirEntry {
    name: String,
    path: Utf8PathBuf,
    kind: EntryKind,
}

/// Recursively collect files under `roots` accepted by `patterns`.
///
/// Depth-first with an explicit stack: the most recently pushed directory is
/// listed next. Inside a directory, entries are visited in name order.
/// Unreadable directories are logged and skipped. A file reachable from
/// several (overlapping) roots is reported once, at its first position.
pub fn walk_pattern_tree(roots: &[Utf8PathBuf], patterns: &PatternSet) -> Vec<Task> {
    let mut stack: Vec<Utf8PathBuf> = roots.to_vec();
    let mut found: IndexSet<Task> = IndexSet::new();

    while let Some(dir) = stack.pop() {
        let entries = match list_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Cannot list {}: {}", dir, e);
                continue;
            }
        };

        for entry in entries {
            match entry.kind {
                EntryKind::Directory => {
                    if patterns.descends_into(&entry.name) {
                        stack.push(entry.path);
                    } else {
                        tracing::debug!("Pruned directory {}", entry.path);
                    }
                }
                EntryKind::File => {
                    if patterns.accepts_file(&entry.name) {
                        found.insert(Task::new(entry.name, dir.clone()));
                    }
                }
                EntryKind::Other => {}
            }
        }
    }

    found.into_iter().collect()
}

fn list_dir(dir: &Utf8Path) -> io::Result<Vec<DirEntry>> {
    let mut entries = Vec::new();

    for entry in dir.read_dir_utf8()? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // Non UTF-8 names land here as well
                tracing::warn!("Skipping unreadable entry in {}: {}", dir, e);
                continue;
            }
        };

        // Follow symlinks like a regular directory listing would
        let kind = match fs::metadata(entry.path()) {
            Ok(meta) if meta.is_dir() => EntryKind::Directory,
            Ok(meta) if meta.is_file() => EntryKind::File,
            Ok(_) => EntryKind::Other,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", entry.path(), e);
                continue;
            }
        };

        entries.push(DirEntry {
            name: entry.file_name().to_string(),
            path: entry.path().to_path_buf(),
            kind,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Decide where outputs go, prompting for a folder if one is needed.
fn resolve_output_location(
    config: &ProcessingConfiguration,
    tasks: &[Task],
    env: &dyn Environment,
) -> Result<OutputLocation, DiscoveryError> {
    if !config.outputs_to_new_folder() {
        return Ok(OutputLocation::InPlace);
    }

    if let Some(dir) = config.fixed_output_dir() {
        return Ok(OutputLocation::Folder(dir.to_path_buf()));
    }

    if tasks.is_empty() {
        return Ok(OutputLocation::InPlace);
    }

    let start = tasks
        .first()
        .map(|task| task.parent_dir.clone())
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| env.start_dir());

    env.choose_output_dir(&start)
        .map(OutputLocation::Folder)
        .ok_or(DiscoveryError::ConfigurationCancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PatternInput, ProcessingConfiguration};
    use tempfile::TempDir;

    fn config(mode: SelectionMode) -> ProcessingConfiguration {
        ProcessingConfiguration::builder()
            .selection_mode(mode)
            .build()
            .unwrap()
    }

    fn mock_env() -> MockEnvironment {
        let mut env = MockEnvironment::new();
        env.expect_start_dir()
            .returning(|| Utf8PathBuf::from("/start"));
        env
    }

    fn utf8_root(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap()
    }

    fn touch(root: &Utf8Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"").unwrap();
    }

    #[test]
    fn test_active_image_without_image_fails() {
        let mut env = mock_env();
        env.expect_current_image().returning(|| None);

        let result = discover(&config(SelectionMode::ActiveImage), &env);
        assert!(matches!(result, Err(DiscoveryError::NoImageOpen)));
    }

    #[test]
    fn test_active_image_task() {
        let mut env = mock_env();
        env.expect_current_image().returning(|| {
            Some(OpenImage::new(
                "cell_C2_canny3d.tif",
                Some(Utf8PathBuf::from("/data/cell_C2_canny3d.tif")),
            ))
        });

        let registry = discover(&config(SelectionMode::ActiveImage), &env).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.tasks()[0], Task::new("cell_C2_canny3d.tif", "/data"));
    }

    #[test]
    fn test_active_image_not_on_disk() {
        let mut env = mock_env();
        env.expect_current_image()
            .returning(|| Some(OpenImage::new("Untitled", None)));

        let result = discover(&config(SelectionMode::ActiveImage), &env);
        assert!(matches!(result, Err(DiscoveryError::ImageNotOnDisk(title)) if title == "Untitled"));
    }

    #[test]
    fn test_all_open_images_in_native_order() {
        let mut env = mock_env();
        env.expect_open_images().returning(|| {
            vec![
                OpenImage::new("b", Some(Utf8PathBuf::from("/d/b.tif"))),
                OpenImage::new("unsaved", None),
                OpenImage::new("a", Some(Utf8PathBuf::from("/d/a.tif"))),
            ]
        });

        let registry = discover(&config(SelectionMode::AllOpenImages), &env).unwrap();
        assert_eq!(registry.names(), vec!["b.tif", "a.tif"]);
    }

    #[test]
    fn test_all_open_images_collapses_to_active_image() {
        let mut env = mock_env();
        env.expect_open_images()
            .returning(|| vec![OpenImage::new("a", Some(Utf8PathBuf::from("/d/a.tif")))]);
        env.expect_current_image()
            .times(1)
            .returning(|| Some(OpenImage::new("a", Some(Utf8PathBuf::from("/d/a.tif")))));

        let registry = discover(&config(SelectionMode::AllOpenImages), &env).unwrap();
        assert_eq!(registry.names(), vec!["a.tif"]);
    }

    #[test]
    fn test_all_open_images_none_open() {
        let mut env = mock_env();
        env.expect_open_images().returning(Vec::new);

        let result = discover(&config(SelectionMode::AllOpenImages), &env);
        assert!(matches!(result, Err(DiscoveryError::NoImageOpen)));
    }

    #[test]
    fn test_manual_files_keep_chooser_order() {
        let mut env = mock_env();
        env.expect_choose_files().returning(|_| {
            Some(vec![
                Utf8PathBuf::from("/d/z.tif"),
                Utf8PathBuf::from("/e/a.tif"),
            ])
        });

        let registry = discover(&config(SelectionMode::ManualFiles), &env).unwrap();
        assert_eq!(registry.names(), vec!["z.tif", "a.tif"]);
        assert_eq!(registry.output_dir_for(1), Some(Utf8Path::new("/e")));
    }

    #[test]
    fn test_manual_files_cancel_yields_empty_registry() {
        let mut env = mock_env();
        env.expect_choose_files().returning(|_| None);

        let registry = discover(&config(SelectionMode::ManualFiles), &env).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_list_file_reprompts_until_valid() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        let list = root.join("tasks.txt");
        fs::write(&list, "/data/A/x_C1.tif\n\n/data/B/y_C1.tif\n").unwrap();

        let mut answers = vec![
            Some(root.join("tasks.csv")),
            Some(root.join("missing.txt")),
            Some(list.clone()),
        ]
        .into_iter();

        let mut env = mock_env();
        env.expect_choose_list_file()
            .times(3)
            .returning(move |_| answers.next().flatten());

        let registry = discover(&config(SelectionMode::ListFile), &env).unwrap();
        assert_eq!(registry.names(), vec!["x_C1.tif", "y_C1.tif"]);
        assert_eq!(registry.tasks()[1].parent_dir, Utf8PathBuf::from("/data/B"));
    }

    #[test]
    fn test_list_file_cancel_aborts() {
        let mut env = mock_env();
        env.expect_choose_list_file().returning(|_| None);

        let result = discover(&config(SelectionMode::ListFile), &env);
        assert!(matches!(result, Err(DiscoveryError::ConfigurationCancelled)));
    }

    #[test]
    fn test_read_missing_list_file() {
        let result = read_task_list(Utf8Path::new("/definitely/not/here.txt"));
        assert!(matches!(result, Err(DiscoveryError::ListFileNotFound(_))));
    }

    #[test]
    fn test_split_list_line() {
        assert_eq!(split_list_line("/data/A/x.tif"), Task::new("x.tif", "/data/A"));
        assert_eq!(split_list_line("C:\\data\\x.tif"), Task::new("x.tif", "C:\\data"));
        assert_eq!(split_list_line("/x.tif"), Task::new("x.tif", "/"));
        assert_eq!(split_list_line("C:\\x.tif"), Task::new("x.tif", "C:\\"));
        assert_eq!(split_list_line("D:/x.tif"), Task::new("x.tif", "D:/"));
        // No separator: empty parent directory
        assert_eq!(split_list_line("x.tif"), Task::new("x.tif", ""));
    }

    #[test]
    fn test_pattern_match_prunes_negative_dirs() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        touch(&root, "A/x_C1.tif");
        touch(&root, "A/x_C2.tif");
        touch(&root, "A/sub/742/y_C1.tif");
        touch(&root, "A/sub/other/y_C1.tif");

        let mut env = mock_env();
        let chosen = root.join("A");
        env.expect_choose_directories()
            .returning(move |_| Some(vec![chosen.clone()]));
        env.expect_prompt_patterns().returning(|_| {
            Some(PatternInputs {
                positive_file: PatternInput::literal("_C1"),
                negative_file: PatternInput::default(),
                negative_dir: PatternInput::literal("742"),
            })
        });

        let registry = discover(&config(SelectionMode::PatternMatch), &env).unwrap();
        let mut paths: Vec<Utf8PathBuf> = registry.iter().map(Task::main_path).collect();
        paths.sort();

        assert_eq!(
            paths,
            vec![root.join("A/sub/other/y_C1.tif"), root.join("A/x_C1.tif")]
        );
    }

    #[test]
    fn test_pattern_prompt_cancel_aborts() {
        let mut env = mock_env();
        env.expect_choose_directories()
            .returning(|_| Some(vec![Utf8PathBuf::from("/data")]));
        env.expect_prompt_patterns().returning(|_| None);

        let result = discover(&config(SelectionMode::PatternMatch), &env);
        assert!(matches!(result, Err(DiscoveryError::ConfigurationCancelled)));
    }

    #[test]
    fn test_pattern_prompt_invalid_regex_aborts_before_walk() {
        let mut env = mock_env();
        env.expect_choose_directories()
            .returning(|_| Some(vec![Utf8PathBuf::from("/does/not/matter")]));
        env.expect_prompt_patterns().returning(|_| {
            Some(PatternInputs {
                positive_file: PatternInput::regex("(broken"),
                ..PatternInputs::default()
            })
        });

        let result = discover(&config(SelectionMode::PatternMatch), &env);
        assert!(matches!(
            result,
            Err(DiscoveryError::Configuration(ConfigError::InvalidRegex { .. }))
        ));
    }

    #[test]
    fn test_pattern_prompt_prefilled_with_configuration() {
        let config = ProcessingConfiguration::builder()
            .selection_mode(SelectionMode::PatternMatch)
            .positive_file(PatternInput::literal("_C3.tif"))
            .build()
            .unwrap();

        let mut env = mock_env();
        env.expect_choose_directories()
            .returning(|_| Some(vec![Utf8PathBuf::from("/nowhere")]));
        env.expect_prompt_patterns()
            .withf(|defaults| defaults.positive_file.pattern == "_C3.tif")
            .returning(|defaults| Some(defaults.clone()));

        let registry = discover(&config, &env).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_pattern_prompt_offers_main_pattern_by_default() {
        let mut env = mock_env();
        env.expect_choose_directories()
            .returning(|_| Some(vec![Utf8PathBuf::from("/nowhere")]));
        env.expect_prompt_patterns()
            .withf(|defaults| defaults.positive_file == PatternInput::literal("_C2_canny3d.tif"))
            .times(1)
            .returning(|defaults| Some(defaults.clone()));

        let registry = discover(&config(SelectionMode::PatternMatch), &env).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_pattern_match_without_roots() {
        let mut env = mock_env();
        env.expect_choose_directories().returning(|_| None);
        env.expect_prompt_patterns().never();

        let registry = discover(&config(SelectionMode::PatternMatch), &env).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_overlapping_roots_report_files_once() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        touch(&root, "A/sub/y_C1.tif");

        let patterns = PatternInputs {
            positive_file: PatternInput::literal("_C1"),
            ..PatternInputs::default()
        }
        .compile()
        .unwrap();
        let tasks = walk_pattern_tree(&[root.join("A"), root.join("A/sub")], &patterns);

        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn test_walk_skips_missing_root() {
        let patterns = PatternInputs::default().compile().unwrap();
        let tasks = walk_pattern_tree(&[Utf8PathBuf::from("/no/such/root")], &patterns);
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_output_folder_prompt_starts_at_first_task() {
        let config = ProcessingConfiguration::builder()
            .outputs_to_new_folder(true)
            .build()
            .unwrap();

        let mut env = mock_env();
        env.expect_choose_files()
            .returning(|_| Some(vec![Utf8PathBuf::from("/data/A/x.tif")]));
        env.expect_choose_output_dir()
            .withf(|start| start == Utf8Path::new("/data/A"))
            .returning(|_| Some(Utf8PathBuf::from("/results")));

        let registry = discover(&config, &env).unwrap();
        assert_eq!(registry.output_dir_for(0), Some(Utf8Path::new("/results")));
    }

    #[test]
    fn test_output_folder_prompt_cancel_aborts() {
        let config = ProcessingConfiguration::builder()
            .outputs_to_new_folder(true)
            .build()
            .unwrap();

        let mut env = mock_env();
        env.expect_choose_files()
            .returning(|_| Some(vec![Utf8PathBuf::from("/data/A/x.tif")]));
        env.expect_choose_output_dir().returning(|_| None);

        let result = discover(&config, &env);
        assert!(matches!(result, Err(DiscoveryError::ConfigurationCancelled)));
    }

    #[test]
    fn test_fixed_output_folder_skips_prompt() {
        let config = ProcessingConfiguration::builder()
            .outputs_to_new_folder(true)
            .fixed_output_dir(Some(Utf8PathBuf::from("/fixed")))
            .build()
            .unwrap();

        let mut env = mock_env();
        env.expect_choose_files()
            .returning(|_| Some(vec![Utf8PathBuf::from("/data/A/x.tif")]));
        env.expect_choose_output_dir().never();

        let registry = discover(&config, &env).unwrap();
        assert_eq!(registry.output_dir_for(0), Some(Utf8Path::new("/fixed")));
    }
}
