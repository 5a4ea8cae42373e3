use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

/// One image to process: its file name and the directory holding it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task {
    pub file_name: String,
    pub parent_dir: Utf8PathBuf,
}

impl Task {
    pub fn new(file_name: impl Into<String>, parent_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
            parent_dir: parent_dir.into(),
        }
    }

    /// Split a full path into a task.
    ///
    /// Returns `None` for paths without a file name component (e.g. `/` or `..`).
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        let file_name = path.file_name()?;
        let parent_dir = path.parent().unwrap_or_else(|| Utf8Path::new(""));
        Some(Self::new(file_name, parent_dir))
    }

    /// Full path of the main-channel image
    pub fn main_path(&self) -> Utf8PathBuf {
        self.parent_dir.join(&self.file_name)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.main_path())
    }
}

/// Where output artifacts of a run are written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputLocation {
    /// Next to each input image
    #[default]
    InPlace,
    /// Into one consolidated directory
    Folder(Utf8PathBuf),
}

/// Ordered, read-only list of discovered tasks.
///
/// Built once by discovery; indices are stable for the lifetime of the run.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    output: OutputLocation,
}

impl TaskRegistry {
    pub fn new(tasks: Vec<Task>, output: OutputLocation) -> Self {
        Self { tasks, output }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn output_location(&self) -> &OutputLocation {
        &self.output
    }

    /// Directory receiving the outputs of task `index`.
    ///
    /// The consolidated folder when one is configured, otherwise the task's
    /// own parent directory. `None` if `index` is out of range.
    pub fn output_dir_for(&self, index: usize) -> Option<&Utf8Path> {
        let task = self.tasks.get(index)?;
        match &self.output {
            OutputLocation::Folder(dir) => Some(dir),
            OutputLocation::InPlace => Some(&task.parent_dir),
        }
    }

    /// Full path of the main image of task `index`
    pub fn main_path(&self, index: usize) -> Option<Utf8PathBuf> {
        self.tasks.get(index).map(Task::main_path)
    }

    /// File names in task order
    pub fn names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.file_name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a TaskRegistry {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
