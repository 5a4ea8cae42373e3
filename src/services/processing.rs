//! Per-task processing: open, compose, acquire regions, mask, save, close.
//!
//! The pixel work is delegated to two collaborators supplied by the host
//! image toolkit:
//!
//! - [`ImageToolkit`]: opening, saving and closing images, channel merge and
//!   maximum intensity projection
//! - [`RegionManager`]: the region (ROI) container, including the blocking
//!   "draw regions and confirm" step
//!
//! Handles are passed explicitly; there is no notion of a global "current
//! image". Every handle and the region session opened for a task are released
//! by scope guards, whatever way the task ends.
//!
//! # Control flow
//!
//! ```text
//! prepare ──► Ready(PreparedTask) ──► acquire regions ──► finish ──► Completed
//!    │                                 (operator or          │
//!    └──► Skipped (helper missing)      saved archive)       └──► Skipped (no region)
//! ```
//!
//! [`Orchestrator::process`] runs all three phases. A host that cannot block
//! while the operator draws can call [`Orchestrator::prepare`], show the
//! [`DrawingSurface`], and call [`Orchestrator::finish`] once the operator
//! confirms.

use crate::models::{InputFormat, ProcessingConfiguration, Task};
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use thiserror::Error;

/// Suffix replacing the main pattern in region archive names
pub const ROI_ARCHIVE_SUFFIX: &str = "_Rois.zip";

/// Suffix replacing the main pattern in projection names
pub const PROJECTION_SUFFIX: &str = "_zProjection.tif";

/// Extension of the edited main-channel output
pub const EDITED_EXTENSION: &str = ".tif";

/// Opaque reference to an image held by the toolkit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageHandle {
    pub id: u64,
    pub title: String,
}

impl ImageHandle {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// A region drawn by the operator, as a closed polygon in pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub vertices: Vec<(f64, f64)>,
}

impl Region {
    pub fn new(name: impl Into<String>, vertices: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            vertices,
        }
    }
}

/// What the operator looks at while drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawingSurface {
    /// Main and helper channels merged into one stack
    pub merged: ImageHandle,
    /// Maximum intensity projection of `merged`
    pub projection: ImageHandle,
}

/// Failure reported by a toolkit collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ToolkitError(pub String);

impl ToolkitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Image I/O and compositing provided by the host toolkit.
pub trait ImageToolkit {
    /// Open an image; `Ok(None)` when no file exists at `path`.
    fn open(&self, path: &Utf8Path, format: InputFormat)
    -> Result<Option<ImageHandle>, ToolkitError>;

    fn save(&self, image: &ImageHandle, path: &Utf8Path) -> Result<(), ToolkitError>;

    /// Release an image. Must tolerate being called on any open handle.
    fn close(&self, image: &ImageHandle);

    /// Merge single-channel stacks into one multi-channel stack.
    fn merge(&self, channels: &[ImageHandle]) -> Result<ImageHandle, ToolkitError>;

    fn max_intensity_projection(&self, image: &ImageHandle) -> Result<ImageHandle, ToolkitError>;
}

/// The region (ROI) container of the host toolkit.
pub trait RegionManager {
    /// Show `surface` and block until the operator confirms a set of regions.
    fn await_regions(&self, surface: &DrawingSurface) -> Result<Vec<Region>, ToolkitError>;

    /// Load a saved archive; `Ok(None)` when none exists at `path`.
    fn load_archive(&self, path: &Utf8Path) -> Result<Option<Vec<Region>>, ToolkitError>;

    fn save_archive(&self, regions: &[Region], path: &Utf8Path) -> Result<(), ToolkitError>;

    /// Combine several regions into one.
    fn union(&self, regions: &[Region]) -> Result<Region, ToolkitError>;

    /// Clear every pixel outside `region` on all planes of `image`.
    fn clear_outside(&self, image: &ImageHandle, region: &Region) -> Result<(), ToolkitError>;

    /// Store `region` with `image` so it is saved alongside it.
    fn attach(&self, image: &ImageHandle, region: &Region) -> Result<(), ToolkitError>;

    /// End the session opened for the current task.
    fn close_session(&self);
}

/// Step of the per-task pipeline, used in error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStage {
    Open,
    Compose,
    AcquireRegions,
    Mask,
    Save,
}

impl fmt::Display for TaskStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskStage::Open => "open",
            TaskStage::Compose => "compose",
            TaskStage::AcquireRegions => "acquire regions",
            TaskStage::Mask => "mask",
            TaskStage::Save => "save",
        };
        f.write_str(name)
    }
}

/// Errors that fail a single task
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Main image not found: {0}")]
    MainImageMissing(Utf8PathBuf),

    #[error("File name '{file_name}' does not contain the main pattern '{pattern}'")]
    MainPatternNotFound { file_name: String, pattern: String },

    #[error("Toolkit error during {stage}: {source}")]
    Toolkit {
        stage: TaskStage,
        #[source]
        source: ToolkitError,
    },
}

trait StageContext<T> {
    fn at(self, stage: TaskStage) -> Result<T, ProcessingError>;
}

impl<T> StageContext<T> for Result<T, ToolkitError> {
    fn at(self, stage: TaskStage) -> Result<T, ProcessingError> {
        self.map_err(|source| ProcessingError::Toolkit { stage, source })
    }
}

/// Why a task produced no output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    HelperFileMissing(Utf8PathBuf),
    NoRegionDrawn,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::HelperFileMissing(path) => write!(f, "helper image not found: {}", path),
            SkipReason::NoRegionDrawn => f.write_str("no region drawn"),
        }
    }
}

/// Files written by a completed task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTask {
    pub edited: Utf8PathBuf,
    pub projection: Utf8PathBuf,
    /// Present only when more than one region was collected
    pub roi_archive: Option<Utf8PathBuf>,
    pub region_count: usize,
    pub regions_imported: bool,
}

/// Result of a task that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed(CompletedTask),
    Skipped(SkipReason),
}

/// File names derived from a main-channel file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    /// Companion image holding the helper channel
    pub helper: String,
    /// `<name with main pattern → _Rois.zip>`
    pub roi_archive: String,
    /// `<name without extension><suffix>.tif`
    pub edited: String,
    /// `<name with main pattern → _zProjection.tif>`
    pub projection: String,
}

impl OutputNames {
    /// Derive all companion names for `file_name`.
    ///
    /// # Errors
    ///
    /// [`ProcessingError::MainPatternNotFound`] if the main pattern does not
    /// occur in `file_name`; the derived names would equal the input name.
    pub fn derive(
        file_name: &str,
        config: &ProcessingConfiguration,
    ) -> Result<Self, ProcessingError> {
        let main = config.main_substitution();
        if !main.occurs_in(file_name) {
            return Err(ProcessingError::MainPatternNotFound {
                file_name: file_name.to_string(),
                pattern: main.pattern().to_string(),
            });
        }

        let stem = file_name
            .rfind('.')
            .map_or(file_name, |dot| &file_name[..dot]);

        Ok(Self {
            helper: main.apply(file_name, config.helper_pattern()).into_owned(),
            roi_archive: main.apply(file_name, ROI_ARCHIVE_SUFFIX).into_owned(),
            edited: format!("{}{}{}", stem, config.edited_suffix(), EDITED_EXTENSION),
            projection: main.apply(file_name, PROJECTION_SUFFIX).into_owned(),
        })
    }
}

/// Closes every tracked image when dropped.
struct OpenImages<'t> {
    toolkit: &'t dyn ImageToolkit,
    handles: Vec<ImageHandle>,
}

impl<'t> OpenImages<'t> {
    fn new(toolkit: &'t dyn ImageToolkit) -> Self {
        Self {
            toolkit,
            handles: Vec::new(),
        }
    }

    fn track(&mut self, handle: ImageHandle) -> ImageHandle {
        self.handles.push(handle.clone());
        handle
    }
}

impl Drop for OpenImages<'_> {
    fn drop(&mut self) {
        for handle in self.handles.drain(..).rev() {
            tracing::debug!("Closing image {} ({})", handle.title, handle.id);
            self.toolkit.close(&handle);
        }
    }
}

/// Ends the region session when dropped.
struct RegionSession<'r> {
    regions: &'r dyn RegionManager,
}

impl Drop for RegionSession<'_> {
    fn drop(&mut self) {
        self.regions.close_session();
    }
}

/// Where the regions of a prepared task come from
#[derive(Debug, Clone, PartialEq)]
pub enum RegionSource {
    /// A saved archive was found and loaded
    Imported(Vec<Region>),
    /// The operator has to draw them
    Operator,
}

/// A task whose images are open and composed, waiting for regions.
///
/// Dropping it releases every image and the region session.
pub struct PreparedTask<'a> {
    task: Task,
    output_dir: Utf8PathBuf,
    names: OutputNames,
    main: ImageHandle,
    surface: DrawingSurface,
    source: RegionSource,
    // Drop order: session first, then images
    _session: RegionSession<'a>,
    _images: OpenImages<'a>,
}

impl PreparedTask<'_> {
    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn names(&self) -> &OutputNames {
        &self.names
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    pub fn region_source(&self) -> &RegionSource {
        &self.source
    }

    /// True when the operator must draw before [`Orchestrator::finish`].
    pub fn awaits_operator(&self) -> bool {
        matches!(self.source, RegionSource::Operator)
    }
}

/// Outcome of [`Orchestrator::prepare`]
pub enum Preparation<'a> {
    Ready(PreparedTask<'a>),
    Skipped(SkipReason),
}

/// Drives the toolkit collaborators through one task at a time.
pub struct Orchestrator<'a> {
    config: &'a ProcessingConfiguration,
    toolkit: &'a dyn ImageToolkit,
    regions: &'a dyn RegionManager,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a ProcessingConfiguration,
        toolkit: &'a dyn ImageToolkit,
        regions: &'a dyn RegionManager,
    ) -> Self {
        Self {
            config,
            toolkit,
            regions,
        }
    }

    pub fn config(&self) -> &ProcessingConfiguration {
        self.config
    }

    /// Process one task from start to finish, blocking on the operator if needed.
    ///
    /// # Returns
    ///
    /// - `Completed` once the edited image and projection are saved
    /// - `Skipped` if the helper image is missing or no region was drawn
    ///
    /// # Errors
    ///
    /// Any [`ProcessingError`]. All images are closed before returning.
    pub fn process(
        &self,
        task: &Task,
        output_dir: &Utf8Path,
    ) -> Result<TaskOutcome, ProcessingError> {
        let prepared = match self.prepare(task, output_dir)? {
            Preparation::Ready(prepared) => prepared,
            Preparation::Skipped(reason) => return Ok(TaskOutcome::Skipped(reason)),
        };

        let regions = self.acquire_regions(&prepared)?;
        self.finish(prepared, regions)
    }

    /// Regions for a prepared task: the imported archive, or whatever the
    /// operator draws. Blocks until the operator confirms.
    pub fn acquire_regions(&self, prepared: &PreparedTask<'_>) -> Result<Vec<Region>, ProcessingError> {
        match &prepared.source {
            RegionSource::Imported(regions) => Ok(regions.clone()),
            RegionSource::Operator => {
                tracing::info!("Waiting for regions on {}", prepared.task.file_name);
                self.regions
                    .await_regions(&prepared.surface)
                    .at(TaskStage::AcquireRegions)
            }
        }
    }

    /// Open and compose the images of `task` and look for a saved archive.
    pub fn prepare(
        &self,
        task: &Task,
        output_dir: &Utf8Path,
    ) -> Result<Preparation<'a>, ProcessingError> {
        let names = OutputNames::derive(&task.file_name, self.config)?;
        let mut images = OpenImages::new(self.toolkit);
        let format = self.config.input_format();

        let main_path = task.main_path();
        let main = self
            .toolkit
            .open(&main_path, format)
            .at(TaskStage::Open)?
            .ok_or_else(|| ProcessingError::MainImageMissing(main_path.clone()))?;
        let main = images.track(main);

        let helper_path = task.parent_dir.join(&names.helper);
        let Some(helper) = self.toolkit.open(&helper_path, format).at(TaskStage::Open)? else {
            tracing::warn!("Helper image missing for {}: {}", task.file_name, helper_path);
            return Ok(Preparation::Skipped(SkipReason::HelperFileMissing(helper_path)));
        };
        let helper = images.track(helper);

        let merged = self
            .toolkit
            .merge(&[main.clone(), helper])
            .at(TaskStage::Compose)?;
        let merged = images.track(merged);

        let projection = self
            .toolkit
            .max_intensity_projection(&merged)
            .at(TaskStage::Compose)?;
        let projection = images.track(projection);

        let session = RegionSession {
            regions: self.regions,
        };

        let source = self.saved_regions(task, &names)?;

        Ok(Preparation::Ready(PreparedTask {
            task: task.clone(),
            output_dir: output_dir.to_path_buf(),
            names,
            main,
            surface: DrawingSurface { merged, projection },
            source,
            _session: session,
            _images: images,
        }))
    }

    fn saved_regions(
        &self,
        task: &Task,
        names: &OutputNames,
    ) -> Result<RegionSource, ProcessingError> {
        if !self.config.import_existing_rois() {
            return Ok(RegionSource::Operator);
        }

        let archive = task.parent_dir.join(&names.roi_archive);
        match self
            .regions
            .load_archive(&archive)
            .at(TaskStage::AcquireRegions)?
        {
            Some(regions) => {
                tracing::info!("Imported {} regions from {}", regions.len(), archive);
                Ok(RegionSource::Imported(regions))
            }
            None => {
                tracing::debug!("No saved regions at {}", archive);
                Ok(RegionSource::Operator)
            }
        }
    }

    /// Mask and save a prepared task with the confirmed `regions`.
    ///
    /// Consumes `prepared`; its images are closed on return.
    pub fn finish(
        &self,
        prepared: PreparedTask<'a>,
        regions: Vec<Region>,
    ) -> Result<TaskOutcome, ProcessingError> {
        let file_name = &prepared.task.file_name;

        if regions.is_empty() {
            tracing::warn!("No region drawn for {} - skipping", file_name);
            return Ok(TaskOutcome::Skipped(SkipReason::NoRegionDrawn));
        }

        let output_dir = &prepared.output_dir;
        let region_count = regions.len();

        let (combined, roi_archive) = if region_count > 1 {
            let archive = output_dir.join(&prepared.names.roi_archive);
            self.regions
                .save_archive(&regions, &archive)
                .at(TaskStage::Save)?;
            let combined = self.regions.union(&regions).at(TaskStage::Mask)?;
            (combined, Some(archive))
        } else {
            // Exactly one region
            let mut regions = regions;
            (regions.remove(0), None)
        };

        self.regions
            .clear_outside(&prepared.main, &combined)
            .at(TaskStage::Mask)?;

        let edited = output_dir.join(&prepared.names.edited);
        self.toolkit
            .save(&prepared.main, &edited)
            .at(TaskStage::Save)?;

        let projection = output_dir.join(&prepared.names.projection);
        self.regions
            .attach(&prepared.surface.projection, &combined)
            .at(TaskStage::Save)?;
        self.toolkit
            .save(&prepared.surface.projection, &projection)
            .at(TaskStage::Save)?;

        tracing::info!(
            "Saved {} and {} ({} region(s))",
            edited,
            projection,
            region_count
        );

        Ok(TaskOutcome::Completed(CompletedTask {
            edited,
            projection,
            roi_archive,
            region_count,
            regions_imported: matches!(prepared.source, RegionSource::Imported(_)),
        }))
    }
}
