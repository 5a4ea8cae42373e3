//! Area Selector - batch region-of-interest selection for microscopy stacks
//!
//! Console front end. It initializes:
//! - Logging (daily rotating file, optional console output)
//! - Settings ([`ConfigManager`]: `Area Selector.yaml` + `AREA_SELECTOR_*`)
//! - The settings dialog and task discovery with native file choosers
//!
//! # Commands
//!
//! - `plan` (default): configure a run, discover its tasks and print every
//!   task with the files it will produce. Image processing itself needs a host
//!   image toolkit implementing [`area_selector::services::ImageToolkit`].
//! - `init-config`: write `Area Selector.yaml` with the default settings
//! - `show-defaults`: print the default settings as YAML

use anyhow::{Context, Result};
use area_selector::logging::{LOG_PREFIX, LogOptions};
use area_selector::models::OutputLocation;
use area_selector::services::{OutputNames, discover};
use area_selector::ui::{self, ConfigureError, DialogEnvironment, Prompter};
use area_selector::{APP_NAME, ConfigManager, TaskRegistry, VERSION};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "area-selector", version, about = "Batch ROI selection for microscopy stacks")]
struct Cli {
    /// Directory holding `Area Selector.yaml`
    #[arg(long, default_value = "Area Selector Data")]
    config_dir: Utf8PathBuf,

    /// Directory for log files
    #[arg(long, default_value = "logs")]
    log_dir: Utf8PathBuf,

    /// Log at debug level
    #[arg(long)]
    debug: bool,

    /// Write the file log as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Do not mirror the log on the console
    #[arg(long)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Configure a run and print its task plan
    Plan,
    /// Write a settings file with the defaults
    InitConfig,
    /// Print the default settings
    ShowDefaults,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = area_selector::logging::setup_logging(
        &cli.log_dir,
        LOG_PREFIX,
        LogOptions {
            debug: cli.debug,
            console: !cli.quiet,
            json: cli.json_logs,
        },
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_manager = ConfigManager::new(&cli.config_dir)?;

    match cli.command.unwrap_or(Command::Plan) {
        Command::Plan => plan(&config_manager),
        Command::InitConfig => {
            if config_manager.init_settings_file()? {
                println!("Wrote {}", config_manager.settings_path());
            } else {
                println!("{} already exists", config_manager.settings_path());
            }
            Ok(())
        }
        Command::ShowDefaults => {
            print!("{}", area_selector::config::default_settings_yaml()?);
            Ok(())
        }
    }
}

fn plan(config_manager: &ConfigManager) -> Result<()> {
    let settings = config_manager.load_settings()?;
    let mut prompter = Prompter::stdio();

    let config = match ui::configure(&settings, &mut prompter) {
        Ok(config) => config,
        Err(ConfigureError::Cancelled) => {
            tracing::info!("Configuration cancelled, nothing to do");
            return Ok(());
        }
        Err(e) => {
            ui::show_error_dialog("Invalid configuration", &e.to_string());
            return Err(e).context("Failed to configure run");
        }
    };

    let start_dir = std::env::current_dir()
        .context("Failed to read the current directory")
        .and_then(|dir| {
            Utf8PathBuf::try_from(dir).context("Current directory is not valid UTF-8")
        })?;
    let environment = DialogEnvironment::new(prompter, start_dir);

    let registry = match discover(&config, &environment) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!("Discovery failed: {}", e);
            ui::show_error_dialog("Task discovery failed", &e.to_string());
            return Err(e).context("Failed to discover tasks");
        }
    };

    print_plan(&registry, &config);
    Ok(())
}

fn print_plan(registry: &TaskRegistry, config: &area_selector::ProcessingConfiguration) {
    match registry.output_location() {
        OutputLocation::InPlace => println!("{} task(s), outputs next to each image", registry.len()),
        OutputLocation::Folder(dir) => println!("{} task(s), outputs in {}", registry.len(), dir),
    }

    for (index, task) in registry.iter().enumerate() {
        println!("{:>4}  {}", index + 1, task);

        let Some(output_dir) = registry.output_dir_for(index) else {
            continue;
        };
        match OutputNames::derive(&task.file_name, config) {
            Ok(names) => {
                println!("        helper     {}", task.parent_dir.join(&names.helper));
                println!("        edited     {}", output_dir.join(&names.edited));
                println!("        projection {}", output_dir.join(&names.projection));
            }
            Err(e) => println!("        will fail: {}", e),
        }
    }
}
