//! Asset handoff CLI
//!
//! Entry point for the `asset-handoff` command-line tool.

use asset_handoff::config::{HandoffConfig, LayerFiles};
use asset_handoff::resources::{self, ResourceParams};
use asset_handoff::signal::SignalHandler;
use asset_handoff::{logging, HandoffResult, Orchestrator, Workflow};
use clap::{Parser, Subcommand};
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;

#[derive(Parser)]
#[command(name = "asset-handoff")]
#[command(about = "Front-end asset handoff between a source tree, a build tool and a backend build", version)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Inner properties base file (default: maven-tasks/maven-inner-properties.json)
    #[arg(long, global = true)]
    inner_properties: Option<PathBuf>,

    /// Inner properties override file (default: maven-tasks/maven-custom-inner-properties.json)
    #[arg(long, global = true)]
    inner_override: Option<PathBuf>,

    /// Workflow properties base file (default: maven-workflow-properties.json)
    #[arg(long, global = true)]
    workflow_properties: Option<PathBuf>,

    /// Workflow properties override file (default: maven-custom-workflow-properties.json)
    #[arg(long, global = true)]
    workflow_override: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// prepare, build tasks, dist, deploy (the default)
    #[command(name = "default")]
    Run,

    /// Same sequence, as invoked from the backend build
    Maven,

    /// Re-sync and run the watch tasks on every source change
    MavenWatch,

    /// Write the inner properties file for the front-end build
    CreateResources {
        #[command(flatten)]
        params: ResourceArgs,

        /// Log and exit without writing anything
        #[arg(long)]
        disabled: bool,
    },

    /// Remove the build working directory
    Clean {
        /// Directory to remove
        #[arg(long, default_value = "target-grunt")]
        build_directory: PathBuf,

        /// Project root; never removed
        #[arg(long, default_value = ".")]
        project_root: PathBuf,

        /// Log and exit without removing anything
        #[arg(long)]
        disabled: bool,
    },

    /// Print both merged configurations and where they came from
    ShowConfig,
}

#[derive(clap::Args)]
struct ResourceArgs {
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    #[arg(long, default_value = "src/main/webapp")]
    source_directory: PathBuf,

    #[arg(long, default_value = "static")]
    js_source_directory: PathBuf,

    #[arg(long, default_value = "target")]
    target_path: PathBuf,

    /// Front-end build working directory; the workflows run from here
    #[arg(long, default_value = "target-grunt")]
    build_directory: PathBuf,

    /// File excluded from every sync stage (repeatable)
    #[arg(long = "filtered-file")]
    filtered_files: Vec<String>,
}

impl From<ResourceArgs> for ResourceParams {
    fn from(args: ResourceArgs) -> Self {
        Self {
            project_root: args.project_root,
            source_directory: args.source_directory,
            js_source_directory: args.js_source_directory,
            target_path: args.target_path,
            build_directory: args.build_directory,
            filtered_files: args.filtered_files,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("warning: could not initialise logging: {}", e);
    }

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> HandoffResult<()> {
    let working_dir = env::current_dir()?;
    let inner_files = layer_files(
        LayerFiles::inner_properties(&working_dir),
        cli.inner_properties,
        cli.inner_override,
    );
    let workflow_files = layer_files(
        LayerFiles::workflow_properties(&working_dir),
        cli.workflow_properties,
        cli.workflow_override,
    );

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_workflow(&working_dir, &inner_files, &workflow_files, Workflow::Default),
        Commands::Maven => run_workflow(&working_dir, &inner_files, &workflow_files, Workflow::Maven),
        Commands::MavenWatch => run_watch(&working_dir, &inner_files, &workflow_files),
        Commands::CreateResources { params, disabled } => {
            if disabled {
                info!("execution disabled");
                return Ok(());
            }
            let params = ResourceParams::from(params).resolved_against(&working_dir);
            resources::create_resources(&params)?;
            Ok(())
        }
        Commands::Clean {
            build_directory,
            project_root,
            disabled,
        } => {
            if disabled {
                info!("execution disabled");
                return Ok(());
            }
            resources::clean(
                &working_dir.join(build_directory),
                &working_dir.join(project_root),
            )?;
            Ok(())
        }
        Commands::ShowConfig => {
            let config = HandoffConfig::load(&working_dir, &inner_files, &workflow_files)?;
            let json = config.to_json().map_err(std::io::Error::from)?;
            println!("{}", json);
            Ok(())
        }
    }
}

fn layer_files(defaults: LayerFiles, base: Option<PathBuf>, overlay: Option<PathBuf>) -> LayerFiles {
    LayerFiles::new(
        base.unwrap_or(defaults.base),
        overlay.unwrap_or(defaults.overlay),
    )
}

fn run_workflow(
    working_dir: &Path,
    inner_files: &LayerFiles,
    workflow_files: &LayerFiles,
    workflow: Workflow,
) -> HandoffResult<()> {
    let config = HandoffConfig::load(working_dir, inner_files, workflow_files)?;
    let mut orchestrator = Orchestrator::with_command_runner(config);
    let report = orchestrator.run(workflow)?;

    let deployed = report.stages.last().map(|s| s.copied.len()).unwrap_or(0);
    info!(%workflow, deployed, "done");
    Ok(())
}

fn run_watch(working_dir: &Path, inner_files: &LayerFiles, workflow_files: &LayerFiles) -> HandoffResult<()> {
    let config = HandoffConfig::load(working_dir, inner_files, workflow_files)?;
    let mut orchestrator = Orchestrator::with_command_runner(config);

    let handler = SignalHandler::new();
    handler
        .install()
        .map_err(asset_handoff::watch::WatchError::from)?;
    let state = handler.state();

    let summary = orchestrator.watch(state.flag())?;
    info!(
        cycles = summary.cycles,
        failed = summary.failed_cycles,
        "watch stopped"
    );
    Ok(())
}
