//! Confix - Entry point
//!
//! This is the main binary of the `confix` command.

use std::path::PathBuf;
use std::process::ExitCode;

use confix::middlewares::DEFAULT_CONFIG_FILE;
use confix::pipelines::{PipelineOptions, ProjectBuildPipeline, ProjectReloadPipeline};
use confix::ExitStatus;
use confix_config::ConfigLoader;
use confix_core::ConfixResult;
use confix_middleware::{MiddlewareContext, Pipeline};
use confix_telemetry::{describe_metrics, init_logging, LogConfig};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Subcommands.
#[derive(Debug, Clone, Copy)]
enum Command {
    ProjectReload,
    ProjectBuild,
}

/// Command-line arguments.
struct Args {
    /// Path to configuration file.
    config: Option<PathBuf>,
    /// Environment override.
    environment: Option<String>,
    command: Command,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = None;
        let mut environment = None;
        let mut words = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = args.next().map(PathBuf::from);
                }
                "--environment" | "-e" => {
                    environment = args.next();
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("confix {}", confix::VERSION);
                    std::process::exit(0);
                }
                other if other.starts_with('-') => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
                word => words.push(word.to_string()),
            }
        }

        let command = match words.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            ["project", "reload"] => Command::ProjectReload,
            ["project", "build"] => Command::ProjectBuild,
            [] => {
                print_help();
                std::process::exit(1);
            }
            other => {
                eprintln!("Unknown command: {}", other.join(" "));
                eprintln!("Use --help for usage information");
                std::process::exit(1);
            }
        };

        Self {
            config,
            environment,
            command,
        }
    }
}

fn print_help() {
    println!(
        r"Confix - Configuration schema composition

USAGE:
    confix [OPTIONS] <COMMAND>

COMMANDS:
    project reload    Compose and store the JSON schema of the project
    project build     Write the configuration files with variables resolved

OPTIONS:
    -c, --config <PATH>         Path to configuration file (default: confix.toml)
    -e, --environment <NAME>    Environment to use
    -h, --help                  Print help information
    -v, --version               Print version information

ENVIRONMENT VARIABLES:
    CONFIX_ENVIRONMENT          Environment to use when --environment is not given
    CONFIX__PROJECT__NAME       Overrides project.name
    CONFIX__LOGGING__LEVEL      Overrides logging.level
    CONFIX__LOGGING__FORMAT     Overrides logging.format (pretty or json)

EXAMPLES:
    # Reload the schema of the project in the current directory
    confix project reload

    # Build the production configuration
    confix --environment production project build
"
    );
}

/// Installs logging from the `[logging]` section, falling back to defaults
/// when the configuration cannot be read yet. The pipeline reports that
/// failure properly once it runs.
fn init_telemetry(config: Option<&PathBuf>) {
    let path = config
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let log_config = ConfigLoader::new()
        .with_optional_file(&path)
        .map(|loader| loader.load_unvalidated().logging.to_log_config())
        .unwrap_or_else(|_| LogConfig::default());

    if let Err(e) = init_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }
    describe_metrics();
}

async fn run(pipeline: &Pipeline) -> ConfixResult<()> {
    let token = CancellationToken::new();

    let signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Received Ctrl-C, cancelling");
            signal.cancel();
        }
    });

    let mut ctx = MiddlewareContext::new(token);
    info!(run_id = %ctx.run_id(), pipeline = pipeline.name(), "Starting run");
    pipeline.execute(&mut ctx).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_telemetry(args.config.as_ref());

    let mut options = PipelineOptions::default()
        .with_environment(args.environment)
        .with_dotenv(true);
    options.config_path = args.config;

    let pipeline = match args.command {
        Command::ProjectReload => ProjectReloadPipeline::build(options),
        Command::ProjectBuild => ProjectBuildPipeline::build(options),
    };

    let result = match pipeline {
        Ok(pipeline) => run(&pipeline).await,
        Err(e) => Err(e),
    };

    ExitStatus::from_result(&result).into()
}
