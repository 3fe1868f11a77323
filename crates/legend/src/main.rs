use clap::{Parser, Subcommand};
use legend::cli::{self, FileOptions, OutputHandlers};
use legend::config::{ConfigLoader, OutputFormat};
use legend::formatter::format_resolution;
use legend_core::{ResolutionEngine, Session, StaticProvider, TargetRequirement};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "legend", version, about = "Resolve text locators against page snapshots")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (defaults to ./legend.yaml, then ~/.legend/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format, overrides the config file
    #[arg(long, global = true)]
    format: Option<OutputFormat>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a single locator
    Resolve {
        /// Locator, e.g. "Billing > Street"
        locator: String,

        /// Page snapshot (JSON)
        #[arg(long)]
        page: PathBuf,

        /// Kind of control the step needs
        #[arg(long, default_value_t = TargetRequirement::Any)]
        require: TargetRequirement,
    },
    /// Resolve every locator of a step file
    Run {
        /// Step file, one locator per line
        #[arg(long)]
        file: PathBuf,

        /// Page snapshot (JSON)
        #[arg(long)]
        page: PathBuf,

        /// Requirement for steps without a prefix
        #[arg(long, default_value_t = TargetRequirement::Any)]
        require: TargetRequirement,

        /// Keep going after a step fails
        #[arg(long)]
        keep_going: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries resolutions.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("legend={0},legend_core={0}", args.log_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ConfigLoader::load(args.config.as_deref()).await?;
    if let Some(format) = args.format {
        config.output.format = format;
    }
    debug!(?config, "Configuration loaded");

    let output = OutputHandlers {
        out: |msg| println!("{}", msg),
        err: |msg| eprintln!("{}", msg),
    };

    match args.command {
        Command::Resolve {
            locator,
            page,
            require,
        } => {
            let snapshot = cli::load_page(&page).await?;
            let mut session = Session::new(
                StaticProvider::new(snapshot),
                ResolutionEngine::new(config.resolver),
            );
            let resolution = session.resolve(&locator, require)?;
            let formatted = format_resolution(&resolution, &config.output)?;
            if resolution.is_found() || config.output.format == OutputFormat::Json {
                (output.out)(&formatted);
            } else {
                (output.err)(&formatted);
            }
            Ok(if resolution.is_found() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Run {
            file,
            page,
            require,
            keep_going,
        } => {
            let snapshot = cli::load_page(&page).await?;
            let mut session = Session::new(
                StaticProvider::new(snapshot),
                ResolutionEngine::new(config.resolver),
            );
            let report = cli::run_file(
                &mut session,
                output,
                &config.output,
                &file,
                FileOptions {
                    stop_on_error: !keep_going,
                    default_requirement: require,
                },
            )
            .await?;
            (output.out)(&format!(
                "{} passed, {} failed",
                report.passed, report.failed
            ));
            if let Some(line) = report.stopped_at {
                (output.err)(&format!("Stopped at line {}", line));
            }
            Ok(if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
