mod blocks_cmd;
mod check_config_cmd;
mod content_cmd;
mod input;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use answerkit_config::{config_dir, config_file_path, load_and_prepare, AnswerKitConfig};
use answerkit_content::ContentPipeline;
use clap::{Parser, Subcommand};
use tracing::debug;

use blocks_cmd::BlocksFormat;
use input::read_input;
use terminal_output::{note_error, note_success};

#[derive(Parser)]
#[command(name = "answerkit")]
#[command(about = "Repair, sanitize, render and validate interview answer content")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $ANSWERKIT_CONFIG_DIR/config.yaml or ~/.answerkit/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, warn)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge degraded one-paragraph-per-line code into code blocks
    Repair {
        /// Input file, or `-` for stdin
        input: String,
    },
    /// Apply the markup allow-list
    Sanitize { input: String },
    /// Repair then sanitize raw editor output for storage
    Ingest {
        input: String,
        /// Print the storage payload and plain-text projection as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-sanitize stored content and mark code for highlighting
    Render {
        input: String,
        /// Print the display tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Plain text, word and character counts of stored content
    Project { input: String },
    /// Check a question/answer pair against the submission rules
    Validate {
        /// Answer file, or `-` for stdin
        input: String,
        #[arg(short, long)]
        question: String,
    },
    /// Normalize a stored block array, optionally replaying edit operations
    Blocks {
        input: String,
        /// JSON array of block operations to apply
        #[arg(long)]
        ops: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = BlocksFormat::Json)]
        format: BlocksFormat,
    },
    /// Load and validate the config file
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_file_path(&config_dir()));

    let (config, report) = load_and_prepare(&config_path).await?;
    init_logging(&config, cli.log_level.as_deref())?;
    if !report.is_valid() && !matches!(cli.command, Commands::CheckConfig) {
        note_error("config has errors; run `answerkit check-config` for details");
    }
    debug!(path = %config_path.display(), "config loaded");

    let pipeline = ContentPipeline::new(config.content_settings());

    let output = match cli.command {
        Commands::Repair { input } => content_cmd::repair(&read_input(&input).await?, &pipeline),
        Commands::Sanitize { input } => content_cmd::sanitize(&read_input(&input).await?),
        Commands::Ingest { input, json } => {
            content_cmd::ingest(&read_input(&input).await?, &pipeline, json)?
        }
        Commands::Render { input, json } => {
            content_cmd::render(&read_input(&input).await?, &pipeline, json)?
        }
        Commands::Project { input } => content_cmd::project_content(&read_input(&input).await?)?,
        Commands::Validate { input, question } => {
            let outcome = content_cmd::validate(&question, &read_input(&input).await?, &pipeline);
            match outcome.reason {
                None => {
                    note_success("submission is valid");
                    return Ok(());
                }
                Some(reason) => {
                    note_error(&reason);
                    std::process::exit(1);
                }
            }
        }
        Commands::Blocks { input, ops, format } => {
            let stored = read_input(&input).await?;
            let script = match ops {
                Some(path) => Some(read_input(&path.to_string_lossy()).await?),
                None => None,
            };
            blocks_cmd::run(&stored, script.as_deref(), format, config.image_policy())?
        }
        Commands::CheckConfig => {
            if !check_config_cmd::run(&config_path).await? {
                std::process::exit(1);
            }
            return Ok(());
        }
    };

    println!("{output}");
    Ok(())
}

fn init_logging(config: &AnswerKitConfig, level_override: Option<&str>) -> Result<()> {
    let logging = config.logging.clone().unwrap_or_default();
    answerkit_logging::init_logger(
        level_override.unwrap_or(config.log_level()),
        logging.dir.as_deref(),
        logging.json.unwrap_or(false),
    )
}
