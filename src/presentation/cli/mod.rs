use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::env;
use std::path::PathBuf;
use std::process::exit;

use crate::application::use_cases::release_tagging::{
    PinMode, ReleaseTaggingConfig, ReleaseTaggingUseCase, RunSummary, DEFAULT_REMOTE,
    DEFAULT_SYNC_COMMAND,
};
use crate::application::use_cases::update_release_tags::TagAction;
use crate::common::result::{ResultExt, TaggerResult};
use crate::domain::entities::project_tree::DEFAULT_MANIFEST_FILE;
use crate::domain::value_objects::release_labels::ReleaseLabels;
use crate::presentation::ui::display::{color_enabled, ConsoleReporter};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_DATE"),
    ")"
);

/// Output format of the end-of-run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Value pinned into each project's revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PinArg {
    /// Release tag name
    Tag,
    /// Commit id the release tag points to
    Hash,
}

impl From<PinArg> for PinMode {
    fn from(pin: PinArg) -> Self {
        match pin {
            PinArg::Tag => PinMode::Tag,
            PinArg::Hash => PinMode::Hash,
        }
    }
}

/// release-tagger - tag every repository of a repo manifest for a release
#[derive(Debug, Parser)]
#[command(name = "release-tagger")]
#[command(about = "Create release tags across a repo-managed tree and pin them in a new manifest")]
#[command(version, long_version = LONG_VERSION)]
pub struct Cli {
    /// Release version, e.g. v700
    #[arg(short = 'r', long = "release", value_name = "RELEASE")]
    pub release: String,

    /// Previous release version, e.g. v600, used as a reference for the tag naming
    #[arg(short = 'p', long = "previous-release", value_name = "PREVIOUS_RELEASE")]
    pub previous_release: Option<String>,

    /// Create and push release tags (default is a dry run)
    #[arg(long)]
    pub apply: bool,

    /// Run the sync command in the project root first
    #[arg(long)]
    pub sync: bool,

    /// Command used by --sync
    #[arg(long, env = "RELEASE_TAGGER_SYNC_COMMAND", default_value = DEFAULT_SYNC_COMMAND)]
    pub sync_command: String,

    /// Remote to fetch tags from and push tags to
    #[arg(long, env = "RELEASE_TAGGER_REMOTE", default_value = DEFAULT_REMOTE)]
    pub remote: String,

    /// Current manifest inside .repo/manifests
    #[arg(long, value_name = "FILE", default_value = DEFAULT_MANIFEST_FILE)]
    pub manifest: String,

    /// Value written to each project's revision
    #[arg(long, value_enum, default_value = "tag")]
    pub pin: PinArg,

    /// Do not create fallback tags for projects without a tag mapping
    #[arg(long)]
    pub skip_unmapped: bool,

    /// Output format of the run summary
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Working directory (defaults to current directory)
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

impl Cli {
    /// Translate the command line into a run configuration
    pub fn to_config(&self) -> TaggerResult<ReleaseTaggingConfig> {
        let labels = ReleaseLabels::from_cli(&self.release, self.previous_release.as_deref())?;

        let cwd = env::current_dir()
            .with_filesystem_error("Cannot determine the current directory", None)?;
        let working_dir = match &self.directory {
            Some(dir) => cwd
                .join(dir)
                .canonicalize()
                .with_filesystem_error("Cannot use working directory", Some(dir.clone()))?,
            None => cwd,
        };

        let sync_command = if self.sync {
            Some(self.sync_command.clone())
        } else {
            None
        };

        Ok(ReleaseTaggingConfig::new(labels, working_dir)
            .with_dry_run(!self.apply)
            .with_remote(&self.remote)
            .with_manifest_file(&self.manifest)
            .with_pin_mode(self.pin.into())
            .with_tag_unmapped(!self.skip_unmapped)
            .with_sync_command(sync_command)
            .with_capture_sync_output(self.output != OutputFormat::Text))
    }
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub fn from_cli(cli: Cli) -> Self {
        Self { cli }
    }

    pub fn cli(&self) -> &Cli {
        &self.cli
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let use_color = color_enabled(self.cli.no_color);
        colored::control::set_override(use_color);

        match self.handle_command(use_color).await {
            Ok(_) => Ok(()),
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                exit(e.exit_code());
            }
        }
    }

    async fn handle_command(&self, use_color: bool) -> TaggerResult<()> {
        let config = self.cli.to_config()?;
        tracing::debug!("Release labels: {}", config.labels);

        let mut reporter =
            ConsoleReporter::new(use_color).with_stderr(self.cli.output != OutputFormat::Text);
        let summary = ReleaseTaggingUseCase::new(config)
            .execute(&mut reporter)
            .await?;

        self.print_summary(&summary)
    }

    fn print_summary(&self, summary: &RunSummary) -> TaggerResult<()> {
        match self.cli.output {
            OutputFormat::Text => {
                let tags = &summary.tags;
                println!();
                println!(
                    "Tags: {} created, {} to create, {} already present, {} failed",
                    tags.count(&TagAction::Created),
                    tags.count(&TagAction::WouldCreate),
                    tags.count(&TagAction::AlreadyExists),
                    tags.failures().count()
                );
                println!(
                    "Manifest: {} of {} revisions updated",
                    summary.manifest.updated_count(),
                    summary.manifest.updates.len()
                );
                if summary.dry_run {
                    println!("{}", "Dry run: no tags were created or pushed".yellow());
                }
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(summary)?),
        }
        Ok(())
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}
