use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::info;

use fluxdiff_core::{ComparisonEngine, FsManifestLoader};
use fluxdiff_exec::{CommandRunner, ProcessExecutor};
use fluxdiff_git::Git;
use fluxdiff_helm::{ensure_supported_version, Helm};
use fluxdiff_logging::{default_level, init_tracing, LogFormat};

mod build_info;
mod config;
mod report;

use build_info::BuildInfo;
use config::{Config, FileConfig, Overrides};
use report::render_markdown;

#[derive(Parser, Debug)]
#[command(
    name = "fluxdiff",
    about = "Render and diff Flux HelmReleases changed since a target branch",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Get HelmRelease diff information
    Diff(DiffArgs),
    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct DiffArgs {
    /// Config file (default: ./fluxdiff.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// The name of the target branch used to identify changed charts [default: master]
    #[arg(long)]
    target_branch: Option<String>,

    /// The git reference used to identify changed charts [default: HEAD]
    #[arg(long)]
    since: Option<String>,

    /// The name of the git remote used to identify changed charts [default: origin]
    #[arg(long)]
    remote: Option<String>,

    /// Charts that should be skipped (repeat or separate with commas)
    #[arg(long, value_delimiter = ',')]
    excluded_charts: Vec<String>,

    /// Manifest directories, relative to the repository root [default: charts]
    #[arg(long, value_delimiter = ',')]
    chart_dirs: Vec<String>,

    /// Process all manifests in the chart directories, bypassing change detection
    #[arg(long)]
    all: bool,

    /// Specific manifests to process, relative to the repository root
    #[arg(long, value_delimiter = ',')]
    charts: Vec<String>,

    /// Chart repositories to register, formatted as name=url
    #[arg(long, value_delimiter = ',')]
    chart_repos: Vec<String>,

    /// Per-repository 'helm repo add' arguments, e.g. 'myrepo=--username ci --password secret'
    #[arg(long, value_delimiter = ',')]
    helm_repo_extra_args: Vec<String>,

    /// 'helm repo add' arguments for every repository; per-repository flags win
    #[arg(long, allow_hyphen_values = true)]
    helm_repo_default_args: Option<String>,

    /// Additional arguments for 'helm template'
    #[arg(long, allow_hyphen_values = true)]
    helm_extra_args: Option<String>,

    /// Additional arguments for 'helm dependency build'
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    helm_dependency_extra_args: Vec<String>,

    /// Print external tool invocations (may expose credentials from repo args)
    #[arg(long)]
    debug: bool,

    /// Print the effective configuration to stderr (may expose credentials)
    #[arg(long)]
    print_config: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Output results as JSON instead of Markdown
    #[arg(long)]
    json_output: bool,
}

impl DiffArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            remote: self.remote.clone(),
            target_branch: self.target_branch.clone(),
            since: self.since.clone(),
            chart_dirs: self.chart_dirs.clone(),
            excluded_charts: self.excluded_charts.clone(),
            all: self.all,
            charts: self.charts.clone(),
            chart_repos: self.chart_repos.clone(),
            helm_repo_extra_args: self.helm_repo_extra_args.clone(),
            helm_repo_default_args: self.helm_repo_default_args.clone(),
            helm_extra_args: self.helm_extra_args.clone(),
            helm_dependency_extra_args: self.helm_dependency_extra_args.clone(),
            debug: self.debug,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Diff(args) => run_diff(args).await,
        Command::Version => {
            print!("{}", BuildInfo::current().render());
            Ok(())
        }
    }
}

async fn run_diff(args: DiffArgs) -> Result<()> {
    let working_dir = std::env::current_dir().context("Failed to get current directory")?;

    let file_config = FileConfig::load(args.config.as_deref(), &working_dir)
        .context("Failed loading configuration")?;
    let config = Config::resolve(args.overrides(), file_config);

    init_tracing(default_level(config.debug), args.log_format.into());
    info!("Checking diff for HelmReleases...");

    if args.print_config {
        eprintln!("{}", config.to_toml()?);
    }

    // git reports changed paths relative to the top level
    let repo_root = Git::new(Arc::new(ProcessExecutor::new(config.debug)))
        .repository_root()
        .await?;
    let exec: Arc<dyn CommandRunner> =
        Arc::new(ProcessExecutor::new(config.debug).with_working_dir(repo_root.clone()));

    let helm = Helm::new(exec.clone()).with_extra_args(config.helm_template_args());
    ensure_supported_version(&helm).await?;

    let git = Git::new(exec);
    let loader = FsManifestLoader::new(repo_root.clone());
    let comparison = config.comparison_config(repo_root)?;

    let engine = ComparisonEngine::new(comparison, &git, &helm, &loader);
    let results = engine
        .compute_changed_releases()
        .await
        .context("Failed getting HelmRelease diff")?;

    if args.json_output {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", render_markdown(&results));
    }

    let changed = results.iter().filter(|r| r.has_changes()).count();
    eprintln!(
        "{} {} HelmRelease(s) compared, {} with rendered changes",
        "->".bright_green(),
        results.len(),
        changed
    );

    Ok(())
}
