//! cb - CLI entry point.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use codebuddy::changelog::{ChangelogAssembler, ChangelogSettings};
use codebuddy::commit::{CommitArgs, CommitOrchestrator, DiffReducer, RetryPolicy};
use codebuddy::llm::{ChangelogStyle, LlmGenerator, Provider, ProviderSelection};
use codebuddy::transform::TransformPipeline;
use codebuddy::{CommitType, Config, DialoguerPrompter, GitSession, ScopeResolver};

/// Commit changes scope by scope with LLM-generated messages.
#[derive(Parser, Debug)]
#[command(name = "cb")]
#[command(about = "Commit changes scope by scope with LLM-generated conventional commit messages")]
#[command(version)]
struct Cli {
    /// Path to the configuration file (defaults to ./codebuddy.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// LLM provider to try first; the other one is the fallback
    #[arg(long, global = true, value_enum)]
    provider: Option<Provider>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Commit every changed scope with its own message
    CommitAll {
        /// Mark the commits as breaking changes
        #[arg(short, long)]
        breaking: bool,

        /// Only commit this scope, without asking for confirmation
        #[arg(short, long)]
        scope: Option<String>,

        /// Force the commit type (feat, fix, docs, ...)
        #[arg(short = 't', long = "type")]
        commit_type: Option<CommitType>,

        /// Issue key appended to the message, overriding detection
        #[arg(short, long)]
        issue: Option<String>,

        /// Why the change was made, passed to the generator
        #[arg(short, long)]
        reason: Option<String>,
    },

    /// Generate a changelog section and bump the project version
    Changelog {
        /// Baseline branch (defaults to [changelog].destination)
        #[arg(short, long)]
        destination: Option<String>,

        /// Print the section without writing any file
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("\x1b[31mError: {e}\x1b[0m");

        for cause in e.chain().skip(1) {
            eprintln!("  Caused by: {cause}");
        }

        process::exit(1);
    }
}

/// RUST_LOG wins; otherwise `debug` with --verbose and `warn` by default.
/// Logs go to stderr so they never mix with the review output.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let config =
        Config::load(cli.config.as_deref(), &cwd).context("Failed to load configuration")?;

    let session = GitSession::open(&cwd)
        .context("Not a git repository. Run cb from within a git repository.")?;

    let primary = cli
        .provider
        .or(config.llm.provider)
        .unwrap_or(Provider::Claude);
    let generator = LlmGenerator::new(ProviderSelection::from_primary(primary));

    match cli.command {
        Command::CommitAll {
            breaking,
            scope,
            commit_type,
            issue,
            reason,
        } => {
            let args = CommitArgs {
                breaking,
                scope,
                commit_type,
                issue,
                reason,
            };
            commit_all(&config, &session, &generator, &args).await
        }
        Command::Changelog {
            destination,
            dry_run,
        } => changelog(&config, &session, &generator, destination, dry_run).await,
    }
}

async fn commit_all(
    config: &Config,
    session: &GitSession,
    generator: &LlmGenerator,
    args: &CommitArgs,
) -> Result<()> {
    let resolver = ScopeResolver::from_config(&config.commit.scope)
        .context("Invalid [commit.scope] configuration")?;
    let pipeline = TransformPipeline::from_config(&config.transform_config())
        .context("Invalid [commit] configuration")?;
    let retry_policy = match config.max_message_attempts() {
        Some(max) => RetryPolicy::limited(max),
        None => RetryPolicy::unbounded(),
    };

    let prompter = DialoguerPrompter;
    let orchestrator = CommitOrchestrator::new(
        session,
        generator,
        &prompter,
        resolver,
        pipeline,
        DiffReducer::from_config(&config.diff),
        retry_policy,
    );

    let report = orchestrator
        .run_all(args)
        .await
        .context("Failed to read the working tree status")?;

    if !report.committed.is_empty() || !report.failed.is_empty() || !report.skipped.is_empty() {
        println!("\n{}", report.summary());
    }
    for failure in &report.failed {
        eprintln!(
            "\x1b[33m⚠ {} was not committed ({})\x1b[0m",
            failure.scope,
            failure.error.operation()
        );
    }

    Ok(())
}

async fn changelog(
    config: &Config,
    session: &GitSession,
    generator: &LlmGenerator,
    destination: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let destination = destination.unwrap_or_else(|| config.changelog.destination.clone());
    let style = if config.is_monorepo() {
        ChangelogStyle::Monorepo
    } else {
        ChangelogStyle::SingleRepo {
            app_name: config.changelog.app_name.clone(),
        }
    };

    let changelog_path = session.workdir().join(&config.changelog.path);
    let settings = ChangelogSettings {
        style,
        changelog_path: changelog_path.clone(),
        manifest_root: session.workdir().to_path_buf(),
        dry_run,
    };

    println!("Collecting commits since {}...", destination);
    let assembler = ChangelogAssembler::new(session, generator, settings);
    let report = assembler
        .generate(&destination)
        .await
        .context("Failed to generate changelog")?;

    if dry_run {
        println!("\n--- Dry Run Output ---\n");
        println!("{}", report.section);
        return Ok(());
    }

    if let Some(backup) = &report.backup_path {
        println!("Backed up previous changelog to {}", backup.display());
    }
    println!(
        "✅ Updated {} ({} commits)",
        changelog_path.display(),
        report.commit_count
    );
    if report.bumped() {
        println!(
            "✅ Bumped {} from {} to {}",
            report.manifest, report.current_version, report.new_version
        );
    }

    Ok(())
}
