//! gcomet - CLI entry point.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gcomet::commands::{
    ConfigAction, GenerateOptions, HookAction, TerminalPrompter, run_config, run_generate,
    run_hook, run_setup,
};
use gcomet::config::{ConfigPaths, ConfigResolver, ModelTier};
use gcomet::error::CommandError;
use gcomet::generator::GitHubModelsClient;
use gcomet::git::GitRepository;
use gcomet::security::SensitiveDataScanner;

/// Generate Git commit messages from staged changes with GitHub Models.
#[derive(Parser, Debug)]
#[command(name = "gcomet")]
#[command(about = "AI-powered Git commit message generator")]
#[command(version)]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a commit message for staged changes
    #[command(alias = "gen")]
    Generate {
        /// Skip confirmation prompts and commit directly
        #[arg(short, long)]
        force: bool,

        /// Override the configured model for this run
        #[arg(short, long)]
        model: Option<ModelTier>,

        /// Print the message instead of committing (used by the Git hook)
        #[arg(long)]
        stdout: bool,
    },

    /// Manage the prepare-commit-msg Git hook
    Hook {
        #[command(subcommand)]
        action: HookCommand,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },

    /// Interactive setup wizard
    Setup,
}

#[derive(Subcommand, Debug)]
enum HookCommand {
    /// Install the prepare-commit-msg hook
    Install,
    /// Remove the prepare-commit-msg hook
    Uninstall,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Set a configuration value
    Set { key: String, value: String },
    /// Print a configuration value
    Get { key: String },
    /// Print all configuration values
    List,
    /// Restore one key, or model/confirmation/diff size, to defaults
    Reset { key: Option<String> },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_repository() -> Result<GitRepository> {
    GitRepository::discover(".")
        .map_err(|_| CommandError::NotARepository)
        .context("gcomet must be run inside a Git repository")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = ConfigPaths::user().context("Failed to locate the gcomet config directory")?;
    let mut resolver = ConfigResolver::new(paths);

    let command = cli.command.unwrap_or(Command::Generate {
        force: false,
        model: None,
        stdout: false,
    });

    match command {
        Command::Generate {
            force,
            model,
            stdout,
        } => {
            let repo = open_repository()?;
            let options = GenerateOptions {
                force,
                model,
                stdout,
            };
            run_generate(
                &mut resolver,
                &repo,
                &GitHubModelsClient::new(),
                &SensitiveDataScanner::new(),
                &TerminalPrompter,
                &options,
            )
            .await
            .context("Failed to generate commit message")?;
        }
        Command::Hook { action } => {
            let repo = open_repository()?;
            let action = match action {
                HookCommand::Install => HookAction::Install,
                HookCommand::Uninstall => HookAction::Uninstall,
            };
            run_hook(&repo, action).context("Hook operation failed")?;
        }
        Command::Config { action } => {
            let action = match action {
                ConfigCommand::Set { key, value } => ConfigAction::Set { key, value },
                ConfigCommand::Get { key } => ConfigAction::Get { key },
                ConfigCommand::List => ConfigAction::List,
                ConfigCommand::Reset { key } => ConfigAction::Reset { key },
            };
            let lines = run_config(&mut resolver, action)
                .await
                .context("Configuration command failed")?;
            for line in lines {
                println!("{line}");
            }
        }
        Command::Setup => {
            run_setup(&mut resolver, &TerminalPrompter)
                .await
                .context("Setup failed")?;
        }
    }

    Ok(())
}
