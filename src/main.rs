mod config;
mod console;
mod error;
mod gerrit;
mod git;
mod github;
mod packages;
mod prompt;
mod runner;
mod settings;
#[cfg(test)]
mod test_utils;
mod workflow;

use clap::{Parser, Subcommand};
use error::Result;
use gerrit::client::GerritClient;
use github::client::GitHubClient;
use packages::CollectionRegistry;
use prompt::TerminalPrompt;
use runner::CommandRunner;
use settings::SettingsStore;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use workflow::patch::{PatchOptions, PatchWorkflow};
use workflow::setup::SetupWorkflow;

#[derive(Parser)]
#[command(
    name = "contribute",
    version,
    about = "Set up GitHub forks for the Flow/Neos collections and turn Gerrit changes into pull requests"
)]
struct Cli {
    #[arg(long, global = true, help = "Path to the settings file")]
    settings: Option<PathBuf>,

    #[arg(long, short, global = true, help = "Print debug diagnostics to stderr")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Configure the GitHub token, forks and git remotes of every collection
    Setup,
    /// Apply a Gerrit change on a local branch on top of master
    ApplyGerritChange {
        patch_id: u32,

        #[arg(long, help = "Run the formatter and update license headers of touched files")]
        normalize: bool,

        #[arg(long, help = "Commit, push to origin and open a pull request when clean")]
        create_pull_request: bool,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// git2::Repository is !Send, so everything stays on one thread
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        console::error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings_file = cli.settings.unwrap_or_else(config::default_settings_file);
    let mut store = SettingsStore::load(settings_file)?;
    tracing::debug!(settings = %store.path().display(), "settings loaded");

    let runner = CommandRunner::new();
    let mut prompt = TerminalPrompt;

    match cli.command {
        Command::Setup => {
            SetupWorkflow::new(&mut store, &runner, &mut prompt).run().await
        }
        Command::ApplyGerritChange {
            patch_id,
            normalize,
            create_pull_request,
        } => {
            let config = store.config();
            let github = connect_github(config, create_pull_request).await?;

            let gerrit = GerritClient::new(&config.gerrit.url, &config.gerrit.patch_directory)?;
            let registry = CollectionRegistry::new(config);
            let options = PatchOptions {
                normalize,
                create_pull_request,
            };

            let mut workflow = PatchWorkflow::new(config, &gerrit, &registry, &runner, &mut prompt);
            if let Some(report) = workflow.run(patch_id, options, github.as_ref()).await? {
                workflow.print_report(&report, github.as_ref().map(GitHubClient::login));
            }
            Ok(())
        }
    }
}

// A session is optional for applying changes unless a pull request is requested.
async fn connect_github(config: &config::Config, required: bool) -> Result<Option<GitHubClient>> {
    let settings = &config.github;
    if settings.contributor.access_token.is_empty() && !required {
        return Ok(None);
    }
    match GitHubClient::authenticate(&settings.contributor.access_token, &settings.api_url).await {
        Ok(github) => Ok(Some(github)),
        Err(e) if !required => {
            console::warning(&format!("Continuing without GitHub: {e}"));
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
