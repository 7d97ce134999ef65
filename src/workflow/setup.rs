use crate::console;
use crate::error::{ContributeError, Result};
use crate::git::commands::Git;
use crate::git::repo;
use crate::github::client::GitHubClient;
use crate::prompt::Prompt;
use crate::runner::CommandRunner;
use crate::settings::SettingsStore;

pub const PULL_REQUEST_REFSPEC: &str = "+refs/pull/*/head:refs/remotes/upstream/pr/*";

pub fn upstream_url(organization: &str, repository: &str) -> String {
    format!("https://github.com/{organization}/{repository}.git")
}

fn title(collection: &str) -> String {
    let mut chars = collection.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub struct SetupWorkflow<'a, P: Prompt> {
    store: &'a mut SettingsStore,
    runner: &'a CommandRunner,
    prompt: &'a mut P,
}

impl<'a, P: Prompt> SetupWorkflow<'a, P> {
    pub fn new(store: &'a mut SettingsStore, runner: &'a CommandRunner, prompt: &'a mut P) -> Self {
        Self {
            store,
            runner,
            prompt,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        console::heading("Welcome To Flow / Neos Development");
        console::line(
            "This wizard gets your environment up and running to easily contribute\n\
             code or documentation to the Neos project.",
        );

        let mut github = self.setup_access_token().await?;

        let collections: Vec<String> = self.store.config().collections().map(String::from).collect();
        for collection in &collections {
            self.setup_fork(&mut github, collection).await?;
        }

        console::success("\nEverything is set up correctly.");
        Ok(())
    }

    async fn setup_access_token(&mut self) -> Result<GitHubClient> {
        if self.store.github().contributor.access_token.is_empty() {
            console::line(
                "In order to perform actions on GitHub, you have to configure an access token.\n\
                 This can be done on https://github.com/settings/tokens/new.",
            );
            let token = self
                .prompt
                .ask_hidden("Please enter your GitHub access token (will not be displayed): ")?;
            self.store.github_mut().contributor.access_token = token;
        }

        let settings = self.store.github();
        let github =
            GitHubClient::authenticate(&settings.contributor.access_token, &settings.api_url).await?;
        console::success(&format!(
            "Authentication to GitHub as {} was successful!",
            github.login()
        ));

        self.store.save()?;
        Ok(github)
    }

    async fn setup_fork(&mut self, github: &mut GitHubClient, collection: &str) -> Result<()> {
        let path = self
            .store
            .config()
            .collection_path(collection)
            .ok_or_else(|| ContributeError::Config(format!("unknown collection {collection}")))?;
        repo::open_repo(&path)?;

        let configured = self.store.github().contributor_repository(collection).to_string();
        if !configured.is_empty() {
            if let Some(fork) = github.find_repository(&configured).await? {
                tracing::debug!(fork = %fork.ssh_url, "configured fork found");
                console::success(&format!(
                    "A fork of the {collection} development collection was found in your GitHub account!"
                ));
                return self.setup_remotes(github, collection);
            }
            console::warning(&format!(
                "A fork of {collection} was configured, but was not found in your GitHub account."
            ));
        }

        let organization = self.store.github().origin.organization.clone();
        let origin_repository = self
            .store
            .github()
            .origin
            .repositories
            .get(collection)
            .map(|r| r.name.clone())
            .unwrap_or_default();
        let name = title(collection);

        console::heading(&format!("Setup {name} Development Repository"));

        if self.prompt.confirm(
            &format!("Do you already have a fork of the {name} Development Collection? (y/N): "),
            false,
        )? {
            let fork = self.prompt.ask("Please provide the name of your fork: ")?;
            if github.find_repository(&fork).await?.is_none() {
                console::warning(&format!(
                    "The fork {fork} was not found in your GitHub account. Using it anyway."
                ));
            }
            self.store.github_mut().set_contributor_repository(collection, &fork);
        } else if self.prompt.confirm(
            &format!("Should I fork the {name} Development Collection into your GitHub account? (Y/n): "),
            true,
        )? {
            let fork = match github.fork_repository(&organization, &origin_repository).await {
                Ok(fork) => fork,
                Err(e) => {
                    console::error(&format!("Error while forking {organization}/{origin_repository}"));
                    return Err(e);
                }
            };
            console::success(&format!(
                "Successfully forked {organization}/{origin_repository} to {}",
                fork.html_url
            ));
            self.store.github_mut().set_contributor_repository(collection, &fork.name);
        } else {
            console::line(&format!("Skipping remote setup for {name}."));
            return Ok(());
        }

        self.store.save()?;
        self.setup_remotes(github, collection)
    }

    fn setup_remotes(&self, github: &GitHubClient, collection: &str) -> Result<()> {
        let config = self.store.config();
        let path = config
            .collection_path(collection)
            .ok_or_else(|| ContributeError::Config(format!("unknown collection {collection}")))?;
        let fork = config.github.contributor_repository(collection);
        let canonical = config
            .github
            .origin
            .repositories
            .get(collection)
            .map(|r| r.name.as_str())
            .unwrap_or(collection);

        let git = Git::new(self.runner, &path);
        git.remove_remote("origin")?;
        git.add_remote("origin", &github.ssh_url(fork))?;
        git.remove_remote("upstream")?;
        git.add_remote("upstream", &upstream_url(&config.github.origin.organization, canonical))?;
        git.add_fetch_refspec("upstream", PULL_REQUEST_REFSPEC)?;

        for remote in repo::list_remotes(&repo::open_repo(&path)?)? {
            console::line(&format!(
                "  {:<10} {} [{}]",
                remote.name,
                remote.url,
                remote.fetch_refspecs.join(", ")
            ));
        }
        Ok(())
    }
}
