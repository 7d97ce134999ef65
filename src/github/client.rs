use crate::error::{ContributeError, Result};
use crate::github::types::{PullRequestDescriptor, RepositoryCache, RepositoryDescriptor};
use octocrab::Octocrab;

const PULL_REQUEST_BASE: &str = "master";
const REPOSITORIES_PER_PAGE: u8 = 100;

// only constructed through `authenticate`, so holding one means the token works
pub struct GitHubClient {
    octo: Octocrab,
    login: String,
    repositories: RepositoryCache,
}

impl GitHubClient {
    pub async fn authenticate(token: &str, api_url: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(ContributeError::MissingAccessToken);
        }

        let octo = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_url)
            .map_err(|e| ContributeError::Config(format!("invalid GitHub api url {api_url}: {e}")))?
            .build()
            .map_err(|e| ContributeError::AuthenticationFailed(describe(&e)))?;

        let user = octo
            .current()
            .user()
            .await
            .map_err(|e| ContributeError::AuthenticationFailed(describe(&e)))?;

        tracing::debug!(login = %user.login, "authenticated to GitHub");

        Ok(Self {
            octo,
            login: user.login,
            repositories: RepositoryCache::default(),
        })
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn ssh_url(&self, repository: &str) -> String {
        format!("git@github.com:{}/{repository}.git", self.login)
    }

    // GitHub creates the fork asynchronously; the accepted response is enough
    pub async fn fork_repository(
        &self,
        organization: &str,
        repository: &str,
    ) -> Result<RepositoryDescriptor> {
        let fork = self
            .octo
            .repos(organization, repository)
            .create_fork()
            .send()
            .await
            .map_err(|e| provider_error(&e))?;
        Ok(fork.into())
    }

    pub async fn current_user_repositories(&mut self) -> Result<&[RepositoryDescriptor]> {
        if self.repositories.get().is_none() {
            let page = self
                .octo
                .current()
                .list_repos_for_authenticated_user()
                .per_page(REPOSITORIES_PER_PAGE)
                .send()
                .await
                .map_err(|e| provider_error(&e))?;
            let repositories: Vec<RepositoryDescriptor> =
                page.items.into_iter().map(RepositoryDescriptor::from).collect();
            tracing::debug!(count = repositories.len(), "fetched user repositories");
            return Ok(self.repositories.store(repositories));
        }
        Ok(self.repositories.get().unwrap_or_default())
    }

    pub async fn find_repository(&mut self, name: &str) -> Result<Option<RepositoryDescriptor>> {
        Ok(self
            .current_user_repositories()
            .await?
            .iter()
            .find(|r| r.name == name)
            .cloned())
    }

    pub async fn create_pull_request(
        &self,
        organization: &str,
        repository: &str,
        branch: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequestDescriptor> {
        let pull_request = self
            .octo
            .pulls(organization, repository)
            .create(title, format!("{}:{branch}", self.login), PULL_REQUEST_BASE)
            .body(body)
            .send()
            .await
            .map_err(|e| provider_error(&e))?;
        Ok(pull_request.into())
    }
}

fn describe(error: &octocrab::Error) -> String {
    match error {
        octocrab::Error::GitHub { source, .. } => {
            format!("{} ({})", source.message, source.status_code)
        }
        other => other.to_string(),
    }
}

fn provider_error(error: &octocrab::Error) -> ContributeError {
    ContributeError::ProviderRequestFailed {
        provider: "github",
        message: describe(error),
    }
}
