use octocrab::models::{pulls::PullRequest, Repository};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    pub name: String,
    pub html_url: String,
    pub ssh_url: String,
}

impl From<Repository> for RepositoryDescriptor {
    fn from(repo: Repository) -> Self {
        Self {
            html_url: repo.html_url.map(|u| u.to_string()).unwrap_or_default(),
            ssh_url: repo.ssh_url.unwrap_or_default(),
            name: repo.name,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PullRequestDescriptor {
    pub number: u64,
    pub html_url: String,
}

impl From<PullRequest> for PullRequestDescriptor {
    fn from(pr: PullRequest) -> Self {
        Self {
            number: pr.number,
            html_url: pr.html_url.map(|u| u.to_string()).unwrap_or_default(),
        }
    }
}

// repositories of the authenticated user, fetched at most once per client
#[derive(Debug, Default)]
pub struct RepositoryCache {
    repositories: Option<Vec<RepositoryDescriptor>>,
}

impl RepositoryCache {
    pub fn get(&self) -> Option<&[RepositoryDescriptor]> {
        self.repositories.as_deref()
    }

    pub fn store(&mut self, repositories: Vec<RepositoryDescriptor>) -> &[RepositoryDescriptor] {
        self.repositories.insert(repositories)
    }
}
