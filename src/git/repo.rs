use crate::error::{ContributeError, Result};
use git2::Repository;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInfo {
    pub name: String,
    pub url: String,
    pub fetch_refspecs: Vec<String>,
}

pub fn open_repo(path: &Path) -> Result<Repository> {
    if !path.is_dir() {
        return Err(ContributeError::DirectoryNotFound(path.to_path_buf()));
    }
    Repository::open(path).map_err(|e| ContributeError::NotARepo(format!("{}: {e}", path.display())))
}

pub fn list_remotes(repo: &Repository) -> Result<Vec<RemoteInfo>> {
    let mut out = Vec::new();
    for name in repo.remotes()?.iter().flatten() {
        let remote = repo.find_remote(name)?;
        let fetch_refspecs = remote
            .fetch_refspecs()?
            .iter()
            .flatten()
            .map(String::from)
            .collect();
        out.push(RemoteInfo {
            name: name.to_string(),
            url: remote.url().unwrap_or("").to_string(),
            fetch_refspecs,
        });
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}
