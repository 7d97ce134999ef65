use crate::error::{ContributeError, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeDetail {
    pub project: String,
    #[serde(default)]
    pub subject: String,
}

impl ChangeDetail {
    // `Packages/Flow` names the package `Flow`.
    pub fn package_key(&self) -> Result<&str> {
        self.project
            .split('/')
            .nth(1)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ContributeError::InvalidProject(self.project.clone()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub parents: Vec<ParentCommit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParentCommit {
    pub commit: String,
}

impl CommitDetail {
    pub fn parent(&self) -> Option<&str> {
        self.parents.first().map(|p| p.commit.as_str())
    }

    // Gerrit message without review trailers and without stray blank lines.
    pub fn cleaned_message(&self) -> String {
        let mut lines: Vec<&str> = Vec::new();
        for line in self.message.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("Change-Id:") || trimmed.starts_with("Releases:") {
                continue;
            }
            if line.trim().is_empty() && lines.last().map_or(true, |l| l.trim().is_empty()) {
                continue;
            }
            lines.push(line.trim_end());
        }
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        lines.join("\n")
    }

    pub fn body(&self) -> String {
        let cleaned = self.cleaned_message();
        cleaned
            .strip_prefix(self.subject.as_str())
            .unwrap_or(&cleaned)
            .trim()
            .to_string()
    }
}
