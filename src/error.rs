use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContributeError {
    #[error("command `{command}` failed with exit code {code}:\n{output}")]
    CommandFailed {
        command: String,
        output: String,
        code: i32,
    },

    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("the GitHub access token was not configured")]
    MissingAccessToken,

    #[error("it was not possible to authenticate to GitHub: {0}")]
    AuthenticationFailed(String),

    #[error("the gerrit response could not be parsed: {0}")]
    GerritResponseUnparsable(String),

    #[error("parent commit {0} was not found in the local collection; is it up to date?")]
    ParentCommitNotFound(String),

    #[error("working tree of {} is not clean", .0.display())]
    DirtyWorkingTree(PathBuf),

    #[error("{provider} request failed: {message}")]
    ProviderRequestFailed {
        provider: &'static str,
        message: String,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("not a git repository: {0}")]
    NotARepo(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("package {0} was not found in any configured collection")]
    PackageNotFound(String),

    #[error("gerrit project `{0}` does not name a package")]
    InvalidProject(String),

    #[error("prompt error: {0}")]
    Prompt(String),
}

impl ContributeError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ContributeError::CommandFailed { code, .. } if *code != 0 => *code,
            _ => 1,
        }
    }
}

impl From<zip::result::ZipError> for ContributeError {
    fn from(e: zip::result::ZipError) -> Self {
        ContributeError::Archive(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ContributeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failure_keeps_exit_code() {
        let err = ContributeError::CommandFailed {
            command: "git am".to_string(),
            output: "patch does not apply".to_string(),
            code: 128,
        };
        assert_eq!(err.exit_code(), 128);
    }

    #[test]
    fn test_other_failures_exit_with_one() {
        assert_eq!(ContributeError::MissingAccessToken.exit_code(), 1);
        assert_eq!(
            ContributeError::DirtyWorkingTree(PathBuf::from("Packages/Framework")).exit_code(),
            1
        );
        let signalled = ContributeError::CommandFailed {
            command: "git fetch".to_string(),
            output: String::new(),
            code: 0,
        };
        assert_eq!(signalled.exit_code(), 1);
    }
}
