use crate::error::Result;
use crate::runner::{CommandLine, CommandRunner};
use std::ffi::OsString;
use std::path::Path;

// Marker `git stash pop` prints for every file it could not merge.
pub const CONFLICT_MARKER: &str = "CONFLICT";

pub struct Git<'a> {
    runner: &'a CommandRunner,
    dir: &'a Path,
}

impl<'a> Git<'a> {
    pub fn new(runner: &'a CommandRunner, dir: &'a Path) -> Self {
        Self { runner, dir }
    }

    pub fn dir(&self) -> &Path {
        self.dir
    }

    fn run<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.runner.run(&CommandLine::git().args(args), self.dir)
    }

    fn run_forced<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.runner.run_forced(&CommandLine::git().args(args), self.dir)
    }

    // Removing a remote that does not exist is not an error.
    pub fn remove_remote(&self, name: &str) -> Result<()> {
        self.run_forced(["remote", "rm", name])?;
        Ok(())
    }

    pub fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.run(["remote", "add", name, url])?;
        Ok(())
    }

    pub fn add_fetch_refspec(&self, remote: &str, refspec: &str) -> Result<()> {
        let key = format!("remote.{remote}.fetch");
        self.run(["config", "--add", key.as_str(), refspec])?;
        Ok(())
    }

    // Newest commit whose message contains `needle`.
    pub fn find_commit_by_message(&self, needle: &str) -> Result<Option<String>> {
        let grep = format!("--grep={needle}");
        let out = self.run(["log", "--all", "--fixed-strings", grep.as_str(), "--format=%H", "-n", "1"])?;
        Ok(out.lines().map(str::trim).find(|l| !l.is_empty()).map(String::from))
    }

    pub fn is_clean(&self) -> Result<bool> {
        Ok(self.run(["status", "--porcelain"])?.trim().is_empty())
    }

    // branch name, or the commit id when HEAD is detached
    pub fn current_branch(&self) -> Result<String> {
        let branch = self.run(["rev-parse", "--abbrev-ref", "HEAD"])?.trim().to_string();
        if branch != "HEAD" {
            return Ok(branch);
        }
        Ok(self.run(["rev-parse", "HEAD"])?.trim().to_string())
    }

    pub fn checkout(&self, revision: &str) -> Result<()> {
        self.run(["checkout", revision])?;
        Ok(())
    }

    pub fn delete_branch(&self, branch: &str) -> Result<()> {
        self.run(["branch", "-D", branch])?;
        Ok(())
    }

    pub fn checkout_new_branch(&self, branch: &str) -> Result<()> {
        self.run(["checkout", "-b", branch])?;
        Ok(())
    }

    pub fn reset_hard(&self, revision: &str) -> Result<()> {
        self.run(["reset", "--hard", revision])?;
        Ok(())
    }

    pub fn reset_soft(&self, revision: &str) -> Result<()> {
        self.run(["reset", "--soft", revision])?;
        Ok(())
    }

    pub fn apply_check(&self, directory: &str, patch: &Path) -> Result<String> {
        self.run([
            OsString::from("apply"),
            OsString::from(format!("--directory={directory}")),
            OsString::from("--check"),
            patch.as_os_str().to_owned(),
        ])
    }

    pub fn apply_stat(&self, directory: &str, patch: &Path) -> Result<String> {
        self.run([
            OsString::from("apply"),
            OsString::from(format!("--directory={directory}")),
            OsString::from("--stat"),
            patch.as_os_str().to_owned(),
        ])
    }

    pub fn am(&self, directory: &str, patch: &Path) -> Result<String> {
        self.run([
            OsString::from("am"),
            OsString::from(format!("--directory={directory}")),
            patch.as_os_str().to_owned(),
        ])
    }

    pub fn files_in_last_commit(&self) -> Result<Vec<String>> {
        let out = self.run(["diff", "--name-only", "HEAD~1", "HEAD"])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    pub fn stash(&self) -> Result<()> {
        self.run(["stash"])?;
        Ok(())
    }

    // Conflicts make `stash pop` exit non-zero; the output is returned either way.
    pub fn stash_pop(&self) -> Result<String> {
        self.run_forced(["stash", "pop"])
    }

    pub fn add_all(&self) -> Result<()> {
        self.run(["add", "--all"])?;
        Ok(())
    }

    pub fn commit(&self, message: &str) -> Result<()> {
        self.run(["commit", "--message", message])?;
        Ok(())
    }

    pub fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.run(["push", remote, branch])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{commit_file, init_repo};

    #[test]
    fn test_find_commit_by_message() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CommandRunner::new();
        init_repo(&runner, dir.path());
        let git = Git::new(&runner, dir.path());

        commit_file(&git, "README.md", "hello\n", "Import\n\nSource: 4f2a9c1e");
        commit_file(&git, "LICENSE", "MIT\n", "Add license");

        let found = git.find_commit_by_message("4f2a9c1e").unwrap().unwrap();
        assert_eq!(found.len(), 40);
        assert!(git.find_commit_by_message("deadbeef").unwrap().is_none());
    }

    #[test]
    fn test_clean_and_dirty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CommandRunner::new();
        init_repo(&runner, dir.path());
        let git = Git::new(&runner, dir.path());
        commit_file(&git, "README.md", "hello\n", "Initial");

        assert!(git.is_clean().unwrap());
        std::fs::write(dir.path().join("scratch.txt"), "x").unwrap();
        assert!(!git.is_clean().unwrap());
    }

    #[test]
    fn test_files_in_last_commit() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CommandRunner::new();
        init_repo(&runner, dir.path());
        let git = Git::new(&runner, dir.path());
        commit_file(&git, "README.md", "hello\n", "Initial");
        commit_file(&git, "Flow/Classes/Cache.php", "<?php\n", "Add cache");

        assert_eq!(git.files_in_last_commit().unwrap(), vec!["Flow/Classes/Cache.php"]);
    }

    #[test]
    fn test_branch_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CommandRunner::new();
        init_repo(&runner, dir.path());
        let git = Git::new(&runner, dir.path());
        commit_file(&git, "README.md", "hello\n", "Initial");

        git.checkout_new_branch("gerrit-1").unwrap();
        assert_eq!(git.current_branch().unwrap(), "gerrit-1");
        git.checkout("master").unwrap();
        git.delete_branch("gerrit-1").unwrap();
        assert_eq!(git.current_branch().unwrap(), "master");
        assert!(git2::Repository::open(dir.path())
            .unwrap()
            .find_branch("gerrit-1", git2::BranchType::Local)
            .is_err());
    }

    #[test]
    fn test_remove_missing_remote_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CommandRunner::new();
        init_repo(&runner, dir.path());
        let git = Git::new(&runner, dir.path());

        git.remove_remote("upstream").unwrap();
        git.add_remote("upstream", "https://github.com/neos/neos-development-collection.git")
            .unwrap();
        git.add_fetch_refspec("upstream", "+refs/pull/*/head:refs/remotes/upstream/pr/*")
            .unwrap();
        git.remove_remote("upstream").unwrap();
        assert!(git2::Repository::open(dir.path()).unwrap().find_remote("upstream").is_err());
    }
}
