use crate::config::Config;
use crate::console;
use crate::error::{ContributeError, Result};
use crate::gerrit::client::GerritClient;
use crate::gerrit::types::CommitDetail;
use crate::git::commands::{Git, CONFLICT_MARKER};
use crate::github::client::GitHubClient;
use crate::github::types::PullRequestDescriptor;
use crate::packages::{PackageLocation, PackageRegistry};
use crate::prompt::Prompt;
use crate::runner::CommandRunner;
use crate::workflow::normalize::Normalizer;
use std::path::PathBuf;

const MASTER_BRANCH: &str = "master";

pub fn branch_name(change: u32) -> String {
    format!("gerrit-{change}")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PatchOptions {
    pub normalize: bool,
    pub create_pull_request: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Clean,
    Conflicted,
}

impl ApplyOutcome {
    pub fn from_stash_pop(output: &str) -> Self {
        if output.contains(CONFLICT_MARKER) {
            ApplyOutcome::Conflicted
        } else {
            ApplyOutcome::Clean
        }
    }
}

#[derive(Debug)]
pub struct PatchReport {
    pub change: u32,
    pub branch: String,
    pub location: PackageLocation,
    pub outcome: ApplyOutcome,
    pub message: String,
    pub pull_request: Option<PullRequestDescriptor>,
}

pub struct PatchWorkflow<'a, P: Prompt, R: PackageRegistry> {
    config: &'a Config,
    gerrit: &'a GerritClient,
    registry: &'a R,
    runner: &'a CommandRunner,
    prompt: &'a mut P,
}

impl<'a, P: Prompt, R: PackageRegistry> PatchWorkflow<'a, P, R> {
    pub fn new(
        config: &'a Config,
        gerrit: &'a GerritClient,
        registry: &'a R,
        runner: &'a CommandRunner,
        prompt: &'a mut P,
    ) -> Self {
        Self {
            config,
            gerrit,
            registry,
            runner,
            prompt,
        }
    }

    // Returns `None` when the operator declines to apply the patch.
    pub async fn run(
        &mut self,
        change: u32,
        options: PatchOptions,
        github: Option<&GitHubClient>,
    ) -> Result<Option<PatchReport>> {
        console::line("Requesting patch details from gerrit.");
        let detail = self.gerrit.change_detail(change).await?;
        let location = self.registry.resolve(detail.package_key()?)?;
        let key = location.package_key.as_str();
        tracing::debug!(package = %location.package_path.display(), collection = %location.collection, "package resolved");
        console::line(&format!(
            "Determined {key} as the target package key for \"{}\".",
            detail.subject
        ));

        let commit = self.gerrit.commit_detail(change).await?;
        let parent = commit.parent().ok_or_else(|| {
            ContributeError::GerritResponseUnparsable(format!("change {change} has no parent commit"))
        })?;

        let collection_path = location.collection_path.clone();
        let git = Git::new(self.runner, &collection_path);
        let local_parent = git
            .find_commit_by_message(parent)?
            .ok_or_else(|| ContributeError::ParentCommitNotFound(parent.to_string()))?;

        if !git.is_clean()? {
            return Err(ContributeError::DirtyWorkingTree(git.dir().to_path_buf()));
        }

        let branch = branch_name(change);
        let original = git.current_branch()?;
        git.checkout_new_branch(&branch)?;

        let patch = match self.review_patch(&git, change, key, &local_parent).await {
            Ok(Some(patch)) => patch,
            Ok(None) => {
                abandon_branch(&git, &original, &branch)?;
                return Ok(None);
            }
            Err(e) => {
                if let Err(cleanup) = abandon_branch(&git, &original, &branch) {
                    tracing::warn!(error = %cleanup, branch = %branch, "could not remove patch branch");
                }
                return Err(e);
            }
        };

        git.am(key, &patch)?;
        console::success(&format!("Successfully applied patch {change}"));

        let touched = git.files_in_last_commit()?;
        git.reset_soft("HEAD~1")?;
        if options.normalize {
            let relicensed = Normalizer::new(self.runner, &self.config.normalize)
                .normalize(&collection_path, &touched)?;
            tracing::debug!(count = relicensed.len(), "license headers rewritten");
        }

        git.stash()?;
        git.reset_hard(MASTER_BRANCH)?;
        let outcome = ApplyOutcome::from_stash_pop(&git.stash_pop()?);

        let mut report = PatchReport {
            change,
            branch,
            location,
            outcome,
            message: commit.cleaned_message(),
            pull_request: None,
        };

        if options.create_pull_request {
            report.pull_request = self.open_pull_request(&git, &report, &commit, github).await?;
        }

        Ok(Some(report))
    }

    // moves the branch to the parent and shows what the patch would change;
    // `None` when the operator declines
    async fn review_patch(
        &mut self,
        git: &Git<'_>,
        change: u32,
        key: &str,
        parent: &str,
    ) -> Result<Option<PathBuf>> {
        git.reset_hard(parent)?;

        let patch = self.gerrit.current_revision_patch(change).await?;
        console::success("Successfully fetched changeset from gerrit.");

        console::line(&format!("The following changes will be applied to package {key}"));
        git.apply_check(key, &patch)?;
        console::line(&git.apply_stat(key, &patch)?);

        let apply = self
            .prompt
            .confirm("\nWould you like to apply this patch? (Y/n): ", true)?;
        Ok(apply.then_some(patch))
    }

    async fn open_pull_request(
        &self,
        git: &Git<'_>,
        report: &PatchReport,
        commit: &CommitDetail,
        github: Option<&GitHubClient>,
    ) -> Result<Option<PullRequestDescriptor>> {
        if report.outcome == ApplyOutcome::Conflicted {
            console::warning("Not opening a pull request while conflicts are unresolved.");
            return Ok(None);
        }
        let Some(github) = github else {
            console::warning("Not opening a pull request: no GitHub access token configured.");
            return Ok(None);
        };

        git.add_all()?;
        git.commit(&report.message)?;
        git.push("origin", &report.branch)?;

        let pull_request = github
            .create_pull_request(
                &self.config.github.origin.organization,
                self.canonical_repository(&report.location.collection),
                &report.branch,
                &commit.subject,
                &commit.body(),
            )
            .await?;
        console::success(&format!(
            "Successfully opened pull request {} for patch {}",
            pull_request.html_url, report.change
        ));
        Ok(Some(pull_request))
    }

    fn canonical_repository<'c>(&'c self, collection: &'c str) -> &'c str {
        self.config
            .github
            .origin
            .repositories
            .get(collection)
            .map(|r| r.name.as_str())
            .unwrap_or(collection)
    }

    pub fn print_report(&self, report: &PatchReport, login: Option<&str>) {
        match report.outcome {
            ApplyOutcome::Clean => console::success(&format!(
                "\nPatch {} applied cleanly on top of {MASTER_BRANCH}.",
                report.change
            )),
            ApplyOutcome::Conflicted => console::warning(&format!(
                "\nPatch {} applied with conflicts on top of {MASTER_BRANCH}.",
                report.change
            )),
        }

        if report.pull_request.is_some() {
            return;
        }

        console::heading("Commit message");
        console::line(&report.message);

        console::heading("Next steps");
        let path = report.location.collection_path.display();
        let mut step = 1;
        if report.outcome == ApplyOutcome::Conflicted {
            console::line(&format!("{step}. Resolve the conflicts in {path} and stage the result."));
            step += 1;
        }
        console::line(&format!("{step}. Commit the change using the message above."));
        console::line(&format!("{}. git push origin {}", step + 1, report.branch));

        let organization = &self.config.github.origin.organization;
        let repository = self.canonical_repository(&report.location.collection);
        let url = match login {
            Some(login) => format!(
                "https://github.com/{organization}/{repository}/compare/{MASTER_BRANCH}...{login}:{}",
                report.branch
            ),
            None => format!("https://github.com/{organization}/{repository}/pulls"),
        };
        console::line(&format!("{}. Open the pull request: {url}", step + 2));
    }
}

fn abandon_branch(git: &Git<'_>, original: &str, branch: &str) -> Result<()> {
    git.checkout(original)?;
    git.delete_branch(branch)
}
