#![cfg(test)]

use crate::error::{ContributeError, Result};
use crate::git::commands::Git;
use crate::prompt::{parse_confirmation, Prompt};
use crate::runner::{CommandLine, CommandRunner};
use std::collections::VecDeque;
use std::io::{Cursor, Write};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asked {
    Confirm,
    Ask,
    Hidden,
}

// Answers prompts from a script and records every question.
#[derive(Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    pub asked: Vec<(Asked, String)>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            asked: Vec::new(),
        }
    }

    fn next(&mut self, kind: Asked, question: &str) -> Result<String> {
        self.asked.push((kind, question.to_string()));
        self.answers
            .pop_front()
            .ok_or_else(|| ContributeError::Prompt(format!("no scripted answer for {question:?}")))
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let answer = self.next(Asked::Confirm, question)?;
        Ok(parse_confirmation(&answer, default))
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        self.next(Asked::Ask, question)
    }

    fn ask_hidden(&mut self, question: &str) -> Result<String> {
        self.next(Asked::Hidden, question)
    }
}

// `git init` on `master` with a local identity so commits work anywhere.
pub fn init_repo(runner: &CommandRunner, dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    let git = |args: &[&str]| {
        runner.run(&CommandLine::git().args(args), dir).unwrap();
    };
    git(&["init", "--quiet"]);
    git(&["symbolic-ref", "HEAD", "refs/heads/master"]);
    git(&["config", "user.name", "Test Contributor"]);
    git(&["config", "user.email", "contributor@example.com"]);
    git(&["config", "commit.gpgsign", "false"]);
}

pub fn commit_file(git: &Git<'_>, file: &str, content: &str, message: &str) {
    let path = git.dir().join(file);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
    git.add_all().unwrap();
    git.commit(message).unwrap();
}

pub fn zip_with(name: &str, content: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    writer.start_file(name, options).unwrap();
    writer.write_all(content.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

pub fn user_json(login: &str) -> serde_json::Value {
    let api = format!("https://api.github.com/users/{login}");
    serde_json::json!({
        "login": login,
        "id": 583231,
        "node_id": "MDQ6VXNlcjU4MzIzMQ==",
        "avatar_url": "https://avatars.githubusercontent.com/u/583231",
        "gravatar_id": "",
        "url": api,
        "html_url": format!("https://github.com/{login}"),
        "followers_url": format!("{api}/followers"),
        "following_url": format!("{api}/following"),
        "gists_url": format!("{api}/gists"),
        "starred_url": format!("{api}/starred"),
        "subscriptions_url": format!("{api}/subscriptions"),
        "organizations_url": format!("{api}/orgs"),
        "repos_url": format!("{api}/repos"),
        "events_url": format!("{api}/events"),
        "received_events_url": format!("{api}/received_events"),
        "type": "User",
        "site_admin": false
    })
}

pub fn repository_json(owner: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": 1296269,
        "name": name,
        "full_name": format!("{owner}/{name}"),
        "url": format!("https://api.github.com/repos/{owner}/{name}"),
        "html_url": format!("https://github.com/{owner}/{name}"),
        "ssh_url": format!("git@github.com:{owner}/{name}.git"),
        "fork": true
    })
}

pub fn pull_request_json(owner: &str, repo: &str, number: u64) -> serde_json::Value {
    serde_json::json!({
        "url": format!("https://api.github.com/repos/{owner}/{repo}/pulls/{number}"),
        "id": 1,
        "number": number,
        "html_url": format!("https://github.com/{owner}/{repo}/pull/{number}"),
        "head": { "ref": "gerrit-32240", "sha": "6dcb09b5b57875f334f61aebed695e2e4193db5e" },
        "base": { "ref": "master", "sha": "6dcb09b5b57875f334f61aebed695e2e4193db5e" }
    })
}

pub async fn mount_github_user(server: &MockServer, login: &str) {
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(login)))
        .mount(server)
        .await;
}
