use crate::error::{ContributeError, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub const GITHUB_NAMESPACE: &str = "gitHub";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub packages_path: PathBuf,
    #[serde(rename = "gitHub")]
    pub github: GitHubSettings,
    pub gerrit: GerritSettings,
    pub normalize: NormalizeSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubSettings {
    pub api_url: String,
    pub origin: OriginSettings,
    pub contributor: ContributorSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginSettings {
    pub organization: String,
    #[serde(default)]
    pub repositories: BTreeMap<String, OriginRepository>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginRepository {
    pub name: String,
    pub package_directory: PathBuf,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorSettings {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub repositories: BTreeMap<String, ContributorRepository>,
}

impl fmt::Debug for ContributorSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.access_token.is_empty() {
            ""
        } else {
            "[REDACTED]"
        };
        f.debug_struct("ContributorSettings")
            .field("access_token", &token)
            .field("repositories", &self.repositories)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorRepository {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GerritSettings {
    pub url: String,
    pub patch_directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizeSettings {
    pub formatter: Vec<String>,
    pub extensions: Vec<String>,
}

fn default_origin_repositories() -> BTreeMap<String, OriginRepository> {
    BTreeMap::from([
        (
            "flow".to_string(),
            OriginRepository {
                name: "flow-development-collection".to_string(),
                package_directory: PathBuf::from("Framework"),
            },
        ),
        (
            "neos".to_string(),
            OriginRepository {
                name: "neos-development-collection".to_string(),
                package_directory: PathBuf::from("Application"),
            },
        ),
    ])
}

impl Default for Config {
    fn default() -> Self {
        Self {
            packages_path: PathBuf::from("Packages"),
            github: GitHubSettings {
                api_url: "https://api.github.com".to_string(),
                origin: OriginSettings {
                    organization: "neos".to_string(),
                    repositories: default_origin_repositories(),
                },
                contributor: ContributorSettings {
                    access_token: String::new(),
                    repositories: BTreeMap::new(),
                },
            },
            gerrit: GerritSettings {
                url: "https://review.typo3.org".to_string(),
                patch_directory: std::env::temp_dir().join("GerritPatches"),
            },
            normalize: NormalizeSettings {
                formatter: vec![
                    "php-cs-fixer".to_string(),
                    "fix".to_string(),
                    "--rules=@PSR2".to_string(),
                ],
                extensions: vec!["php".to_string()],
            },
        }
    }
}

impl Config {
    pub fn load(settings_file: &Path) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if settings_file.exists() {
            figment = figment.merge(Toml::file(settings_file));
        }

        figment = figment.merge(
            Env::prefixed("CONTRIBUTE_")
                .lowercase(false)
                .map(|key| env_key(key.as_str()).into()),
        );

        figment
            .extract()
            .map_err(|e| ContributeError::Config(e.to_string()))
    }

    pub fn collection_path(&self, collection: &str) -> Option<PathBuf> {
        self.github
            .origin
            .repositories
            .get(collection)
            .map(|repo| self.packages_path.join(&repo.package_directory))
    }

    pub fn collections(&self) -> impl Iterator<Item = &str> {
        self.github.origin.repositories.keys().map(String::as_str)
    }
}

impl GitHubSettings {
    pub fn contributor_repository(&self, collection: &str) -> &str {
        self.contributor
            .repositories
            .get(collection)
            .map(|r| r.name.as_str())
            .unwrap_or("")
    }

    pub fn set_contributor_repository(&mut self, collection: &str, name: &str) {
        self.contributor
            .repositories
            .entry(collection.to_string())
            .or_default()
            .name = name.to_string();
    }
}

// CONTRIBUTE_GITHUB__CONTRIBUTOR__ACCESSTOKEN -> gitHub.contributor.accessToken
fn env_key(raw: &str) -> String {
    let key = raw.to_ascii_lowercase().replace("__", ".");
    let mut segments = key.split('.');
    if segments.next() != Some("github") {
        return key;
    }
    std::iter::once(GITHUB_NAMESPACE)
        .chain(segments.map(|segment| match segment {
            "apiurl" => "apiUrl",
            "accesstoken" => "accessToken",
            "packagedirectory" => "packageDirectory",
            other => other,
        }))
        .collect::<Vec<_>>()
        .join(".")
}

pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn default_settings_file() -> PathBuf {
    config_dir().join("neos-contribute").join("settings.toml")
}
