use crate::config::{Config, GitHubSettings, GITHUB_NAMESPACE};
use crate::error::{ContributeError, Result};
use std::path::{Path, PathBuf};

// only the `gitHub` namespace is written back, other keys stay as found
pub struct SettingsStore {
    path: PathBuf,
    config: Config,
}

impl SettingsStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = Config::load(&path)?;
        tracing::debug!(?config, "configuration resolved");
        Ok(Self { path, config })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn github(&self) -> &GitHubSettings {
        &self.config.github
    }

    pub fn github_mut(&mut self) -> &mut GitHubSettings {
        &mut self.config.github
    }

    pub fn save(&self) -> Result<()> {
        let mut document = match std::fs::read_to_string(&self.path) {
            Ok(content) => content
                .parse::<toml::Table>()
                .map_err(|e| ContributeError::Config(format!("{}: {e}", self.path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => toml::Table::new(),
            Err(e) => return Err(e.into()),
        };

        let github = toml::Value::try_from(&self.config.github)
            .map_err(|e| ContributeError::Config(e.to_string()))?;
        document.insert(GITHUB_NAMESPACE.to_string(), github);

        let content = toml::to_string_pretty(&document)
            .map_err(|e| ContributeError::Config(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, content)?;
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}
