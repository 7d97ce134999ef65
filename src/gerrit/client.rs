use crate::error::{ContributeError, Result};
use crate::gerrit::types::{ChangeDetail, CommitDetail};
use serde::de::DeserializeOwned;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

// Gerrit prefixes every JSON body with `)]}'` to defeat XSSI.
const XSSI_PREFIX_LEN: usize = 4;

#[derive(Clone)]
pub struct GerritClient {
    http: reqwest::Client,
    base_url: String,
    patch_directory: PathBuf,
}

impl GerritClient {
    pub fn new(base_url: &str, patch_directory: impl Into<PathBuf>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("neos-contribute/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            patch_directory: patch_directory.into(),
        })
    }

    fn change_url(&self, change: u32, endpoint: &str) -> String {
        format!("{}/changes/{change}/{endpoint}", self.base_url)
    }

    pub async fn change_detail(&self, change: u32) -> Result<ChangeDetail> {
        self.request_json(&self.change_url(change, "detail")).await
    }

    pub async fn commit_detail(&self, change: u32) -> Result<CommitDetail> {
        self.request_json(&self.change_url(change, "revisions/current/commit"))
            .await
    }

    // the zip holds a single mbox patch named after the revision
    pub async fn current_revision_patch(&self, change: u32) -> Result<PathBuf> {
        let url = self.change_url(change, "revisions/current/patch?zip");
        let body = self.request(&url).await?;

        std::fs::create_dir_all(&self.patch_directory)?;
        let zip_path = self.patch_directory.join(format!("{change}.zip"));
        std::fs::write(&zip_path, &body)?;

        let extracted = std::fs::File::open(&zip_path)
            .map_err(ContributeError::from)
            .and_then(|file| extract_first_entry(file, &self.patch_directory));
        std::fs::remove_file(&zip_path)?;
        let patch = extracted?;

        tracing::debug!(change, patch = %patch.display(), "patch extracted");
        Ok(patch)
    }

    async fn request(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(url, "gerrit request");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContributeError::ProviderRequestFailed {
                provider: "gerrit",
                message: format!("GET {url} returned {status}"),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn request_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.request(url).await?;
        parse_response(&body)
    }
}

pub fn parse_response<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let payload = body.get(XSSI_PREFIX_LEN..).ok_or_else(|| {
        ContributeError::GerritResponseUnparsable(format!(
            "body of {} bytes is shorter than the response prefix",
            body.len()
        ))
    })?;
    serde_json::from_slice(payload)
        .map_err(|e| ContributeError::GerritResponseUnparsable(e.to_string()))
}

fn extract_first_entry<R: Read + Seek>(archive: R, dest_dir: &Path) -> Result<PathBuf> {
    let mut archive = zip::ZipArchive::new(archive)?;
    let mut entry = archive.by_index(0)?;

    let relative = entry.enclosed_name().ok_or_else(|| {
        ContributeError::Archive(format!("entry {} escapes the patch directory", entry.name()))
    })?;
    let target = dest_dir.join(relative);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(&target)?;
    std::io::copy(&mut entry, &mut file)?;
    Ok(target)
}
