use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context};
use tokio::fs;

use crate::settings::Config;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bucket {
    Avatars,
    ProfilePics,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Avatars => "avatars",
            Bucket::ProfilePics => "profile_pics",
        }
    }
}

/// Bucket store on the local filesystem, one directory per bucket.
#[derive(Clone, Debug)]
pub struct ObjectStorage {
    root: PathBuf,
    public_url: String,
}

impl ObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_url: &str) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.storage_path, &config.storage_public_url)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: Bucket, path: &str) -> anyhow::Result<PathBuf> {
        let relative = Path::new(path);
        if path.is_empty()
            || relative
                .components()
                .any(|item| !matches!(item, Component::Normal(_)))
        {
            bail!("invalid object path: {path}");
        }
        Ok(self.root.join(bucket.as_str()).join(relative))
    }

    /// Writes the object and returns its path inside the bucket.
    pub async fn upload(
        &self,
        bucket: Bucket,
        path: &str,
        data: &[u8],
        upsert: bool,
    ) -> anyhow::Result<String> {
        let target = self.object_path(bucket, path)?;
        if !upsert && fs::try_exists(&target).await? {
            bail!("object already exists: {}/{}", bucket.as_str(), path);
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        fs::write(&target, data)
            .await
            .with_context(|| format!("write object {}", target.display()))?;
        tracing::debug!("stored {} bytes at {}/{}", data.len(), bucket.as_str(), path);
        Ok(path.to_string())
    }

    /// Returns whether an object was removed.
    pub async fn remove(&self, bucket: Bucket, path: &str) -> anyhow::Result<bool> {
        let target = self.object_path(bucket, path)?;
        if !fs::try_exists(&target).await? {
            return Ok(false);
        }
        fs::remove_file(&target).await?;
        Ok(true)
    }

    pub fn public_url(&self, bucket: Bucket, path: &str) -> String {
        format!("{}/{}/{}", self.public_url, bucket.as_str(), path)
    }

    /// Inverse of [`ObjectStorage::public_url`] for objects of this store.
    pub fn path_from_public_url(&self, bucket: Bucket, url: &str) -> Option<String> {
        let prefix = format!("{}/{}/", self.public_url, bucket.as_str());
        url.strip_prefix(&prefix).map(|item| item.to_string())
    }
}

/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

pub fn file_extension(name: &str) -> Option<String> {
    let name = sanitize_file_name(name);
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
