//! The mount table.

use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::VfsError;
use crate::provider::VfsProvider;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

struct Mount {
    prefix: String,
    provider: Box<dyn VfsProvider>,
}

/// Ordered mount prefixes plus an HTTP client.
///
/// A path is served by the mount with the longest matching prefix; the
/// provider sees the path with that prefix stripped. Paths starting with
/// `http://` or `https://` are fetched over the network instead.
pub struct Vfs {
    mounts: Vec<Mount>,
    client: reqwest::Client,
}

impl Vfs {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self::with_client(client)
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            mounts: Vec::new(),
            client,
        }
    }

    /// Mount `provider` at `prefix`, replacing any provider already there.
    pub fn mount(&mut self, prefix: impl Into<String>, provider: impl VfsProvider + 'static) -> &mut Self {
        let prefix = prefix.into();
        let provider: Box<dyn VfsProvider> = Box::new(provider);
        match self.mounts.iter_mut().find(|m| m.prefix == prefix) {
            Some(existing) => existing.provider = provider,
            None => self.mounts.push(Mount { prefix, provider }),
        }
        self
    }

    /// Mount prefixes in insertion order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.mounts.iter().map(|m| m.prefix.as_str())
    }

    fn resolve<'p>(&self, path: &'p str) -> Option<(&Mount, &'p str)> {
        self.mounts
            .iter()
            .filter_map(|m| path.strip_prefix(m.prefix.as_str()).map(|rest| (m, rest)))
            .max_by_key(|(m, _)| m.prefix.len())
    }

    /// Read a path from the mount table only. URLs are not fetched.
    pub fn read_mounted(&self, path: &str) -> Result<String, VfsError> {
        match self.resolve(path) {
            Some((mount, rest)) => {
                debug!(target: "scamp::vfs", path, prefix = %mount.prefix, "reading from mount");
                mount.provider.read(rest)
            }
            None => Err(VfsError::NotFound(path.to_string())),
        }
    }

    /// Read a path: URLs are fetched, everything else goes through the mount table.
    pub async fn read(&self, path: &str) -> Result<String, VfsError> {
        if is_url(path) {
            self.fetch(path).await
        } else if let Some((scheme, _)) = path.split_once("://") {
            Err(VfsError::Scheme(scheme.to_string()))
        } else {
            self.read_mounted(path)
        }
    }

    /// The file system is read-only.
    pub fn write(&self, path: &str, _contents: &str) -> Result<(), VfsError> {
        Err(VfsError::Unsupported {
            operation: "write",
            path: path.to_string(),
        })
    }

    async fn fetch(&self, url: &str) -> Result<String, VfsError> {
        debug!(target: "scamp::vfs", url, "fetching");
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(target: "scamp::vfs", url, error = %e, "fetch failed");
            VfsError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(target: "scamp::vfs", url, %status, "fetch returned an error status");
            return Err(if status == reqwest::StatusCode::NOT_FOUND {
                VfsError::NotFound(url.to_string())
            } else {
                VfsError::Fetch {
                    url: url.to_string(),
                    reason: format!("HTTP {status}"),
                }
            });
        }

        response.text().await.map_err(|e| VfsError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl Default for Vfs {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Vfs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vfs")
            .field("mounts", &self.prefixes().collect::<Vec<_>>())
            .finish()
    }
}

fn is_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}
