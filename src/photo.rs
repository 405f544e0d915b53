use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use anyhow::Context;

use crate::error::DashboardError;

/// Where a photo reference points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSource {
    Local(PathBuf),
    Remote(String),
}

impl PhotoSource {
    /// `http://` and `https://` references are remote, anything else is a
    /// local path. Blank references give `None`.
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        let lower = reference.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Some(PhotoSource::Remote(reference.to_string()))
        } else {
            Some(PhotoSource::Local(PathBuf::from(reference)))
        }
    }
}

type Fetcher = Box<dyn Fn(&str) -> anyhow::Result<Vec<u8>> + Send>;

/// Download `url` and return the response body.
pub fn fetch_http(url: &str) -> anyhow::Result<Vec<u8>> {
    let bytes = ureq::get(url)
        .call()
        .with_context(|| format!("requesting {url}"))?
        .into_body()
        .read_to_vec()
        .with_context(|| format!("reading {url}"))?;
    Ok(bytes)
}

/// Resolves photo references to local image files, downloading remote ones
/// once per URL. Failed downloads are remembered too, so a broken URL is
/// not requested again on every refresh.
pub struct PhotoCache {
    dir: PathBuf,
    fetch: Fetcher,
    remote: HashMap<String, Option<PathBuf>>,
}

impl PhotoCache {
    pub fn new(dir: PathBuf) -> Self {
        Self::with_fetcher(dir, fetch_http)
    }

    pub fn with_fetcher(
        dir: PathBuf,
        fetch: impl Fn(&str) -> anyhow::Result<Vec<u8>> + Send + 'static,
    ) -> Self {
        Self {
            dir,
            fetch: Box::new(fetch),
            remote: HashMap::new(),
        }
    }

    /// Local file for `reference`, or `MissingAsset` when there is none.
    pub fn resolve(&mut self, reference: &str) -> Result<PathBuf, DashboardError> {
        match PhotoSource::parse(reference) {
            None => Err(DashboardError::MissingAsset(PathBuf::new())),
            Some(PhotoSource::Local(path)) => {
                if path.exists() {
                    Ok(path)
                } else {
                    Err(DashboardError::MissingAsset(path))
                }
            }
            Some(PhotoSource::Remote(url)) => {
                let cached = match self.remote.get(&url) {
                    Some(entry) => entry.clone(),
                    None => {
                        let entry = match self.download(&url) {
                            Ok(path) => Some(path),
                            Err(e) => {
                                log::warn!("Photo {url} unavailable: {e:#}");
                                None
                            }
                        };
                        self.remote.insert(url.clone(), entry.clone());
                        entry
                    }
                };
                cached.ok_or_else(|| DashboardError::MissingAsset(PathBuf::from(url)))
            }
        }
    }

    /// Number of URLs fetched so far, including failures.
    pub fn len(&self) -> usize {
        self.remote.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remote.is_empty()
    }

    fn download(&self, url: &str) -> anyhow::Result<PathBuf> {
        let bytes = (self.fetch)(url)?;
        let format = image::guess_format(&bytes).context("response is not an image")?;
        let ext = format.extensions_str().first().copied().unwrap_or("img");

        let mut hasher = DefaultHasher::new();
        url.hash(&mut hasher);
        let path = self.dir.join(format!("foto_{:016x}.{ext}", hasher.finish()));

        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        std::fs::write(&path, &bytes).with_context(|| format!("writing {}", path.display()))?;
        log::debug!("Photo {url} -> {}", path.display());
        Ok(path)
    }
}

impl std::fmt::Debug for PhotoCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoCache")
            .field("dir", &self.dir)
            .field("remote", &self.remote)
            .finish()
    }
}
