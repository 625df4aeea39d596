use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::error::{CanvasError, CanvasResult};

/// Resolves an image reference string to encoded bytes.
///
/// Implementations must be shareable across the loader threads.
pub trait ImageFetcher: Send + Sync {
    /// Fetch the raw encoded bytes behind `reference`.
    fn fetch(&self, reference: &str) -> CanvasResult<Vec<u8>>;
}

#[cfg(feature = "http")]
const HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Fetcher for `data:` URLs, `http(s)` URLs (with the `http` feature) and filesystem paths.
#[derive(Default)]
pub struct DefaultFetcher {
    root: Option<PathBuf>,
    #[cfg(feature = "http")]
    client: std::sync::OnceLock<reqwest::blocking::Client>,
}

impl DefaultFetcher {
    /// Fetcher resolving relative paths against the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher resolving relative paths against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    /// Root used for relative paths, if any.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub(crate) fn resolve_path(&self, reference: &str) -> PathBuf {
        let raw = reference.strip_prefix("file://").unwrap_or(reference);
        let path = Path::new(raw);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    #[cfg(feature = "http")]
    fn fetch_http(&self, url: &str) -> CanvasResult<Vec<u8>> {
        let client = match self.client.get() {
            Some(c) => c,
            None => {
                let built = reqwest::blocking::Client::builder()
                    .timeout(HTTP_TIMEOUT)
                    .build()
                    .context("build http client")?;
                self.client.get_or_init(|| built)
            }
        };
        let resp = client
            .get(url)
            .send()
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url}"))?;
        let bytes = resp.bytes().with_context(|| format!("read body of {url}"))?;
        Ok(bytes.to_vec())
    }

    #[cfg(not(feature = "http"))]
    fn fetch_http(&self, url: &str) -> CanvasResult<Vec<u8>> {
        Err(CanvasError::validation(format!(
            "cannot fetch '{url}': built without the 'http' feature"
        )))
    }
}

impl ImageFetcher for DefaultFetcher {
    fn fetch(&self, reference: &str) -> CanvasResult<Vec<u8>> {
        if let Some(rest) = reference.strip_prefix("data:") {
            return decode_data_url(rest);
        }
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return self.fetch_http(reference);
        }

        let path = self.resolve_path(reference);
        std::fs::read(&path)
            .with_context(|| format!("read image bytes from '{}'", path.display()))
            .map_err(CanvasError::from)
    }
}

/// Decode the part of a `data:` URL after the scheme.
fn decode_data_url(rest: &str) -> CanvasResult<Vec<u8>> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| CanvasError::validation("data URL is missing ','"))?;
    if meta.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(cleaned.as_bytes())
            .context("decode base64 data URL payload")?;
        Ok(bytes)
    } else {
        Ok(percent_decode(payload))
    }
}

fn percent_decode(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(h), Some(l)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2]))
        {
            out.push(h * 16 + l);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

fn hex_val(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
