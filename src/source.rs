//! Where the content document is loaded from. Every fetch goes to the
//! origin; nothing is cached here and caches along the way are asked
//! not to answer.

use std::{fmt, io::ErrorKind, path::{Path, PathBuf}, time::Duration};

use anyhow::{Result, Context, anyhow};
use reqwest::header::{CACHE_CONTROL, PRAGMA};

use crate::http_response_status_codes::{HttpResponseStatusCode, is_success_code};

pub const DEFAULT_RESOURCE: &str = "content.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(body: String) -> FetchResponse {
        FetchResponse { status: HttpResponseStatusCode::OK200.code(), body }
    }

    pub fn from_status(status: HttpResponseStatusCode) -> FetchResponse {
        FetchResponse { status: status.code(), body: String::new() }
    }

    pub fn is_success(&self) -> bool {
        is_success_code(self.status)
    }
}

/// A place to fetch the content resource from. `Err` means the
/// resource couldn't be reached at all (transport failure); a
/// response with a non-success status is not an error at this level.
pub trait ContentSource: fmt::Display + Send + Sync {
    fn fetch(&self) -> Result<FetchResponse>;
}


/// A file on disk, read anew on every fetch.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> FileSource {
        FileSource { path: path.into() }
    }
}

impl fmt::Display for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.to_string_lossy())
    }
}

impl ContentSource for FileSource {
    fn fetch(&self) -> Result<FetchResponse> {
        match std::fs::read_to_string(&self.path) {
            Ok(body) => Ok(FetchResponse::ok(body)),
            Err(e) => match e.kind() {
                ErrorKind::NotFound =>
                    Ok(FetchResponse::from_status(HttpResponseStatusCode::NotFound404)),
                ErrorKind::PermissionDenied =>
                    Ok(FetchResponse::from_status(HttpResponseStatusCode::Forbidden403)),
                _ => Err(e).with_context(
                    || anyhow!("reading {:?}", self.path.to_string_lossy())),
            }
        }
    }
}


/// An http(s) URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<HttpSource> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(HttpSource {
            url: url.to_string(),
            client: builder.build().with_context(|| anyhow!("building HTTP client"))?,
        })
    }
}

impl fmt::Display for HttpSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl ContentSource for HttpSource {
    fn fetch(&self) -> Result<FetchResponse> {
        let response = self.client.get(&self.url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .with_context(|| anyhow!("requesting {}", self.url))?;
        let status = response.status().as_u16();
        let body = response.text()
            .with_context(|| anyhow!("reading response body from {}", self.url))?;
        Ok(FetchResponse { status, body })
    }
}


/// A fixed response, for embedding and tests.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    response: FetchResponse,
}

impl StaticSource {
    pub fn new(name: &str, response: FetchResponse) -> StaticSource {
        StaticSource { name: name.into(), response }
    }

    pub fn json(body: &str) -> StaticSource {
        StaticSource::new(DEFAULT_RESOURCE, FetchResponse::ok(body.into()))
    }
}

impl fmt::Display for StaticSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl ContentSource for StaticSource {
    fn fetch(&self) -> Result<FetchResponse> {
        Ok(self.response.clone())
    }
}


/// `location` is either an http(s) URL or a path; relative paths are
/// taken to be relative to `base_dir` (the directory of the page).
pub fn source_from_location(
    location: &str,
    base_dir: &Path,
    timeout: Option<Duration>,
) -> Result<Box<dyn ContentSource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpSource::new(location, timeout)?))
    } else {
        let path = Path::new(location);
        Ok(Box::new(FileSource::new(
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                base_dir.join(path)
            })))
    }
}
