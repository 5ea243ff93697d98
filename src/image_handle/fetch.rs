use std::{
    collections::HashMap,
    io::Read,
    path::Path,
    sync::atomic::{AtomicUsize, Ordering::Relaxed},
    time::Duration,
};

use log::trace;
use parking_lot::RwLock;

use crate::FetchError;

/// Source of raw image bytes. Proxy, session and cookie handling live behind this trait.
pub trait Fetcher: Send + Sync {
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    fn open_local_file(&self, path: &Path) -> Result<Vec<u8>, FetchError> {
        std::fs::read(path).map_err(|src| FetchError::LocalFile {
            path: path.to_path_buf(),
            src,
        })
    }
}

#[derive(Debug, Clone)]
pub struct HttpFetcherCfg {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub proxy: Option<String>,
    pub max_bytes: u64,
}

impl Default for HttpFetcherCfg {
    fn default() -> Self {
        Self {
            user_agent: concat!("poster_finder/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 20,
            proxy: None,
            max_bytes: 32 * 1024 * 1024,
        }
    }
}

/// Blocking HTTP fetcher.
pub struct HttpFetcher {
    agent: ureq::Agent,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(cfg: &HttpFetcherCfg) -> Result<Self, FetchError> {
        let timeout = Duration::from_secs(cfg.timeout_secs);
        let mut builder = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .user_agent(&cfg.user_agent);

        if let Some(proxy_url) = &cfg.proxy {
            let proxy = ureq::Proxy::new(proxy_url).map_err(|e| FetchError::Transport {
                url: proxy_url.clone(),
                reason: e.to_string(),
            })?;
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            agent: builder.build(),
            max_bytes: cfg.max_bytes,
        })
    }

    pub fn agent(&self) -> &ureq::Agent {
        &self.agent
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        trace!("GET {url}");
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                return Err(FetchError::Status {
                    url: url.to_owned(),
                    status,
                })
            }
            Err(e) => {
                return Err(FetchError::Transport {
                    url: url.to_owned(),
                    reason: e.to_string(),
                })
            }
        };

        let mut bytes = vec![];
        response
            .into_reader()
            .take(self.max_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| FetchError::Transport {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;

        if bytes.len() as u64 > self.max_bytes {
            return Err(FetchError::TooLarge {
                url: url.to_owned(),
                limit: self.max_bytes,
            });
        }

        Ok(bytes)
    }
}

/// Serves bytes that the caller already holds, keyed by URL. Counts every remote request.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    requests: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: impl Into<String>, bytes: Vec<u8>) {
        self.entries.write().insert(url.into(), bytes);
    }

    /// Number of `fetch_bytes` calls so far, hits and misses alike.
    pub fn requests(&self) -> usize {
        self.requests.load(Relaxed)
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.fetch_add(1, Relaxed);
        self.entries
            .read()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_owned()))
    }
}
