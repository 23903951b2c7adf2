//! Image download and caching.

use std::collections::{HashMap, VecDeque};
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderValue};

use super::RasterError;
use crate::fetch::USER_AGENT;

/// Largest image body accepted, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const IMAGE_TIMEOUT: Duration = Duration::from_secs(10);
const CACHE_CAPACITY: usize = 50;

/// Outcome of loading one URL: the bytes, or why they are unavailable.
pub type CachedImage = Result<Arc<[u8]>, RasterError>;

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, CachedImage>,
    order: VecDeque<String>,
}

impl CacheInner {
    fn touch(&mut self, url: &str) {
        if let Some(pos) = self.order.iter().position(|key| key == url)
            && let Some(key) = self.order.remove(pos)
        {
            self.order.push_back(key);
        }
    }
}

/// Bounded LRU cache of image loads per URL, failures included.
#[derive(Debug, Default, Clone)]
pub struct ImageCache {
    inner: Arc<Mutex<CacheInner>>,
    max_size: usize,
}

impl ImageCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner::default())),
            max_size,
        }
    }

    /// Look up `url`, marking it most recently used on a hit.
    pub fn get(&self, url: &str) -> Option<CachedImage> {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let entry = guard.entries.get(url).cloned()?;
        guard.touch(url);
        Some(entry)
    }

    /// Insert an entry, evicting the least recently used once over capacity.
    pub fn insert(&self, url: String, entry: CachedImage) {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if guard.entries.contains_key(&url) {
            guard.touch(&url);
            guard.entries.insert(url, entry);
            return;
        }

        guard.order.push_back(url.clone());
        guard.entries.insert(url, entry);

        while guard.entries.len() > self.max_size {
            if let Some(oldest) = guard.order.pop_front() {
                guard.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        let guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source of raw image bytes by URL.
pub trait ImageSource {
    /// # Errors
    ///
    /// Returns [`RasterError`] when the bytes cannot be obtained.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, RasterError>;
}

/// Blocking HTTP image download with a size limit.
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: Client,
}

impl HttpImageSource {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, RasterError> {
        let client = Client::builder()
            .timeout(IMAGE_TIMEOUT)
            .gzip(true)
            .brotli(true)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| RasterError::Fetch(err.to_string()))?;
        Ok(Self { client })
    }
}

impl ImageSource for HttpImageSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, RasterError> {
        if url.is_empty() {
            return Err(RasterError::EmptyUrl);
        }
        let response = self
            .client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static("image/*"))
            .send()
            .map_err(|err| RasterError::Fetch(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RasterError::Fetch(format!("HTTP {}", status.as_u16())));
        }
        if response
            .content_length()
            .is_some_and(|len| len > MAX_IMAGE_BYTES as u64)
        {
            return Err(RasterError::TooLarge);
        }

        let mut body = Vec::new();
        response
            .take(MAX_IMAGE_BYTES as u64 + 1)
            .read_to_end(&mut body)
            .map_err(|err| RasterError::Fetch(err.to_string()))?;
        if body.len() > MAX_IMAGE_BYTES {
            return Err(RasterError::TooLarge);
        }
        Ok(body)
    }
}

/// Image source with a per-URL cache in front.
pub struct ImageLoader {
    source: Box<dyn ImageSource>,
    cache: ImageCache,
}

impl ImageLoader {
    pub fn new(source: Box<dyn ImageSource>) -> Self {
        Self {
            source,
            cache: ImageCache::new(CACHE_CAPACITY),
        }
    }

    /// Load bytes for `url`, hitting the network at most once per URL.
    pub fn load(&self, url: &str) -> CachedImage {
        if let Some(entry) = self.cache.get(url) {
            return entry;
        }
        let _scope = crate::perf::scope("image.load");
        let entry: CachedImage = self.source.fetch(url).map(Arc::from);
        match &entry {
            Ok(bytes) => tracing::debug!(url, bytes = bytes.len(), "image loaded"),
            Err(err) => tracing::debug!(url, error = %err, "image load failed"),
        }
        self.cache.insert(url.to_string(), entry.clone());
        entry
    }

    pub const fn cache(&self) -> &ImageCache {
        &self.cache
    }
}
