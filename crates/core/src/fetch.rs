//! Best-effort retrieval of remote assets such as logos and preview images.

use std::cell::RefCell;
use std::collections::HashMap;

/// Something that can fetch the bytes behind a URL.
///
/// Fetching is best-effort: any failure (network, status, decoding) is
/// reported as `None` and never surfaces as an error.
pub trait AssetFetcher {
    fn fetch(&self, url: &str) -> Option<Vec<u8>>;
}

impl<F: AssetFetcher + ?Sized> AssetFetcher for &F {
    fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        (**self).fetch(url)
    }
}

/// Fetcher that never returns anything. Used where network access is
/// unavailable or unwanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFetch;

impl AssetFetcher for NoFetch {
    fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        log::debug!("skipping fetch of {}", url);
        None
    }
}

/// Fetcher serving canned responses, recording every URL requested.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` for `url`.
    pub fn with_response(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.responses.insert(url.into(), bytes);
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl AssetFetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        self.requests.borrow_mut().push(url.to_string());
        self.responses.get(url).cloned()
    }
}
