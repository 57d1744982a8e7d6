//! 测试用内存数据源。

use std::cell::RefCell;
use std::collections::HashMap;

use super::{FetchError, RemoteSource};

#[derive(Default)]
pub(crate) struct MemorySource {
    bodies: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl MemorySource {
    pub(crate) fn with(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl RemoteSource for MemorySource {
    fn get_body(&self, url: &str) -> Result<String, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Network(format!("connection refused: {url}")))
    }
}
