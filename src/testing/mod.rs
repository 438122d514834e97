use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::ClientError;
use crate::lookup::{LookupOption, LookupSource, OptionId};

/// Canned options keyed by (field, parent); unknown pairs yield an empty list
#[derive(Debug, Default)]
pub struct StaticLookupSource {
    options: HashMap<(String, String), Vec<LookupOption>>,
    calls: AtomicUsize,
}

impl StaticLookupSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, parent: &str, options: Vec<LookupOption>) -> Self {
        self.options.insert((field.to_string(), parent.to_string()), options);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LookupSource for StaticLookupSource {
    async fn fetch(&self, field: &str, parent: &OptionId) -> Result<Vec<LookupOption>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .options
            .get(&(field.to_string(), parent.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
