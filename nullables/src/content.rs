//! Nullable content store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use veritag_store::{ContentStore, Lookup, SourceError};
use veritag_types::ContentHash;

use crate::Fault;

/// An in-memory content store whose availability and latency are controllable.
pub struct NullContentStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    fault: Fault,
}

impl NullContentStore {
    pub fn new() -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
            fault: Fault::new(),
        }
    }

    /// Store a blob under its own address.
    pub fn insert(&self, blob: Vec<u8>) -> ContentHash {
        let hash = ContentHash::of(&blob);
        self.insert_at(hash.clone(), blob);
        hash
    }

    /// Store a blob under an arbitrary address, e.g. to simulate tampering.
    pub fn insert_at(&self, hash: ContentHash, blob: Vec<u8>) {
        self.blobs
            .lock()
            .unwrap()
            .insert(hash.as_str().to_ascii_lowercase(), blob);
    }

    pub fn clear(&self) {
        self.blobs.lock().unwrap().clear();
    }

    pub fn set_available(&self, available: bool) {
        self.fault.set_available(available);
    }

    pub fn set_latency(&self, latency: Duration) {
        self.fault.set_latency(latency);
    }

    /// Number of calls made against this store.
    pub fn calls(&self) -> u64 {
        self.fault.calls()
    }
}

impl Default for NullContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for NullContentStore {
    async fn put(&self, blob: Vec<u8>) -> Result<ContentHash, SourceError> {
        self.fault.enter("content store").await?;
        Ok(self.insert(blob))
    }

    async fn get(&self, hash: &ContentHash) -> Result<Lookup<Vec<u8>>, SourceError> {
        self.fault.enter("content store").await?;
        Ok(Lookup::from_option(
            self.blobs
                .lock()
                .unwrap()
                .get(&hash.as_str().to_ascii_lowercase())
                .cloned(),
        ))
    }
}
