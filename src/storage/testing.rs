//! In-memory connector for engine tests.
//!
//! Records every connect and delete call, and can be told to fail the
//! connect or a specific delete.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use super::{ObjectStoreConnector, ObjectStoreError, ObjectStoreResult, ObjectStoreSession};
use crate::config::ObjectStoreConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect,
    Delete { bucket: String, key: String },
}

#[derive(Debug, Clone, Copy)]
pub enum Failure {
    /// Object already gone.
    NotFound,
    PermissionDenied,
    MissingBucket,
    Network,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    fail_connect: bool,
    /// Keyed by 1-based delete call number.
    delete_failures: HashMap<usize, Failure>,
    deletes_seen: usize,
    deleted: Vec<(String, String)>,
}

#[derive(Clone, Default)]
pub struct RecordingConnector {
    state: Arc<Mutex<State>>,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_connect() -> Self {
        let connector = Self::new();
        connector.state.lock().unwrap().fail_connect = true;
        connector
    }

    /// Make the `n`th delete call (1-based, across all sessions) fail.
    pub fn fail_delete(self, n: usize, failure: Failure) -> Self {
        self.state.lock().unwrap().delete_failures.insert(n, failure);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn connect_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Connect))
            .count()
    }

    /// `(bucket, key)` pairs whose delete succeeded.
    pub fn deleted(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().deleted.clone()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted().into_iter().map(|(_, key)| key).collect()
    }
}

#[async_trait]
impl ObjectStoreConnector for RecordingConnector {
    async fn connect(
        &self,
        _config: &ObjectStoreConfig,
    ) -> ObjectStoreResult<Box<dyn ObjectStoreSession>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Connect);
        if state.fail_connect {
            return Err(ObjectStoreError::Connect {
                backend: "recording",
                message: "invalid credentials".to_string(),
            });
        }
        Ok(Box::new(RecordingSession {
            state: Arc::clone(&self.state),
        }))
    }
}

struct RecordingSession {
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl ObjectStoreSession for RecordingSession {
    async fn delete(&self, bucket: &str, key: &str) -> ObjectStoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        state.deletes_seen += 1;

        match state.delete_failures.get(&state.deletes_seen).copied() {
            None => {
                state.deleted.push((bucket.to_string(), key.to_string()));
                Ok(())
            }
            Some(Failure::NotFound) => Err(ObjectStoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            Some(Failure::PermissionDenied) => Err(ObjectStoreError::PermissionDenied {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "AccessDenied".to_string(),
            }),
            Some(Failure::MissingBucket) => Err(ObjectStoreError::BucketNotFound {
                bucket: bucket.to_string(),
            }),
            Some(Failure::Network) => Err(ObjectStoreError::S3("connection reset".to_string())),
        }
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}
