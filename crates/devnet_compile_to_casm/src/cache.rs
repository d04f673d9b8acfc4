use std::future::Future;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use devnet_compile_to_casm_types::{BackendId, ClassFingerprint, CompileError, CompileResult};
use tokio::sync::watch;
use tracing::debug;

use crate::metrics::record_cache_lookup;

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;

type ArtifactKey = (ClassFingerprint, BackendId);
type PendingResult = watch::Receiver<Option<CompileResult>>;

#[derive(Debug)]
enum CacheEntry {
    Stored(CompileResult),
    InFlight(PendingResult),
}

/// Memoizes compilation results, successes and deterministic failures alike, per Sierra
/// fingerprint and backend. Entries are never evicted.
///
/// Each key has at most one computation in flight: concurrent callers of the same key wait for it
/// and all receive its result. A transient failure (see [`CompileError::is_transient`]) is handed
/// to the callers waiting on it but not stored, so the next call computes again.
#[derive(Debug, Default)]
pub struct ArtifactCache {
    entries: Arc<DashMap<ArtifactKey, CacheEntry>>,
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored result for the key, or runs `compute` to produce it.
    ///
    /// The computation runs in its own task: a caller that stops waiting does not abort it, and
    /// its result is still stored.
    pub async fn get_or_compile<F, Fut>(
        &self,
        fingerprint: ClassFingerprint,
        backend_id: &BackendId,
        compute: F,
    ) -> CompileResult
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = CompileResult> + Send + 'static,
    {
        let key = (fingerprint, backend_id.clone());
        let mut pending = match self.entries.entry(key.clone()) {
            Entry::Occupied(entry) => match entry.get() {
                CacheEntry::Stored(result) => {
                    record_cache_lookup(true);
                    debug!(%fingerprint, %backend_id, "Artifact cache hit.");
                    return result.clone();
                }
                CacheEntry::InFlight(pending) => pending.clone(),
            },
            Entry::Vacant(entry) => {
                let (sender, pending) = watch::channel(None);
                entry.insert(CacheEntry::InFlight(pending.clone()));
                tokio::spawn(run_computation(self.entries.clone(), key, compute, sender));
                pending
            }
        };
        record_cache_lookup(false);

        let result = match pending.wait_for(Option::is_some).await {
            Ok(result) => (*result).clone(),
            Err(_) => None,
        };
        result.unwrap_or_else(|| {
            Err(CompileError::UnexpectedError(
                "The compilation task ended without a result.".to_owned(),
            ))
        })
    }

    /// The stored result for the key, if any.
    pub fn get(
        &self,
        fingerprint: ClassFingerprint,
        backend_id: &BackendId,
    ) -> Option<CompileResult> {
        match self.entries.get(&(fingerprint, backend_id.clone()))?.value() {
            CacheEntry::Stored(result) => Some(result.clone()),
            CacheEntry::InFlight(_) => None,
        }
    }

    /// The number of stored results.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.value(), CacheEntry::Stored(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Stores the result (or clears the key on a transient failure) before publishing it, so a caller
// arriving after the waiters are woken either finds it stored or starts a new computation.
async fn run_computation<F, Fut>(
    entries: Arc<DashMap<ArtifactKey, CacheEntry>>,
    key: ArtifactKey,
    compute: F,
    sender: watch::Sender<Option<CompileResult>>,
) where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = CompileResult> + Send + 'static,
{
    // A panicking computation must still clear the in-flight entry.
    let result = match tokio::spawn(compute()).await {
        Ok(result) => result,
        Err(join_error) => Err(CompileError::UnexpectedError(format!(
            "The compilation task failed: {join_error}"
        ))),
    };

    match &result {
        Err(error) if error.is_transient() => {
            debug!(
                fingerprint = %key.0,
                backend_id = %key.1,
                "Not caching a transient failure: {error}"
            );
            entries.remove(&key);
        }
        _ => {
            entries.insert(key, CacheEntry::Stored(result.clone()));
        }
    }
    sender.send_replace(Some(result));
}
