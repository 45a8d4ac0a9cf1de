use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use futures_util::{
    FutureExt,
    future::{self, BoxFuture, Shared, join_all},
};
use stitch_types::{LookupConfig, LookupResult, LookupStrategyKind};
use tracing::{debug, info, warn};

use super::{
    LookupSettings, LookupTransport,
    cache::{BeginOutcome, FieldCache, LookupSnapshot},
    dispatch::DispatchQueue,
    fingerprint::config_fingerprint,
    strategy::{OPTIONS_EXHAUSTED_MESSAGE, resolve_lookup},
};

pub const LOOKUP_CANCELLED_MESSAGE: &str = "Lookup cancelled";

/// Result of a triggered lookup. The work continues if this is dropped.
pub type LookupFuture = BoxFuture<'static, LookupResult>;

type SharedResolution = Shared<BoxFuture<'static, LookupResult>>;

/// Coordinates lookup resolutions for a form.
///
/// ## Responsibilities
///
/// - **Caching:** results are kept per field path together with the
///   fingerprint of the configuration that produced them. Re-triggering a
///   resolved field with an unchanged configuration makes no request.
/// - **Deduplication:** triggers for a field that is already pending join the
///   pending resolution, and fields with identical configurations share one
///   in-flight resolution.
/// - **Admission:** network-backed resolutions go through a [`DispatchQueue`]
///   (three slots, 500 ms apart by default).
/// - **Staleness:** each dispatch is sequence-tagged; a response for a
///   superseded configuration never overwrites the newer result.
///
/// Cloning is cheap and clones share all state.
#[derive(Clone)]
pub struct LookupOrchestrator {
    inner: Arc<OrchestratorInner>,
}

struct OrchestratorInner {
    transport: Arc<dyn LookupTransport>,
    settings: LookupSettings,
    queue: DispatchQueue,
    cache: FieldCache,
    /// In-flight resolutions by fingerprint, tagged so a finished run only
    /// removes its own entry.
    in_flight: Mutex<HashMap<String, (u64, SharedResolution)>>,
    next_resolution: AtomicU64,
}

impl fmt::Debug for LookupOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupOrchestrator")
            .field("settings", &self.inner.settings)
            .field("in_flight", &self.inner.queue.in_flight())
            .finish()
    }
}

impl LookupOrchestrator {
    pub fn new(transport: Arc<dyn LookupTransport>, settings: LookupSettings) -> Self {
        let queue = DispatchQueue::new(settings.max_concurrent, settings.dispatch_spacing());
        Self {
            inner: Arc::new(OrchestratorInner {
                transport,
                settings,
                queue,
                cache: FieldCache::default(),
                in_flight: Mutex::new(HashMap::new()),
                next_resolution: AtomicU64::new(0),
            }),
        }
    }

    /// Start resolving `field_path` unless its current result is still valid.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn trigger(&self, field_path: impl Into<String>, config: LookupConfig) -> LookupFuture {
        self.start(field_path.into(), config, false)
    }

    /// Trigger and wait for the result.
    pub async fn resolve(&self, field_path: impl Into<String>, config: LookupConfig) -> LookupResult {
        self.trigger(field_path, config).await
    }

    /// Resolve again even if a result is cached, superseding any pending one.
    ///
    /// Always issues a new resolution; the previous result stays visible in
    /// [`LookupOrchestrator::result`] until it completes.
    pub async fn refresh(&self, field_path: impl Into<String>, config: LookupConfig) -> LookupResult {
        self.start(field_path.into(), config, true).await
    }

    /// Trigger every field and wait for all of them.
    pub async fn resolve_all<I, P>(&self, fields: I) -> LookupSnapshot
    where
        I: IntoIterator<Item = (P, LookupConfig)>,
        P: Into<String>,
    {
        let pending: Vec<LookupFuture> = fields
            .into_iter()
            .map(|(field_path, config)| self.trigger(field_path, config))
            .collect();
        info!(field_count = pending.len(), "resolving lookup fields");
        join_all(pending).await;
        self.snapshot()
    }

    /// Latest resolved result for a field, if any.
    pub fn result(&self, field_path: &str) -> Option<LookupResult> {
        self.inner.cache.result(field_path)
    }

    pub fn snapshot(&self) -> LookupSnapshot {
        self.inner.cache.snapshot()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.cache.is_loading()
    }

    /// Forget a field; a pending resolution for it will be discarded.
    pub fn invalidate(&self, field_path: &str) -> bool {
        self.inner.cache.remove(field_path)
    }

    /// Forget every field, e.g. when the form is torn down.
    pub fn clear(&self) {
        self.inner.cache.clear();
    }

    /// Stop admitting new network resolutions; queued ones resolve to
    /// [`LOOKUP_CANCELLED_MESSAGE`].
    pub fn shutdown(&self) {
        self.inner.queue.close();
    }

    pub fn in_flight(&self) -> usize {
        self.inner.queue.in_flight()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.inner.queue.peak_in_flight()
    }

    fn start(&self, field_path: String, config: LookupConfig, force: bool) -> LookupFuture {
        let fingerprint = config_fingerprint(&config);
        match self.inner.cache.begin(&field_path, &fingerprint, force) {
            BeginOutcome::Hit(result) => {
                debug!(field_path = %field_path, fingerprint = %fingerprint, "lookup cache hit");
                future::ready(result).boxed()
            }
            BeginOutcome::Joined => {
                debug!(field_path = %field_path, fingerprint = %fingerprint, "lookup already pending");
                self.inner.shared_resolution(fingerprint, config, false).boxed()
            }
            BeginOutcome::Dispatch(sequence) => {
                debug!(field_path = %field_path, fingerprint = %fingerprint, sequence, "lookup cache miss");
                let resolution = self.inner.shared_resolution(fingerprint, config, force);
                let inner = Arc::clone(&self.inner);
                let task = tokio::spawn(async move {
                    let result = resolution.await;
                    if !inner.cache.complete(&field_path, sequence, result.clone()) {
                        debug!(field_path = %field_path, sequence, "discarding stale lookup result");
                    }
                    result
                });
                async move {
                    task.await.unwrap_or_else(|error| {
                        warn!(error = %error, "lookup task failed");
                        LookupResult::Error(OPTIONS_EXHAUSTED_MESSAGE.to_string())
                    })
                }
                .boxed()
            }
        }
    }
}

impl OrchestratorInner {
    /// Return the in-flight resolution for `fingerprint`, starting one if needed.
    ///
    /// `fresh` always starts a new resolution and makes it the one later
    /// triggers join.
    fn shared_resolution(self: &Arc<Self>, fingerprint: String, config: LookupConfig, fresh: bool) -> SharedResolution {
        let mut in_flight = self.in_flight.lock().expect("in-flight lock");
        if !fresh && let Some((_, existing)) = in_flight.get(&fingerprint) {
            return existing.clone();
        }

        let id = self.next_resolution.fetch_add(1, Ordering::SeqCst);
        let inner = Arc::clone(self);
        let key = fingerprint.clone();
        let resolution = async move {
            let result = inner.run_resolution(&config).await;
            let mut in_flight = inner.in_flight.lock().expect("in-flight lock");
            if in_flight.get(&key).is_some_and(|(current, _)| *current == id) {
                in_flight.remove(&key);
            }
            drop(in_flight);
            result
        }
        .boxed()
        .shared();
        in_flight.insert(fingerprint, (id, resolution.clone()));
        drop(in_flight);

        tokio::spawn(resolution.clone());
        resolution
    }

    async fn run_resolution(&self, config: &LookupConfig) -> LookupResult {
        let needs_network = matches!(config.strategy_kind(), LookupStrategyKind::Factory | LookupStrategyKind::Entity);
        if !needs_network {
            return resolve_lookup(self.transport.as_ref(), config, &self.settings).await;
        }

        let Some(_permit) = self.queue.acquire().await else {
            return LookupResult::Error(LOOKUP_CANCELLED_MESSAGE.to_string());
        };
        let result = resolve_lookup(self.transport.as_ref(), config, &self.settings).await;
        match &result {
            LookupResult::Options(options) => {
                debug!(endpoint = %config.endpoint, option_count = options.len(), "lookup resolved")
            }
            LookupResult::Error(message) => warn!(endpoint = %config.endpoint, error = %message, "lookup failed"),
        }
        result
    }
}
