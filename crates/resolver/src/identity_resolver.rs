//! IdentityResolutionPipeline - cache → remote name resolution with request coalescing

use crate::cache::ResultCache;
use crate::error::ResolutionError;
use crate::types::{IdentityMapping, RemoteNameSource};
use chrono::{DateTime, Utc};
use shared::{Identity, ListingConfig, Logger};
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound for one remote call
    pub remote_timeout: Duration,
    /// Maximum identities per remote batch (None = all misses in one request)
    pub batch_size: Option<usize>,
    pub cache_capacity: Option<usize>,
    pub cache_ttl: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            remote_timeout: Duration::from_secs(5),
            batch_size: None,
            cache_capacity: None,
            cache_ttl: None,
        }
    }
}

impl From<&ListingConfig> for PipelineConfig {
    fn from(config: &ListingConfig) -> Self {
        Self {
            remote_timeout: config.remote_timeout(),
            batch_size: config.batch_size,
            cache_capacity: config.cache_capacity,
            cache_ttl: config.cache_ttl(),
        }
    }
}

/// What a caller asked to resolve
#[derive(Debug, Clone, PartialEq, Eq)]
enum LookupKey {
    Identity(Identity),
    Name(String),
}

impl LookupKey {
    fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match Identity::parse(trimmed) {
            Ok(identity) => LookupKey::Identity(identity),
            Err(_) => LookupKey::Name(trimmed.to_string()),
        })
    }

    /// Normalized key used for the cache and the in-flight table
    fn cache_key(&self) -> String {
        match self {
            LookupKey::Identity(identity) => identity.to_string(),
            LookupKey::Name(name) => name.to_lowercase(),
        }
    }
}

#[derive(Debug, Clone)]
enum FlightFailure {
    NotFound,
    Remote(String),
    TimedOut,
}

impl FlightFailure {
    fn describe(&self) -> String {
        match self {
            FlightFailure::NotFound => "not found".to_string(),
            FlightFailure::Remote(reason) => format!("remote error: {}", reason),
            FlightFailure::TimedOut => "remote timeout".to_string(),
        }
    }
}

type FlightOutcome = Result<IdentityMapping, FlightFailure>;
type FlightReceiver = watch::Receiver<Option<FlightOutcome>>;

/// Statistics about the pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub cached_entries: usize,
    pub in_flight: usize,
    pub cache_hits: u64,
    pub remote_requests: u64,
    /// Remote calls that errored or timed out
    pub remote_failures: u64,
    pub coalesced_waits: u64,
}

struct PipelineInner {
    cache: ResultCache,
    source: Arc<dyn RemoteNameSource>,
    /// normalized key -> pending result of the one request running for it
    flights: Mutex<HashMap<String, FlightReceiver>>,
    config: PipelineConfig,
    logger: Arc<dyn Logger>,
    cache_hits: AtomicU64,
    remote_requests: AtomicU64,
    remote_failures: AtomicU64,
    coalesced_waits: AtomicU64,
}

impl PipelineInner {
    fn flights(&self) -> MutexGuard<'_, HashMap<String, FlightReceiver>> {
        self.flights.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn store(&self, mapping: &IdentityMapping) {
        self.cache.put(&mapping.identity().to_string(), mapping.clone());
        if let Some(name) = mapping.name() {
            self.cache.put(&name.to_lowercase(), mapping.clone());
        }
    }

    fn stale_or_unresolved(&self, identity: Identity) -> IdentityMapping {
        self.cache
            .get(&identity.to_string())
            .unwrap_or_else(|| IdentityMapping::unresolved(identity, Utc::now()))
    }
}

/// Owner side of an in-flight request.
///
/// Dropping it removes the table entry and the cache pin; waiters that never
/// saw a published outcome observe a closed channel.
struct FlightHandle {
    inner: Arc<PipelineInner>,
    key: String,
    lookup: LookupKey,
    tx: watch::Sender<Option<FlightOutcome>>,
}

impl FlightHandle {
    fn complete(&self, outcome: FlightOutcome) {
        self.tx.send_replace(Some(outcome));
    }
}

impl Drop for FlightHandle {
    fn drop(&mut self) {
        self.inner.flights().remove(&self.key);
        self.inner.cache.unpin(&self.key);
    }
}

enum Attach {
    Cached(IdentityMapping),
    Joined(FlightReceiver),
    Started(FlightReceiver, FlightHandle),
}

/// Resolves identities to display names through a shared cache, coalescing
/// concurrent requests so each key has at most one remote request in flight.
#[derive(Clone)]
pub struct IdentityResolutionPipeline {
    inner: Arc<PipelineInner>,
}

impl IdentityResolutionPipeline {
    /// Create a new pipeline
    pub fn new(logger: Arc<dyn Logger>, source: Arc<dyn RemoteNameSource>, config: PipelineConfig) -> Self {
        let mut cache = ResultCache::new();
        if let Some(capacity) = config.cache_capacity {
            cache = cache.with_capacity(capacity);
        }
        if let Some(ttl) = config.cache_ttl {
            cache = cache.with_ttl(ttl);
        }

        Self {
            inner: Arc::new(PipelineInner {
                cache,
                source,
                flights: Mutex::new(HashMap::new()),
                config,
                logger,
                cache_hits: AtomicU64::new(0),
                remote_requests: AtomicU64::new(0),
                remote_failures: AtomicU64::new(0),
                coalesced_waits: AtomicU64::new(0),
            }),
        }
    }

    /// Resolve an identity literal or a display name.
    ///
    /// Resolution order:
    /// 1. Fresh cache entry
    /// 2. Remote source (joining an in-flight request for the same key)
    /// 3. Stale cache entry, then the identity literal itself, unresolved
    pub async fn resolve_one(&self, key: &str) -> Result<IdentityMapping, ResolutionError> {
        let lookup = LookupKey::parse(key).ok_or_else(|| ResolutionError::IdentityNotFound {
            key: key.to_string(),
        })?;
        let cache_key = lookup.cache_key();

        if let Some(hit) = self.inner.cache.get_fresh(&cache_key, Utc::now()) {
            self.inner.cache_hits.fetch_add(1, Ordering::Relaxed);
            self.inner.logger.debug(&format!("Cache hit for '{}'", cache_key), None);
            return Ok(hit);
        }

        let attached = {
            let mut flights = self.inner.flights();
            self.attach(&mut flights, &cache_key, &lookup)
        };

        let mut rx = match attached {
            Attach::Cached(hit) => return Ok(hit),
            Attach::Joined(rx) => {
                self.inner
                    .logger
                    .debug(&format!("Joining in-flight lookup for '{}'", cache_key), None);
                rx
            }
            Attach::Started(rx, handle) => {
                self.spawn_flights(vec![handle]);
                rx
            }
        };

        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(published) => published.clone(),
            Err(_) => None,
        };

        match outcome {
            Some(Ok(mapping)) => Ok(mapping),
            Some(Err(failure)) => self.fallback(key, &lookup, &cache_key, &failure),
            None => Err(ResolutionError::Interrupted),
        }
    }

    /// Resolve a set of identities, waiting at most `timeout`.
    ///
    /// On timeout the error carries a mapping for every requested identity,
    /// unresolved where no name arrived in time.
    pub async fn resolve_many<I>(&self, keys: I, timeout: Duration) -> Result<HashMap<Identity, IdentityMapping>, ResolutionError>
    where
        I: IntoIterator<Item = Identity>,
    {
        self.resolve_many_until(keys, timeout, std::future::pending::<()>()).await
    }

    /// Like [`resolve_many`](Self::resolve_many), but gives up with
    /// `Interrupted` as soon as `interrupt` completes.
    pub async fn resolve_many_until<I, F>(
        &self,
        keys: I,
        timeout: Duration,
        interrupt: F,
    ) -> Result<HashMap<Identity, IdentityMapping>, ResolutionError>
    where
        I: IntoIterator<Item = Identity>,
        F: Future<Output = ()>,
    {
        let deadline = Instant::now() + timeout;
        let requested: BTreeSet<Identity> = keys.into_iter().collect();
        let mut resolved = HashMap::with_capacity(requested.len());
        let now = Utc::now();

        let mut misses = Vec::new();
        for identity in requested {
            match self.inner.cache.get_fresh(&identity.to_string(), now) {
                Some(hit) => {
                    self.inner.cache_hits.fetch_add(1, Ordering::Relaxed);
                    resolved.insert(identity, hit);
                }
                None => misses.push(identity),
            }
        }

        if misses.is_empty() {
            return Ok(resolved);
        }

        let mut waiting: Vec<(Identity, FlightReceiver)> = Vec::with_capacity(misses.len());
        let mut started = Vec::new();
        {
            let mut flights = self.inner.flights();
            for identity in misses {
                let key = identity.to_string();
                match self.attach(&mut flights, &key, &LookupKey::Identity(identity)) {
                    Attach::Cached(hit) => {
                        resolved.insert(identity, hit);
                    }
                    Attach::Joined(rx) => waiting.push((identity, rx)),
                    Attach::Started(rx, handle) => {
                        waiting.push((identity, rx));
                        started.push(handle);
                    }
                }
            }
        }

        if !started.is_empty() {
            self.inner.logger.debug(
                &format!(
                    "Requesting {} names remotely, {} joined in-flight lookups",
                    started.len(),
                    waiting.len() - started.len()
                ),
                None,
            );
            self.spawn_flights(started);
        }

        let all_published = async {
            for (_, rx) in waiting.iter_mut() {
                // A closed channel is picked up when collecting below.
                let _ = rx.wait_for(Option::is_some).await;
            }
        };

        tokio::pin!(interrupt);
        let timed_out = tokio::select! {
            biased;
            _ = &mut interrupt => {
                self.inner.logger.warn("Batch name resolution interrupted", None);
                return Err(ResolutionError::Interrupted);
            }
            finished = tokio::time::timeout_at(deadline, all_published) => finished.is_err(),
        };

        let mut pending = 0;
        let mut abandoned = false;
        for (identity, rx) in &waiting {
            let published = rx.borrow().clone();
            let mapping = match published {
                Some(Ok(mapping)) => mapping,
                Some(Err(_)) => self.inner.stale_or_unresolved(*identity),
                None => {
                    if rx.has_changed().is_err() {
                        abandoned = true;
                    } else {
                        pending += 1;
                    }
                    self.inner.stale_or_unresolved(*identity)
                }
            };
            resolved.insert(*identity, mapping);
        }

        if abandoned {
            return Err(ResolutionError::Interrupted);
        }
        if timed_out && pending > 0 {
            self.inner.logger.warn(
                &format!("Name resolution timed out after {:?}, {} pending", timeout, pending),
                None,
            );
            return Err(ResolutionError::TimedOut {
                partial: resolved,
                pending,
            });
        }
        Ok(resolved)
    }

    /// Look at the cache without triggering a lookup
    pub fn cached(&self, key: &str) -> Option<IdentityMapping> {
        let lookup = LookupKey::parse(key)?;
        self.inner.cache.get(&lookup.cache_key())
    }

    /// Distinct resolved names currently cached, sorted case-insensitively
    pub fn known_names(&self) -> Vec<String> {
        let names: BTreeSet<String> = self
            .inner
            .cache
            .mappings()
            .iter()
            .filter_map(|mapping| mapping.name().map(str::to_string))
            .collect();
        let mut names: Vec<String> = names.into_iter().collect();
        names.sort_by_key(|name| name.to_lowercase());
        names
    }

    /// Get statistics about the pipeline
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            cached_entries: self.inner.cache.len(),
            in_flight: self.inner.flights().len(),
            cache_hits: self.inner.cache_hits.load(Ordering::Relaxed),
            remote_requests: self.inner.remote_requests.load(Ordering::Relaxed),
            remote_failures: self.inner.remote_failures.load(Ordering::Relaxed),
            coalesced_waits: self.inner.coalesced_waits.load(Ordering::Relaxed),
        }
    }

    /// Join the request running for `key`, or register a new one.
    /// Must be called with the flight table locked.
    fn attach(&self, flights: &mut HashMap<String, FlightReceiver>, key: &str, lookup: &LookupKey) -> Attach {
        if let Some(rx) = flights.get(key) {
            self.inner.coalesced_waits.fetch_add(1, Ordering::Relaxed);
            return Attach::Joined(rx.clone());
        }

        // A flight may have finished between the caller's cache check and now.
        if let Some(hit) = self.inner.cache.get_fresh(key, Utc::now()) {
            self.inner.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Attach::Cached(hit);
        }

        let (tx, rx) = watch::channel(None);
        flights.insert(key.to_string(), rx.clone());
        self.inner.cache.pin(key);

        Attach::Started(
            rx,
            FlightHandle {
                inner: Arc::clone(&self.inner),
                key: key.to_string(),
                lookup: lookup.clone(),
                tx,
            },
        )
    }

    /// Run new flights: names one by one, identities batched.
    fn spawn_flights(&self, handles: Vec<FlightHandle>) {
        let chunk = self.inner.config.batch_size.unwrap_or(usize::MAX).max(1);
        let mut batches: Vec<Vec<FlightHandle>> = Vec::new();

        for handle in handles {
            let name = match &handle.lookup {
                LookupKey::Name(name) => Some(name.clone()),
                LookupKey::Identity(_) => None,
            };
            match name {
                Some(name) => {
                    tokio::spawn(run_name_lookup(Arc::clone(&self.inner), handle, name));
                }
                None => match batches.last_mut() {
                    Some(batch) if batch.len() < chunk => batch.push(handle),
                    _ => batches.push(vec![handle]),
                },
            }
        }

        for batch in batches {
            tokio::spawn(run_identity_batch(Arc::clone(&self.inner), batch));
        }
    }

    fn fallback(
        &self,
        raw_key: &str,
        lookup: &LookupKey,
        cache_key: &str,
        failure: &FlightFailure,
    ) -> Result<IdentityMapping, ResolutionError> {
        if let Some(stale) = self.inner.cache.get(cache_key) {
            self.inner.logger.info(
                &format!("Using stale name for '{}' ({})", cache_key, failure.describe()),
                None,
            );
            return Ok(stale);
        }

        match lookup {
            LookupKey::Identity(identity) => {
                self.inner.logger.info(
                    &format!("Leaving '{}' unresolved ({})", identity, failure.describe()),
                    None,
                );
                Ok(IdentityMapping::unresolved(*identity, Utc::now()))
            }
            LookupKey::Name(_) => Err(ResolutionError::IdentityNotFound {
                key: raw_key.to_string(),
            }),
        }
    }
}

async fn run_identity_batch(inner: Arc<PipelineInner>, handles: Vec<FlightHandle>) {
    let identities: Vec<Identity> = handles
        .iter()
        .filter_map(|handle| match handle.lookup {
            LookupKey::Identity(identity) => Some(identity),
            LookupKey::Name(_) => None,
        })
        .collect();

    let issued_at = Utc::now();
    inner.remote_requests.fetch_add(1, Ordering::Relaxed);
    let result = tokio::time::timeout(inner.config.remote_timeout, inner.source.lookup_batch(&identities)).await;

    match result {
        Ok(Ok(names)) => {
            for handle in &handles {
                let LookupKey::Identity(identity) = handle.lookup else {
                    continue;
                };
                let outcome = match names.get(&identity) {
                    Some(name) => {
                        let mapping = IdentityMapping::resolved(identity, name.clone(), issued_at);
                        inner.store(&mapping);
                        Ok(mapping)
                    }
                    None => Err(FlightFailure::NotFound),
                };
                handle.complete(outcome);
            }
        }
        Ok(Err(err)) => {
            inner.remote_failures.fetch_add(1, Ordering::Relaxed);
            inner.logger.warn(
                &format!("Batch lookup of {} identities failed: {}", identities.len(), err),
                None,
            );
            for handle in &handles {
                handle.complete(Err(FlightFailure::Remote(err.to_string())));
            }
        }
        Err(_) => {
            inner.remote_failures.fetch_add(1, Ordering::Relaxed);
            inner.logger.warn(
                &format!(
                    "Batch lookup of {} identities timed out after {:?}",
                    identities.len(),
                    inner.config.remote_timeout
                ),
                None,
            );
            for handle in &handles {
                handle.complete(Err(FlightFailure::TimedOut));
            }
        }
    }
}

async fn run_name_lookup(inner: Arc<PipelineInner>, handle: FlightHandle, name: String) {
    let issued_at = Utc::now();
    inner.remote_requests.fetch_add(1, Ordering::Relaxed);
    let result = tokio::time::timeout(inner.config.remote_timeout, inner.source.lookup_by_name(&name)).await;

    let outcome = match result {
        Ok(Ok(Some(identity))) => Ok(canonical_mapping(&inner, &handle.key, identity, name, issued_at).await),
        Ok(Ok(None)) => Err(FlightFailure::NotFound),
        Ok(Err(err)) => {
            inner.remote_failures.fetch_add(1, Ordering::Relaxed);
            inner.logger.warn(&format!("Lookup of name '{}' failed: {}", name, err), None);
            Err(FlightFailure::Remote(err.to_string()))
        }
        Err(_) => {
            inner.remote_failures.fetch_add(1, Ordering::Relaxed);
            inner.logger.warn(&format!("Lookup of name '{}' timed out", name), None);
            Err(FlightFailure::TimedOut)
        }
    };
    handle.complete(outcome);
}

/// Mapping for an identity found by name, carrying the name the source
/// holds rather than the spelling the caller typed.
///
/// Only the canonical mapping is stored under the identity key. If the
/// canonical name cannot be fetched, the typed name is cached under the
/// name key alone.
async fn canonical_mapping(
    inner: &PipelineInner,
    name_key: &str,
    identity: Identity,
    typed: String,
    issued_at: DateTime<Utc>,
) -> IdentityMapping {
    if let Some(known) = inner
        .cache
        .get_fresh(&identity.to_string(), Utc::now())
        .filter(IdentityMapping::is_resolved)
    {
        inner.cache.put(name_key, known.clone());
        return known;
    }

    inner.remote_requests.fetch_add(1, Ordering::Relaxed);
    let canonical = tokio::time::timeout(inner.config.remote_timeout, inner.source.lookup_batch(&[identity])).await;
    match canonical {
        Ok(Ok(mut names)) => {
            if let Some(canonical) = names.remove(&identity) {
                let mapping = IdentityMapping::resolved(identity, canonical, issued_at);
                inner.store(&mapping);
                inner.cache.put(name_key, mapping.clone());
                return mapping;
            }
        }
        Ok(Err(err)) => {
            inner.remote_failures.fetch_add(1, Ordering::Relaxed);
            inner
                .logger
                .warn(&format!("Lookup of the name held for {} failed: {}", identity, err), None);
        }
        Err(_) => {
            inner.remote_failures.fetch_add(1, Ordering::Relaxed);
            inner
                .logger
                .warn(&format!("Lookup of the name held for {} timed out", identity), None);
        }
    }

    let mapping = IdentityMapping::resolved(identity, typed, issued_at);
    inner.cache.put(name_key, mapping.clone());
    mapping
}
