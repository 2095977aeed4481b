//! # Query Cache
//!
//! Keyed memoization for asynchronous queries. Each cache maps a canonical
//! [`QueryKey`] to an [`Entry`] holding the last successful value with its fetch
//! time, an optional in-flight fetch, and a generation counter.
//!
//! ## Rules
//!
//! - A value younger than the cache's staleness window is returned as is.
//! - Otherwise, if a fetch for the key is already in flight, the caller joins it
//!   (coalescing); only one fetch per key ever runs at a time.
//! - Otherwise a new fetch starts. On success the value is stored with a fresh
//!   timestamp; failures are handed to every joined caller and never stored.
//! - [`QueryCache::invalidate`] bumps the key's generation. A fetch that started
//!   under an older generation still answers its callers, but its result is
//!   dropped on arrival instead of being written back.
//!
//! The decision of what to do for a key is the pure function [`plan`], so the
//! rules can be tested without running any future.
//!
//! [`LatestResponse`] covers the consumer side: when a view issues requests for
//! successive parameter sets, only the newest one may update what it shows.

use crate::commands::{CampaignQuery, LeadQuery};
use crate::error::QueryError;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// A fetch shared by every caller coalesced onto the same key.
pub type SharedFetch<T> = Shared<BoxFuture<'static, Result<T, QueryError>>>;

/// Canonical cache key: the query name plus its full parameter tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Leads(LeadQuery),
    LeadsPage(LeadQuery, usize),
    Lead(String),
    Campaigns(CampaignQuery),
    Campaign(String),
    LeadStats,
    CampaignStats,
    DashboardStats,
}

impl QueryKey {
    pub fn name(&self) -> &'static str {
        match self {
            QueryKey::Leads(_) => "leads",
            QueryKey::LeadsPage(..) => "leads-infinite",
            QueryKey::Lead(_) => "lead",
            QueryKey::Campaigns(_) => "campaigns",
            QueryKey::Campaign(_) => "campaign",
            QueryKey::LeadStats => "lead-stats",
            QueryKey::CampaignStats => "campaign-stats",
            QueryKey::DashboardStats => "dashboard-stats",
        }
    }

    fn params(&self) -> Vec<String> {
        match self {
            QueryKey::Leads(q) => vec![q.search_term.clone(), q.status.to_string()],
            QueryKey::LeadsPage(q, page) => vec![
                q.search_term.clone(),
                q.status.to_string(),
                page.to_string(),
            ],
            QueryKey::Lead(id) | QueryKey::Campaign(id) => vec![id.clone()],
            QueryKey::Campaigns(q) => vec![
                q.status.to_string(),
                q.sort_field.to_string(),
                q.direction.to_string(),
            ],
            QueryKey::LeadStats | QueryKey::CampaignStats | QueryKey::DashboardStats => Vec::new(),
        }
    }
}

impl fmt::Display for QueryKey {
    /// `["leads","acme","pending"]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec![self.name().to_string()];
        parts.extend(self.params());
        let quoted: Vec<String> = parts.iter().map(|p| format!("{:?}", p)).collect();
        write!(f, "[{}]", quoted.join(","))
    }
}

struct Cached<T> {
    value: T,
    fetched_at: Instant,
}

/// Per-key cache state.
pub struct Entry<T> {
    cached: Option<Cached<T>>,
    in_flight: Option<SharedFetch<T>>,
    generation: u64,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            cached: None,
            in_flight: None,
            generation: 0,
        }
    }
}

impl<T> Entry<T> {
    pub fn is_fresh(&self, now: Instant, stale_time: Duration) -> bool {
        self.cached
            .as_ref()
            .is_some_and(|c| now.saturating_duration_since(c.fetched_at) < stale_time)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}

/// What a lookup should do for one key.
pub enum Plan<T> {
    /// Fresh value; no fetch.
    Hit(T),
    /// Join the fetch already running for this key.
    Join(SharedFetch<T>),
    /// Nothing usable; start a fetch.
    Fetch,
}

pub fn plan<T: Clone>(entry: Option<&Entry<T>>, now: Instant, stale_time: Duration) -> Plan<T> {
    let Some(entry) = entry else {
        return Plan::Fetch;
    };
    if entry.is_fresh(now, stale_time) {
        if let Some(cached) = &entry.cached {
            return Plan::Hit(cached.value.clone());
        }
    }
    match &entry.in_flight {
        Some(fetch) => Plan::Join(fetch.clone()),
        None => Plan::Fetch,
    }
}

type EntryMap<T> = Arc<Mutex<HashMap<QueryKey, Entry<T>>>>;

/// Cache for one query operation.
pub struct QueryCache<T> {
    name: &'static str,
    stale_time: Duration,
    entries: EntryMap<T>,
    fetches: Arc<AtomicUsize>,
}

impl<T> QueryCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, stale_time: Duration) -> Self {
        Self {
            name,
            stale_time,
            entries: Arc::new(Mutex::new(HashMap::new())),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of fetches started since creation.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Resolve `key`, running `fetcher` only when no fresh value and no
    /// in-flight fetch exist for it.
    pub async fn get_or_fetch<F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T, QueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
    {
        let fetch = {
            let mut entries = lock(&self.entries);
            match plan(entries.get(&key), Instant::now(), self.stale_time) {
                Plan::Hit(value) => {
                    trace!(cache = self.name, %key, "cache hit");
                    return Ok(value);
                }
                Plan::Join(fetch) => {
                    debug!(cache = self.name, %key, "joining in-flight fetch");
                    fetch
                }
                Plan::Fetch => {
                    debug!(cache = self.name, %key, "cache miss, fetching");
                    let entry = entries.entry(key.clone()).or_default();
                    let fetch = settle(
                        Arc::clone(&self.entries),
                        key,
                        entry.generation,
                        fetcher(),
                    )
                    .boxed()
                    .shared();
                    entry.in_flight = Some(fetch.clone());
                    self.fetches.fetch_add(1, Ordering::SeqCst);
                    fetch
                }
            }
        };
        fetch.await
    }

    /// Last stored value for `key`, fresh or not.
    #[cfg(test)]
    fn cached(&self, key: &QueryKey) -> Option<T> {
        lock(&self.entries)
            .get(key)
            .and_then(|entry| entry.cached.as_ref().map(|c| c.value.clone()))
    }

    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        lock(&self.entries)
            .get(key)
            .is_some_and(|entry| entry.is_fresh(Instant::now(), self.stale_time))
    }

    pub fn is_in_flight(&self, key: &QueryKey) -> bool {
        lock(&self.entries)
            .get(key)
            .is_some_and(Entry::is_in_flight)
    }

    /// Forget the value for `key` and orphan any fetch in flight for it.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = lock(&self.entries).get_mut(key) {
            debug!(cache = self.name, %key, "invalidated");
            reset(entry);
        }
    }

    pub fn clear(&self) {
        lock(&self.entries).values_mut().for_each(reset);
    }
}

fn reset<T>(entry: &mut Entry<T>) {
    entry.generation += 1;
    entry.cached = None;
    entry.in_flight = None;
}

fn lock<T>(entries: &Mutex<HashMap<QueryKey, Entry<T>>>) -> MutexGuard<'_, HashMap<QueryKey, Entry<T>>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run the fetch, then write its outcome back if the key has not been
/// invalidated in the meantime.
async fn settle<T, Fut>(
    entries: EntryMap<T>,
    key: QueryKey,
    generation: u64,
    fetch: Fut,
) -> Result<T, QueryError>
where
    T: Clone,
    Fut: Future<Output = Result<T, QueryError>>,
{
    let result = fetch.await;

    let mut entries = lock(&entries);
    match entries.get_mut(&key) {
        Some(entry) if entry.generation == generation => {
            entry.in_flight = None;
            match &result {
                Ok(value) => {
                    entry.cached = Some(Cached {
                        value: value.clone(),
                        fetched_at: Instant::now(),
                    });
                }
                Err(err) => debug!(%key, error = %err, "fetch failed, not cached"),
            }
        }
        _ => warn!(%key, "discarding response for invalidated key"),
    }

    result
}

/// Proof that a request was issued; redeemed by [`LatestResponse::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// What became of a response handed to [`LatestResponse::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<T> {
    /// The ticket was the newest; the view shows this value.
    Accepted(T),
    /// A newer ticket was issued (or the view was cancelled) first.
    Superseded(T),
}

impl<T> Resolved<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Resolved::Accepted(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Resolved::Accepted(value) | Resolved::Superseded(value) => value,
        }
    }
}

/// Keeps a consumer's view in step with its newest request.
///
/// Every request takes a ticket. A response is accepted only if its ticket is
/// still the newest one issued, so a slow response for superseded parameters
/// cannot overwrite a newer one.
#[derive(Debug, Default)]
pub struct LatestResponse {
    issued: Mutex<u64>,
}

impl LatestResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        let mut issued = self.issued.lock().unwrap_or_else(PoisonError::into_inner);
        *issued += 1;
        Ticket(*issued)
    }

    /// Accept `value` if `ticket` is the newest.
    pub fn resolve<T>(&self, ticket: Ticket, value: T) -> Resolved<T> {
        let issued = *self.issued.lock().unwrap_or_else(PoisonError::into_inner);
        if ticket.0 != issued {
            warn!(
                ticket = ticket.0,
                newest = issued,
                "discarding out-of-order response"
            );
            return Resolved::Superseded(value);
        }
        Resolved::Accepted(value)
    }

    /// Invalidate every outstanding ticket, e.g. when the view's parameters change.
    pub fn cancel(&self) {
        let mut issued = self.issued.lock().unwrap_or_else(PoisonError::into_inner);
        *issued += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CampaignSortField, LeadStatus, SortDirection, StatusFilter};

    const STALE: Duration = Duration::from_secs(300);

    fn key(term: &str) -> QueryKey {
        QueryKey::Leads(LeadQuery::new(term, StatusFilter::All))
    }

    #[test]
    fn key_display_is_canonical_tuple() {
        let k = QueryKey::Leads(LeadQuery::new("acme", StatusFilter::Only(LeadStatus::Pending)));
        assert_eq!(k.to_string(), r#"["leads","acme","pending"]"#);

        let k = QueryKey::Campaigns(CampaignQuery::new(
            StatusFilter::All,
            CampaignSortField::ResponseRate,
            SortDirection::Desc,
        ));
        assert_eq!(k.to_string(), r#"["campaigns","all","responseRate","desc"]"#);
        assert_eq!(QueryKey::LeadStats.to_string(), r#"["lead-stats"]"#);
    }

    #[test]
    fn identical_parameters_give_equal_keys() {
        assert_eq!(key("x"), key("x"));
        assert_ne!(key("x"), key("X"));
        assert_ne!(
            QueryKey::LeadsPage(LeadQuery::default(), 0),
            QueryKey::LeadsPage(LeadQuery::default(), 1)
        );
    }

    #[test]
    fn plan_without_entry_fetches() {
        assert!(matches!(
            plan::<u32>(None, Instant::now(), STALE),
            Plan::Fetch
        ));
    }

    #[test]
    fn plan_respects_staleness_window() {
        let fetched_at = Instant::now();
        let entry = Entry {
            cached: Some(Cached {
                value: 7u32,
                fetched_at,
            }),
            in_flight: None,
            generation: 0,
        };

        let just_before = fetched_at + STALE - Duration::from_millis(1);
        assert!(matches!(plan(Some(&entry), just_before, STALE), Plan::Hit(7)));
        assert!(matches!(
            plan(Some(&entry), fetched_at + STALE, STALE),
            Plan::Fetch
        ));
    }

    #[test]
    fn plan_joins_in_flight_fetch() {
        let fetch: SharedFetch<u32> = async { Ok::<u32, QueryError>(1) }.boxed().shared();
        let entry = Entry {
            cached: None,
            in_flight: Some(fetch),
            generation: 0,
        };
        assert!(matches!(
            plan(Some(&entry), Instant::now(), STALE),
            Plan::Join(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_calls_within_window_fetch_once() {
        let cache = QueryCache::new("test", STALE);
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            let value = cache
                .get_or_fetch(key("a"), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42u32)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.fetch_count(), 1);
        assert!(cache.is_fresh(&key("a")));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_value_is_refetched() {
        let cache = QueryCache::new("test", STALE);
        let first = cache.get_or_fetch(key("a"), || async { Ok(1u32) }).await;
        assert_eq!(first, Ok(1));

        tokio::time::advance(STALE + Duration::from_secs(1)).await;
        assert!(!cache.is_fresh(&key("a")));
        assert_eq!(cache.cached(&key("a")), Some(1));

        let second = cache.get_or_fetch(key("a"), || async { Ok(2u32) }).await;
        assert_eq!(second, Ok(2));
        assert_eq!(cache.fetch_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_coalesce() {
        let cache = QueryCache::new("test", STALE);
        let slow = || async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok(5u32)
        };

        let (a, b, c) = tokio::join!(
            cache.get_or_fetch(key("a"), slow),
            cache.get_or_fetch(key("a"), slow),
            cache.get_or_fetch(key("a"), slow),
        );
        assert_eq!((a, b, c), (Ok(5), Ok(5), Ok(5)));
        assert_eq!(cache.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn distinct_keys_do_not_coalesce() {
        let cache = QueryCache::new("test", STALE);
        let (a, b) = tokio::join!(
            cache.get_or_fetch(key("a"), || async { Ok(1u32) }),
            cache.get_or_fetch(key("b"), || async { Ok(2u32) }),
        );
        assert_eq!((a, b), (Ok(1), Ok(2)));
        assert_eq!(cache.fetch_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_reach_every_caller_and_are_not_cached() {
        let cache = QueryCache::<u32>::new("test", STALE);
        let failing = || async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err(QueryError::SourceUnavailable("down".into()))
        };

        let (a, b) = tokio::join!(
            cache.get_or_fetch(key("a"), failing),
            cache.get_or_fetch(key("a"), failing),
        );
        assert!(a.is_err() && b.is_err());
        assert_eq!(cache.fetch_count(), 1);
        assert!(!cache.is_in_flight(&key("a")));
        assert_eq!(cache.cached(&key("a")), None);

        let retry = cache.get_or_fetch(key("a"), || async { Ok(3u32) }).await;
        assert_eq!(retry, Ok(3));
        assert_eq!(cache.fetch_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidated_in_flight_result_is_not_written_back() {
        let cache = Arc::new(QueryCache::new("test", STALE));

        let pending = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                cache
                    .get_or_fetch(key("a"), || async {
                        tokio::time::sleep(Duration::from_millis(300)).await;
                        Ok(1u32)
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(cache.is_in_flight(&key("a")));

        cache.invalidate(&key("a"));
        assert!(!cache.is_in_flight(&key("a")));

        // The orphaned caller still gets its answer.
        assert_eq!(pending.await.unwrap(), Ok(1));
        assert_eq!(cache.cached(&key("a")), None);

        let fresh = cache.get_or_fetch(key("a"), || async { Ok(2u32) }).await;
        assert_eq!(fresh, Ok(2));
        assert_eq!(cache.cached(&key("a")), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn clear_drops_everything() {
        let cache = QueryCache::new("test", STALE);
        cache.get_or_fetch(key("a"), || async { Ok(1u32) }).await.unwrap();
        cache.get_or_fetch(key("b"), || async { Ok(2u32) }).await.unwrap();

        cache.clear();
        assert_eq!(cache.cached(&key("a")), None);
        assert_eq!(cache.cached(&key("b")), None);
    }

    #[test]
    fn latest_response_applies_only_newest_ticket() {
        let latest = LatestResponse::new();
        let older = latest.issue();
        let newer = latest.issue();

        // The newer request completes first...
        assert_eq!(latest.resolve(newer, "filtered"), Resolved::Accepted("filtered"));
        // ...and the slow, older one arrives afterwards.
        assert_eq!(
            latest.resolve(older, "unfiltered"),
            Resolved::Superseded("unfiltered")
        );
    }

    #[test]
    fn cancel_discards_outstanding_ticket() {
        let latest = LatestResponse::new();
        let ticket = latest.issue();
        latest.cancel();
        let resolved = latest.resolve(ticket, 1);
        assert!(!resolved.is_accepted());
        assert_eq!(resolved.into_inner(), 1);
    }
}
