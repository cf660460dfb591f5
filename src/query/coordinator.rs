use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::ClientResult;

use super::entry::{QueryData, QueryEntry, QueryStatus};
use super::invalidation::{invalidated_names, MutationKind};
use super::key::QueryKey;

/// Loader factory for one query key: each invocation produces one network
/// request future. The coordinator keeps the last registered loader per key so
/// it can eagerly refetch after a mutation.
pub type Loader = Arc<dyn Fn() -> BoxFuture<'static, ClientResult<QueryData>> + Send + Sync>;

/// In-flight load shared between the issuing caller and any attachers.
/// Completion is signalled only; results are read back from the entry table.
type SharedLoad = Shared<BoxFuture<'static, ()>>;

struct State {
    entries: HashMap<QueryKey, QueryEntry>,
    loaders: HashMap<QueryKey, Loader>,
    inflight: HashMap<QueryKey, (u64, SharedLoad)>,
    watched: HashSet<QueryKey>,
}

/// Owns the query entry table and the staleness discipline around it. The UI
/// layer only ever holds entry clones; every state change funnels through
/// `fetch`, `invalidate` and `on_mutation_success`.
///
/// Locks are held only across synchronous transitions, never across awaits;
/// per-key issue tickets make response application "last request wins" by
/// issue order even when responses arrive out of order.
#[derive(Clone)]
pub struct QueryCoordinator {
    state: Arc<Mutex<State>>,
}

impl Default for QueryCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCoordinator {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                entries: HashMap::new(),
                loaders: HashMap::new(),
                inflight: HashMap::new(),
                watched: HashSet::new(),
            })),
        }
    }

    /// Serve `key` from cache when fresh, attach to an in-flight load when one
    /// exists, otherwise issue the loader. The returned snapshot carries the
    /// outcome: `Ready` with data, or `Error` with last-good data retained.
    pub async fn fetch(&self, key: &QueryKey, loader: Loader) -> QueryEntry {
        let wait: SharedLoad = {
            let mut st = self.state.lock();
            st.loaders.insert(key.clone(), loader.clone());
            let entry = st
                .entries
                .entry(key.clone())
                .or_insert_with(|| QueryEntry::idle(key.clone()));
            if entry.is_fresh() {
                debug!(key = %key, "cache hit");
                return entry.clone();
            }
            match st.inflight.get(key) {
                // Attach: at most one outstanding request per key.
                Some((_, fut)) => fut.clone(),
                None => Self::issue(&self.state, &mut st, key, loader),
            }
        };
        wait.await;
        self.entry(key).unwrap_or_else(|| QueryEntry::idle(key.clone()))
    }

    /// Start a new load under the lock and register it as the in-flight one.
    fn issue(
        state: &Arc<Mutex<State>>,
        st: &mut State,
        key: &QueryKey,
        loader: Loader,
    ) -> SharedLoad {
        let entry = st
            .entries
            .entry(key.clone())
            .or_insert_with(|| QueryEntry::idle(key.clone()));
        entry.issued += 1;
        entry.status = QueryStatus::Loading;
        let ticket = entry.issued;
        let shared_state = state.clone();
        let k = key.clone();
        debug!(key = %k, ticket, "issuing load");
        let fut = async move {
            let res = loader().await;
            Self::apply(&shared_state, &k, ticket, res);
        }
        .boxed()
        .shared();
        st.inflight.insert(key.clone(), (ticket, fut.clone()));
        fut
    }

    /// Apply a completed response in issue order. A response older than the
    /// newest applied one is discarded so a slow early request can never
    /// clobber fresher data; a response predating the latest invalidation may
    /// update data but not clear the stale mark.
    fn apply(state: &Arc<Mutex<State>>, key: &QueryKey, ticket: u64, res: ClientResult<QueryData>) {
        let mut st = state.lock();
        let Some(entry) = st.entries.get_mut(key) else { return };
        if ticket < entry.applied {
            debug!(key = %key, ticket, applied = entry.applied, "discarding stale response");
        } else {
            entry.applied = ticket;
            match res {
                Ok(data) => {
                    entry.data = Some(data);
                    entry.fetched_at = Some(Utc::now().timestamp());
                    if ticket > entry.stale_floor {
                        entry.stale = false;
                    }
                    if ticket == entry.issued {
                        entry.status = QueryStatus::Ready;
                    }
                }
                Err(e) => {
                    // keep last-good data for flicker-free display
                    if ticket == entry.issued {
                        entry.status = QueryStatus::Error(e);
                    }
                }
            }
        }
        let ours = st.inflight.get(key).map(|(t, _)| *t == ticket).unwrap_or(false);
        if ours {
            st.inflight.remove(key);
        }
    }

    /// Mark every parameterization of the given names stale, whether or not it
    /// is on screen. Data is retained; in-flight loads for those names are
    /// demoted so their eventual responses cannot clear the mark. Idempotent.
    pub fn invalidate(&self, names: &[&str]) {
        let mut st = self.state.lock();
        for entry in st.entries.values_mut() {
            if names.contains(&entry.key.name.as_str()) {
                entry.stale = true;
                entry.stale_floor = entry.issued;
            }
        }
        // Next fetch for these names must issue anew rather than attach.
        st.inflight.retain(|k, _| !names.contains(&k.name.as_str()));
        debug!(?names, "invalidated");
    }

    /// React to a successful mutation: apply the invalidation rule for `kind`,
    /// then eagerly refetch every watched key in the affected name set.
    /// Un-watched keys stay stale and refetch lazily on their next display.
    pub async fn on_mutation_success(&self, kind: MutationKind, affected_owner_id: i64) {
        let names = invalidated_names(kind);
        self.invalidate(names);
        let targets: Vec<(QueryKey, Loader)> = {
            let st = self.state.lock();
            st.watched
                .iter()
                .filter(|k| names.contains(&k.name.as_str()))
                .filter_map(|k| st.loaders.get(k).map(|l| (k.clone(), l.clone())))
                .collect()
        };
        info!(?kind, owner = affected_owner_id, refetching = targets.len(), "mutation committed; refreshing affected queries");
        let refetches = targets.into_iter().map(|(k, l)| {
            let me = self.clone();
            async move {
                let _ = me.fetch(&k, l).await;
            }
        });
        futures_util::future::join_all(refetches).await;
    }

    /// Mark a key as on-screen so mutations refetch it eagerly.
    pub fn watch(&self, key: &QueryKey) {
        self.state.lock().watched.insert(key.clone());
    }

    pub fn unwatch(&self, key: &QueryKey) {
        self.state.lock().watched.remove(key);
    }

    /// Watch `key` and drop any other watched parameterization of the same
    /// name. Page and tab switches are key switches, never invalidations.
    pub fn watch_exclusive(&self, key: &QueryKey) {
        let mut st = self.state.lock();
        st.watched.retain(|k| k.name != key.name || k == key);
        st.watched.insert(key.clone());
    }

    /// Read snapshot for the UI.
    pub fn entry(&self, key: &QueryKey) -> Option<QueryEntry> {
        self.state.lock().entries.get(key).cloned()
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.state.lock().entries.get(key).map(|e| e.stale).unwrap_or(false)
    }

    /// Keys currently marked stale, sorted by display form for stable comparison.
    pub fn stale_keys(&self) -> Vec<QueryKey> {
        let st = self.state.lock();
        let mut keys: Vec<QueryKey> = st
            .entries
            .values()
            .filter(|e| e.stale)
            .map(|e| e.key.clone())
            .collect();
        keys.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
        keys
    }
}
