use serde::{Deserialize, Serialize};

use crate::api::types::PostsResponse;
use crate::error::ClientError;

use super::key::QueryKey;

/// Payload of one cached result set: a page of posts or a single scalar total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryData {
    Page(PostsResponse),
    Total(u64),
}

impl QueryData {
    pub fn as_page(&self) -> Option<&PostsResponse> {
        match self {
            QueryData::Page(p) => Some(p),
            QueryData::Total(_) => None,
        }
    }

    pub fn as_total(&self) -> Option<u64> {
        match self {
            QueryData::Total(t) => Some(*t),
            QueryData::Page(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Ready,
    Error(ClientError),
}

/// One cached result set. Owned exclusively by the coordinator; callers hold
/// clones. `data` survives both staleness marking and failed refetches so the
/// screen never flickers back to an empty state.
#[derive(Debug, Clone)]
pub struct QueryEntry {
    pub key: QueryKey,
    pub data: Option<QueryData>,
    pub fetched_at: Option<i64>,
    pub status: QueryStatus,
    pub stale: bool,
    /// Issue-order bookkeeping: ticket of the newest request issued for this
    /// key, and of the newest response applied. A response with a ticket below
    /// `applied` is discarded.
    pub(super) issued: u64,
    pub(super) applied: u64,
    /// Responses issued at or before this ticket predate the latest
    /// invalidation and may not clear the stale mark.
    pub(super) stale_floor: u64,
}

impl QueryEntry {
    pub(super) fn idle(key: QueryKey) -> Self {
        Self {
            key,
            data: None,
            fetched_at: None,
            status: QueryStatus::Idle,
            stale: false,
            issued: 0,
            applied: 0,
            stale_floor: 0,
        }
    }

    /// Fresh enough to serve without touching the network.
    pub fn is_fresh(&self) -> bool {
        self.status == QueryStatus::Ready && !self.stale
    }
}
