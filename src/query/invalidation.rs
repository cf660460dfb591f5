use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::key::names;

/// Kind of post mutation that just succeeded against the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Edit,
    Delete,
}

/// Fixed invalidation policy: which query names go stale after each mutation.
/// Every query whose visible content could change must appear here; omission
/// means a stale screen. `accountsTotal` never appears because accounts are a
/// disjoint resource, and `edit` leaves counts unchanged so `postsTotal` is
/// excluded there.
static RULES: Lazy<HashMap<MutationKind, &'static [&'static str]>> = Lazy::new(|| {
    let mut m: HashMap<MutationKind, &'static [&'static str]> = HashMap::new();
    m.insert(MutationKind::Create, &[names::MY_POSTS, names::ALL_POSTS, names::POSTS_TOTAL]);
    m.insert(MutationKind::Edit, &[names::MY_POSTS, names::ALL_POSTS]);
    m.insert(MutationKind::Delete, &[names::MY_POSTS, names::ALL_POSTS, names::POSTS_TOTAL]);
    m
});

/// Query names invalidated by a mutation kind.
/// Panics only if the rule table is malformed, which is a programming error.
pub fn invalidated_names(kind: MutationKind) -> &'static [&'static str] {
    RULES.get(&kind).copied().unwrap_or_else(|| {
        panic!("invalidation rule table has no entry for {:?}", kind)
    })
}
