//! Cache behavior of the query coordinator: hit/miss discipline, request
//! deduplication, staleness marking and issue-order response application.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::FutureExt;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use postline::query::{
    names, Loader, MutationKind, QueryCoordinator, QueryData, QueryKey, QueryStatus,
};
use postline::error::ClientError;

/// Loader returning a fixed scalar and counting invocations.
fn counting_loader(counter: Arc<AtomicUsize>, value: u64) -> Loader {
    Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Ok(QueryData::Total(value)) }.boxed()
    })
}

/// Loader that waits for a release signal before yielding its value.
fn gated_loader(rx: oneshot::Receiver<()>, value: u64) -> Loader {
    let slot = Arc::new(Mutex::new(Some(rx)));
    Arc::new(move || {
        let rx = slot.lock().take();
        async move {
            if let Some(rx) = rx {
                let _ = rx.await;
            }
            Ok(QueryData::Total(value))
        }
        .boxed()
    })
}

fn failing_loader(counter: Arc<AtomicUsize>) -> Loader {
    Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Err(ClientError::network("network_error", "connection refused")) }.boxed()
    })
}

#[tokio::test]
async fn second_fetch_is_a_cache_hit() {
    let qc = QueryCoordinator::new();
    let key = QueryKey::bare(names::POSTS_TOTAL);
    let calls = Arc::new(AtomicUsize::new(0));
    let loader = counting_loader(calls.clone(), 11);

    let first = qc.fetch(&key, loader.clone()).await;
    assert_eq!(first.status, QueryStatus::Ready);
    assert_eq!(first.data.as_ref().and_then(QueryData::as_total), Some(11));

    let second = qc.fetch(&key, loader).await;
    assert_eq!(second.status, QueryStatus::Ready);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "no invalidation between fetches");
}

#[tokio::test]
async fn concurrent_fetches_share_one_request() {
    let qc = QueryCoordinator::new();
    let key = QueryKey::paged(names::MY_POSTS, 1);
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    let loader: Loader = Arc::new(move || {
        c.fetch_add(1, Ordering::SeqCst);
        async move {
            tokio::time::sleep(std::time::Duration::from_millis(30)).await;
            Ok(QueryData::Total(1))
        }
        .boxed()
    });

    let (a, b) = tokio::join!(qc.fetch(&key, loader.clone()), qc.fetch(&key, loader));
    assert_eq!(a.status, QueryStatus::Ready);
    assert_eq!(b.status, QueryStatus::Ready);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "second caller attaches to the in-flight load");
}

#[tokio::test]
async fn invalidate_is_idempotent() {
    let qc = QueryCoordinator::new();
    let calls = Arc::new(AtomicUsize::new(0));
    qc.fetch(&QueryKey::paged(names::MY_POSTS, 1), counting_loader(calls.clone(), 1)).await;
    qc.fetch(&QueryKey::paged(names::MY_POSTS, 2), counting_loader(calls.clone(), 2)).await;
    qc.fetch(&QueryKey::bare(names::ACCOUNTS_TOTAL), counting_loader(calls.clone(), 3)).await;

    qc.invalidate(&[names::MY_POSTS]);
    let once = qc.stale_keys();
    qc.invalidate(&[names::MY_POSTS]);
    let twice = qc.stale_keys();

    postline::tprintln!("stale set after double invalidate: {:?}", twice);
    assert_eq!(once, twice);
    // every parameterization of the name, nothing else
    assert_eq!(once, vec![QueryKey::paged(names::MY_POSTS, 1), QueryKey::paged(names::MY_POSTS, 2)]);
}

#[tokio::test]
async fn delete_marks_posts_queries_stale_and_leaves_accounts_alone() {
    let qc = QueryCoordinator::new();
    let my_calls = Arc::new(AtomicUsize::new(0));
    let acct_calls = Arc::new(AtomicUsize::new(0));
    let my_key = QueryKey::paged(names::MY_POSTS, 1);
    let all_key = QueryKey::paged(names::ALL_POSTS, 1);
    let acct_key = QueryKey::bare(names::ACCOUNTS_TOTAL);

    qc.fetch(&my_key, counting_loader(my_calls.clone(), 5)).await;
    qc.fetch(&all_key, counting_loader(my_calls.clone(), 9)).await;
    qc.fetch(&acct_key, counting_loader(acct_calls.clone(), 3)).await;

    // nothing watched: entries just go stale, refetch happens lazily
    qc.on_mutation_success(MutationKind::Delete, 1).await;

    assert!(qc.is_stale(&my_key));
    assert!(qc.is_stale(&all_key));
    assert!(!qc.is_stale(&acct_key));
    assert_eq!(acct_calls.load(Ordering::SeqCst), 1, "accountsTotal untouched");

    // stale data stays visible until a refetch lands
    let entry = qc.entry(&my_key).unwrap();
    assert_eq!(entry.data.as_ref().and_then(QueryData::as_total), Some(5));
}

#[tokio::test]
async fn watched_keys_are_refetched_eagerly_after_mutation() {
    let qc = QueryCoordinator::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = QueryKey::paged(names::ALL_POSTS, 1);
    qc.watch(&key);
    qc.fetch(&key, counting_loader(calls.clone(), 7)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    qc.on_mutation_success(MutationKind::Create, 4).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2, "watched key refetched");
    let entry = qc.entry(&key).unwrap();
    assert!(!entry.stale, "refetch cleared the stale mark");
    assert_eq!(entry.status, QueryStatus::Ready);
}

#[tokio::test]
async fn late_response_does_not_clobber_newer_one() {
    let qc = QueryCoordinator::new();
    let key = QueryKey::bare(names::POSTS_TOTAL);
    let (release_a, gate_a) = oneshot::channel();

    // request A issued first, stalls in flight
    let qc_a = qc.clone();
    let key_a = key.clone();
    let slow = gated_loader(gate_a, 100);
    let task_a = tokio::spawn(async move { qc_a.fetch(&key_a, slow).await });
    tokio::task::yield_now().await;

    // invalidation forces the next fetch to issue anew instead of attaching
    qc.invalidate(&[names::POSTS_TOTAL]);
    let fast = counting_loader(Arc::new(AtomicUsize::new(0)), 200);
    let b = qc.fetch(&key, fast).await;
    assert_eq!(b.data.as_ref().and_then(QueryData::as_total), Some(200));

    // A finally resolves, after B already landed: it must be discarded
    release_a.send(()).unwrap();
    task_a.await.unwrap();

    let entry = qc.entry(&key).unwrap();
    assert_eq!(entry.data.as_ref().and_then(QueryData::as_total), Some(200));
    assert_eq!(entry.status, QueryStatus::Ready);
    assert!(!entry.stale);
}

#[tokio::test]
async fn failed_refetch_keeps_last_good_data() {
    let qc = QueryCoordinator::new();
    let key = QueryKey::paged(names::MY_POSTS, 1);
    let ok_calls = Arc::new(AtomicUsize::new(0));
    qc.fetch(&key, counting_loader(ok_calls, 5)).await;

    qc.invalidate(&[names::MY_POSTS]);
    let err_calls = Arc::new(AtomicUsize::new(0));
    let entry = qc.fetch(&key, failing_loader(err_calls.clone())).await;

    assert_eq!(err_calls.load(Ordering::SeqCst), 1);
    assert!(matches!(entry.status, QueryStatus::Error(ClientError::Network { .. })));
    assert_eq!(
        entry.data.as_ref().and_then(QueryData::as_total),
        Some(5),
        "last-good data retained for display"
    );
    assert!(entry.stale, "failed refetch leaves the entry stale");
}

#[tokio::test]
async fn navigation_is_a_key_switch_not_an_invalidation() {
    let qc = QueryCoordinator::new();
    let p1 = QueryKey::paged(names::ALL_POSTS, 1);
    let p2 = QueryKey::paged(names::ALL_POSTS, 2);
    let calls = Arc::new(AtomicUsize::new(0));

    qc.fetch(&p1, counting_loader(calls.clone(), 1)).await;
    qc.fetch(&p2, counting_loader(calls.clone(), 2)).await;

    assert!(!qc.is_stale(&p1));
    assert!(!qc.is_stale(&p2));
    // returning to page 1 is a pure cache hit
    qc.fetch(&p1, counting_loader(calls.clone(), 1)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
