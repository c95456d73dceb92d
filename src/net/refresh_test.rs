use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

fn counting_refresh(calls: &Arc<AtomicUsize>, outcome: Result<&'static str, ApiError>) -> RefreshFuture {
    let calls = Arc::clone(calls);
    async move {
        calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        outcome.map(str::to_owned)
    }
    .boxed()
}

#[tokio::test]
async fn single_caller_runs_refresh() {
    let guard = RefreshGuard::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let token = guard.run(|| counting_refresh(&calls, Ok("T2"))).await.unwrap();
    assert_eq!(token, "T2");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!guard.is_refreshing());
}

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
    let guard = RefreshGuard::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let (a, b, c) = tokio::join!(
        guard.run(|| counting_refresh(&calls, Ok("T2"))),
        guard.run(|| counting_refresh(&calls, Ok("T3"))),
        guard.run(|| counting_refresh(&calls, Ok("T4"))),
    );

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
    assert_eq!(a, b);
    assert_eq!(b, c);
    assert!(["T2", "T3", "T4"].contains(&a.as_str()));
}

#[tokio::test]
async fn concurrent_callers_share_one_failure() {
    let guard = RefreshGuard::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let expired = || ApiError::SessionExpired { reason: "refresh rejected".into() };

    let (a, b) = tokio::join!(
        guard.run(|| counting_refresh(&calls, Err(expired()))),
        guard.run(|| counting_refresh(&calls, Err(expired()))),
    );

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(matches!(a, Err(ApiError::SessionExpired { .. })));
    assert!(matches!(b, Err(ApiError::SessionExpired { .. })));
}

#[tokio::test]
async fn sequential_refreshes_each_run() {
    let guard = RefreshGuard::new();
    let calls = Arc::new(AtomicUsize::new(0));

    assert_eq!(guard.run(|| counting_refresh(&calls, Ok("T2"))).await.unwrap(), "T2");
    assert_eq!(guard.run(|| counting_refresh(&calls, Ok("T3"))).await.unwrap(), "T3");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
