use batch_fetch::mock::MockTransport;
use batch_fetch::{BatchError, BatchFetchCoordinator, FailurePolicy, Outcome};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
struct User {
    id: u32,
    name: String,
}

fn user(id: u32, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
    }
}

/// Mock where keys 1..=3 exist, with key 2 answering with a non-success status.
fn mock_with_missing_second_key() -> MockTransport<u32, User> {
    let mock = MockTransport::<u32, User>::new();
    mock.expect(1).return_ok(user(1, "Alice"));
    mock.expect(2).return_status(500);
    mock.expect(3).return_ok(user(3, "Carol"));
    mock
}

fn mock_all_present() -> MockTransport<u32, User> {
    let mock = MockTransport::<u32, User>::new();
    mock.expect(1).return_ok(user(1, "Alice"));
    mock.expect(2).return_ok(user(2, "Bob"));
    mock.expect(3).return_ok(user(3, "Carol"));
    mock
}

#[tokio::test]
async fn test_all_succeed_both_policies_return_input_order() {
    for policy in [FailurePolicy::CollectAll, FailurePolicy::FailFast] {
        let mock = mock_all_present();
        let coordinator = BatchFetchCoordinator::from_shared(mock.shared());

        let users = coordinator
            .fetch_all(vec![1, 2, 3], policy)
            .await
            .expect("batch should succeed");

        assert_eq!(
            users,
            vec![user(1, "Alice"), user(2, "Bob"), user(3, "Carol")],
            "policy {:?}",
            policy
        );
        mock.verify();
    }
}

#[tokio::test]
async fn test_collect_all_drops_failed_key() {
    let mock = mock_with_missing_second_key();
    let coordinator = BatchFetchCoordinator::from_shared(mock.shared());

    let users = coordinator
        .fetch_all(vec![1, 2, 3], FailurePolicy::CollectAll)
        .await
        .expect("collect-all never fails on individual keys");

    assert_eq!(users, vec![user(1, "Alice"), user(3, "Carol")]);
    assert_eq!(mock.calls(), 3, "every key is requested exactly once");
    mock.verify();
}

#[tokio::test]
async fn test_fail_fast_aborts_on_failed_key() {
    let mock = mock_with_missing_second_key();
    let coordinator = BatchFetchCoordinator::from_shared(mock.shared());

    let result = coordinator
        .fetch_all(vec![1, 2, 3], FailurePolicy::FailFast)
        .await;

    match result {
        Err(BatchError::BatchAborted { key, cause }) => {
            assert_eq!(key, "2");
            assert!(cause.contains("status: 500"), "unexpected cause: {}", cause);
        }
        other => panic!("Expected BatchAborted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_collect_all_with_every_key_failing_is_empty_not_error() {
    let mock = MockTransport::<u32, User>::new();
    mock.expect(1).return_transport_error("connection refused");
    mock.expect(2).return_decode_error("missing field `name`");

    let coordinator = BatchFetchCoordinator::from_shared(mock.shared());
    let users = coordinator
        .fetch_all(vec![1, 2], FailurePolicy::CollectAll)
        .await
        .unwrap();

    assert!(users.is_empty());
}

#[tokio::test]
async fn test_empty_batch_launches_nothing() {
    let mock = mock_all_present();
    let coordinator = BatchFetchCoordinator::from_shared(mock.shared());

    for policy in [FailurePolicy::CollectAll, FailurePolicy::FailFast] {
        let users = coordinator.fetch_all(Vec::new(), policy).await.unwrap();
        assert!(users.is_empty());
    }
    assert!(coordinator.fetch_all_settled(Vec::new()).await.is_empty());

    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn test_fail_fast_does_not_cancel_in_flight_siblings() {
    let mock = MockTransport::<u32, User>::new();
    mock.expect(1).return_status(404);
    mock.expect(2)
        .with_delay(Duration::from_millis(50))
        .return_ok(user(2, "Bob"));
    mock.expect(3)
        .with_delay(Duration::from_millis(50))
        .return_ok(user(3, "Carol"));

    let coordinator = BatchFetchCoordinator::from_shared(mock.shared());
    let result = coordinator
        .fetch_all(vec![1, 2, 3], FailurePolicy::FailFast)
        .await;

    assert!(matches!(result, Err(BatchError::BatchAborted { .. })));
    assert!(
        mock.completed() < 3,
        "abort should be observed before the slow keys finish"
    );

    // The detached tasks still run to completion.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(mock.completed(), 3);
    mock.verify();
}

#[tokio::test]
async fn test_fetch_one_is_idempotent() {
    let mock = mock_all_present();
    let coordinator = BatchFetchCoordinator::from_shared(mock.shared());

    let first = coordinator.fetch_one(2).await;
    let second = coordinator.fetch_one(2).await;

    assert_eq!(first, Outcome::Present(user(2, "Bob")));
    assert_eq!(first, second);
    assert_eq!(mock.calls_for(&2), 2);
}

/// Concurrent batches share one coordinator without interfering.
#[tokio::test]
async fn test_concurrent_batches() {
    let mock = mock_with_missing_second_key();
    let coordinator = BatchFetchCoordinator::from_shared(mock.shared());

    let mut handles = vec![];
    for _ in 0..10 {
        let coordinator = coordinator.clone();
        handles.push(tokio::spawn(async move {
            coordinator
                .fetch_all(vec![3, 2, 1], FailurePolicy::CollectAll)
                .await
        }));
    }

    for handle in handles {
        let users = handle.await.unwrap().unwrap();
        assert_eq!(users, vec![user(3, "Carol"), user(1, "Alice")]);
    }
    assert_eq!(mock.calls(), 30);
}

/// Mock where key 2 panics inside the transport instead of answering.
fn mock_with_panicking_second_key() -> MockTransport<u32, User> {
    let mock = MockTransport::<u32, User>::new();
    mock.expect(1).return_ok(user(1, "Alice"));
    mock.expect(2).return_panic("transport bug on key 2");
    mock.expect(3).return_ok(user(3, "Carol"));
    mock
}

#[tokio::test]
async fn test_collect_all_survives_panicking_fetch() {
    let mock = mock_with_panicking_second_key();
    let coordinator = BatchFetchCoordinator::from_shared(mock.shared());

    let users = coordinator
        .fetch_all(vec![1, 2, 3], FailurePolicy::CollectAll)
        .await
        .expect("a panicking task counts as one absent key");

    assert_eq!(users, vec![user(1, "Alice"), user(3, "Carol")]);

    let settled = coordinator.fetch_all_settled(vec![1, 2, 3]).await;
    let diagnostic = settled[1].1.diagnostic().unwrap();
    assert!(
        diagnostic.starts_with("fetch task failed"),
        "unexpected diagnostic: {}",
        diagnostic
    );
    mock.verify();
}

#[tokio::test]
async fn test_fail_fast_aborts_on_panicking_fetch() {
    let mock = mock_with_panicking_second_key();
    let coordinator = BatchFetchCoordinator::from_shared(mock.shared());

    let result = coordinator
        .fetch_all(vec![1, 2, 3], FailurePolicy::FailFast)
        .await;

    match result {
        Err(BatchError::BatchAborted { key, cause }) => {
            assert_eq!(key, "2");
            assert!(cause.starts_with("fetch task failed"), "unexpected cause: {}", cause);
        }
        other => panic!("Expected BatchAborted, got {:?}", other),
    }
}
