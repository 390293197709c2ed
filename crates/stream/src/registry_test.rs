//! Tests for SubscriberRegistry

use bytes::Bytes;

use super::{SubscriberRegistry, MAX_SUBSCRIBERS, SUBSCRIBER_BUFFER};

#[tokio::test]
async fn test_subscribe_assigns_distinct_ids() {
    let registry = SubscriberRegistry::new();
    let (a, _feed_a) = registry.subscribe().unwrap();
    let (b, _feed_b) = registry.subscribe().unwrap();

    assert_ne!(a, b);
    assert_eq!(registry.len(), 2);
}

#[tokio::test]
async fn test_broadcast_reaches_every_subscriber() {
    let registry = SubscriberRegistry::new();
    let (_a, mut feed_a) = registry.subscribe().unwrap();
    let (_b, mut feed_b) = registry.subscribe().unwrap();

    let msg = Bytes::from_static(b"payload");
    assert_eq!(registry.broadcast(&msg), 2);

    assert_eq!(feed_a.recv().await.unwrap(), msg);
    assert_eq!(feed_b.recv().await.unwrap(), msg);
}

#[tokio::test]
async fn test_unsubscribe_removes_slot() {
    let registry = SubscriberRegistry::new();
    let (id, _feed) = registry.subscribe().unwrap();

    registry.unsubscribe(id);
    assert_eq!(registry.len(), 0);
    assert_eq!(registry.broadcast(&Bytes::from_static(b"x")), 0);
}

#[tokio::test]
async fn test_full_queue_drops_instead_of_blocking() {
    let registry = SubscriberRegistry::new();
    let (_id, mut feed) = registry.subscribe().unwrap();

    let msg = Bytes::from_static(b"x");
    for _ in 0..SUBSCRIBER_BUFFER {
        assert_eq!(registry.broadcast(&msg), 1);
    }

    // Queue is full now; the next broadcast drops for this subscriber
    assert_eq!(registry.broadcast(&msg), 0);
    assert_eq!(registry.dropped(), 1);

    // Draining resumes delivery
    feed.recv().await.unwrap();
    assert_eq!(registry.broadcast(&msg), 1);
}

#[tokio::test]
async fn test_subscriber_limit() {
    let registry = SubscriberRegistry::new();
    let mut feeds = Vec::new();
    for _ in 0..MAX_SUBSCRIBERS {
        feeds.push(registry.subscribe().unwrap());
    }

    assert!(registry.subscribe().is_none());

    let (id, _) = &feeds[0];
    registry.unsubscribe(*id);
    assert!(registry.subscribe().is_some());
}
