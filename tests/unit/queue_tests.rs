//! Unit tests for the pending-request FIFO.

use playerdb_relay::dispatch::queue::RequestQueue;
use playerdb_relay::models::request::PendingRequest;

fn join(callsign: &str) -> PendingRequest {
    PendingRequest::join(callsign, "1", "127.0.0.1", "v1")
}

#[test]
fn pops_in_insertion_order() {
    let mut queue = RequestQueue::new();
    queue.push(join("A"));
    queue.push(join("B"));
    queue.push(join("C"));

    let order: Vec<String> = std::iter::from_fn(|| queue.pop())
        .map(|r| r.fields.get("callsign").unwrap().to_owned())
        .collect();

    assert_eq!(order, ["A", "B", "C"]);
    assert!(queue.is_empty());
}

#[test]
fn drain_empties_queue_oldest_first() {
    let mut queue = RequestQueue::new();
    queue.push(join("A"));
    queue.push(join("B"));

    let drained = queue.drain();

    assert_eq!(drained.len(), 2);
    assert_eq!(drained[0].fields.get("callsign"), Some("A"));
    assert!(queue.is_empty());
    assert!(queue.pop().is_none());
}
