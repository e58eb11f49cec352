//! Unit and stress tests for the Michael-Scott queue

use super::MsQueue;
#[cfg(feature = "metrics")]
use crate::metrics::MetricsCollector;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_empty_then_fifo_then_empty() {
    let queue = MsQueue::new();

    assert_eq!(queue.dequeue(), None);
    queue.enqueue(5);
    queue.enqueue(6);
    assert_eq!(queue.dequeue(), Some(5));
    assert_eq!(queue.dequeue(), Some(6));
    assert_eq!(queue.dequeue(), None);
}

#[test]
fn test_len_and_is_empty() {
    let queue = MsQueue::new();
    assert!(queue.is_empty());
    assert_eq!(queue.len(), 0);

    for i in 0..10 {
        queue.enqueue(i);
    }
    assert!(!queue.is_empty());
    assert_eq!(queue.len(), 10);

    for _ in 0..10 {
        queue.dequeue();
    }
    assert!(queue.is_empty());
    assert_eq!(queue.len(), 0);
}

#[test]
fn test_interleaved_single_thread() {
    let queue = MsQueue::new();

    queue.enqueue("a");
    queue.enqueue("b");
    assert_eq!(queue.dequeue(), Some("a"));
    queue.enqueue("c");
    assert_eq!(queue.dequeue(), Some("b"));
    assert_eq!(queue.dequeue(), Some("c"));
    assert_eq!(queue.dequeue(), None);

    // The queue keeps working once it has cycled through empty.
    queue.enqueue("d");
    assert_eq!(queue.dequeue(), Some("d"));
}

#[test]
fn test_spsc_preserves_order() {
    let queue = Arc::new(MsQueue::new());
    let count = 50_000;

    let producer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            for i in 0..count {
                queue.enqueue(i);
            }
        })
    };

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut expected = 0;
            while expected < count {
                match queue.dequeue() {
                    Some(value) => {
                        assert_eq!(value, expected);
                        expected += 1;
                    }
                    None => thread::yield_now(),
                }
            }
        })
    };

    producer.join().unwrap();
    consumer.join().unwrap();
    assert!(queue.is_empty());
}

#[test]
fn test_mpmc_delivers_each_value_once() {
    let queue = Arc::new(MsQueue::new());
    let producers = 4;
    let consumers = 4;
    let per_producer = 10_000;
    let total = producers * per_producer;
    let consumed = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(producers + consumers));

    let mut producer_handles = vec![];
    for p in 0..producers {
        let queue = Arc::clone(&queue);
        let barrier = Arc::clone(&barrier);
        producer_handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..per_producer {
                queue.enqueue(p * per_producer + i);
            }
        }));
    }

    let mut consumer_handles = vec![];
    for _ in 0..consumers {
        let queue = Arc::clone(&queue);
        let barrier = Arc::clone(&barrier);
        let consumed = Arc::clone(&consumed);
        consumer_handles.push(thread::spawn(move || {
            barrier.wait();
            let mut seen = Vec::new();
            while consumed.load(Ordering::Relaxed) < total {
                match queue.dequeue() {
                    Some(value) => {
                        seen.push(value);
                        consumed.fetch_add(1, Ordering::Relaxed);
                    }
                    None => thread::yield_now(),
                }
            }
            seen
        }));
    }

    for handle in producer_handles {
        handle.join().unwrap();
    }

    let mut all = HashSet::new();
    for handle in consumer_handles {
        for value in handle.join().unwrap() {
            assert!(all.insert(value), "value {} dequeued twice", value);
        }
    }

    assert_eq!(all.len(), total);
    assert_eq!(queue.dequeue(), None);
}

#[test]
fn test_per_producer_order_is_kept() {
    let queue = Arc::new(MsQueue::new());
    let producers = 4;
    let per_producer = 5_000;

    let handles: Vec<_> = (0..producers)
        .map(|p| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..per_producer {
                    queue.enqueue((p, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut last = vec![None; producers];
    while let Some((p, i)) = queue.dequeue() {
        if let Some(previous) = last[p] {
            assert!(i > previous, "producer {} reordered: {} after {}", p, i, previous);
        }
        last[p] = Some(i);
    }
    assert!(last.iter().all(|l| *l == Some(per_producer - 1)));
}

#[test]
fn test_len_stays_bounded_while_producers_and_consumers_overlap() {
    let queue = Arc::new(MsQueue::new());
    let done = Arc::new(AtomicBool::new(false));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    queue.enqueue(1u64);
                    queue.dequeue();
                }
            })
        })
        .collect();

    // At most four values are live, and each worker can have one
    // uncounted dequeue in flight on top of that
    for _ in 0..20_000 {
        queue.dequeue();
        let len = queue.len();
        assert!(len <= 8, "len {} on a churning queue", len);
    }

    done.store(true, Ordering::Relaxed);
    for worker in workers {
        worker.join().unwrap();
    }
    while queue.dequeue().is_some() {}
    assert_eq!(queue.len(), 0);
}

#[test]
fn test_drop_releases_remaining_values() {
    static DROPS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug)]
    struct Tracked;
    impl Drop for Tracked {
        fn drop(&mut self) {
            DROPS.fetch_add(1, Ordering::Relaxed);
        }
    }

    let queue = MsQueue::new();
    for _ in 0..100 {
        queue.enqueue(Tracked);
    }
    for _ in 0..50 {
        drop(queue.dequeue());
    }
    assert_eq!(DROPS.load(Ordering::Relaxed), 50);

    drop(queue);
    assert_eq!(DROPS.load(Ordering::Relaxed), 100);
}

#[cfg(feature = "metrics")]
#[test]
fn test_metrics_count_empty_dequeues() {
    let queue = MsQueue::new();
    queue.enqueue(1);
    queue.dequeue();
    queue.dequeue();

    let metrics = queue.metrics();
    assert_eq!(metrics.operations, 3);
    assert_eq!(metrics.empty_results, 1);

    queue.reset_metrics();
    assert_eq!(queue.metrics().operations, 0);
}
