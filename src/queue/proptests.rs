//! Property-based tests for the Michael-Scott queue
//!
//! Each property drives the queue and a `VecDeque` model with the same
//! operations and checks that they never disagree.

use super::MsQueue;
use proptest::prelude::*;
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone)]
enum Op {
    Enqueue(i32),
    Dequeue,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<i32>().prop_map(Op::Enqueue),
        2 => Just(Op::Dequeue),
    ]
}

proptest! {
    #[test]
    fn matches_vecdeque_model(ops in prop::collection::vec(op(), 0..300)) {
        let queue = MsQueue::new();
        let mut model = VecDeque::new();

        for op in ops {
            match op {
                Op::Enqueue(value) => {
                    queue.enqueue(value);
                    model.push_back(value);
                }
                Op::Dequeue => {
                    prop_assert_eq!(queue.dequeue(), model.pop_front());
                }
            }
            prop_assert_eq!(queue.len(), model.len());
            prop_assert_eq!(queue.is_empty(), model.is_empty());
        }

        while let Some(expected) = model.pop_front() {
            prop_assert_eq!(queue.dequeue(), Some(expected));
        }
        prop_assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn spsc_order_equals_enqueue_order(values in prop::collection::vec(any::<u32>(), 0..500)) {
        let queue = Arc::new(MsQueue::new());
        let expected = values.clone();

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for value in values {
                    queue.enqueue(value);
                }
            })
        };

        let mut received = Vec::with_capacity(expected.len());
        while received.len() < expected.len() {
            match queue.dequeue() {
                Some(value) => received.push(value),
                None => thread::yield_now(),
            }
        }
        producer.join().unwrap();

        prop_assert_eq!(received, expected);
        prop_assert_eq!(queue.dequeue(), None);
    }
}
