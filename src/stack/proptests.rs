//! Property-based tests for the Treiber stack

use super::TreiberStack;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Push(i64),
    Pop,
    PushBatch(Vec<i64>),
    PopBatch(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i64>().prop_map(Op::Push),
        3 => Just(Op::Pop),
        1 => prop::collection::vec(any::<i64>(), 0..8).prop_map(Op::PushBatch),
        1 => (0usize..8).prop_map(Op::PopBatch),
    ]
}

proptest! {
    #[test]
    fn matches_vec_model(ops in prop::collection::vec(op(), 0..300)) {
        let stack = TreiberStack::new();
        let mut model = Vec::new();

        for op in ops {
            match op {
                Op::Push(value) => {
                    stack.push(value);
                    model.push(value);
                }
                Op::Pop => prop_assert_eq!(stack.pop(), model.pop()),
                Op::PushBatch(values) => {
                    model.extend(values.iter().copied());
                    stack.push_batch(values);
                }
                Op::PopBatch(count) => {
                    let expected: Vec<i64> =
                        (0..count).map_while(|_| model.pop()).collect();
                    prop_assert_eq!(stack.pop_batch(count), expected);
                }
            }
            prop_assert_eq!(stack.len(), model.len());
            prop_assert_eq!(stack.is_empty(), model.is_empty());
        }
    }
}
