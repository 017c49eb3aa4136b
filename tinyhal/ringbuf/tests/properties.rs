//! Property tests for the overwriting ring buffer

use proptest::prelude::*;
use tinyhal_ringbuf::RingBuffer;

const CAP: usize = 16;

#[derive(Debug, Clone)]
enum Op {
    Add(u8),
    Remove,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u8>().prop_map(Op::Add),
        1 => Just(Op::Remove),
    ]
}

proptest! {
    #[test]
    fn count_is_bounded_and_consistent(ops in proptest::collection::vec(op(), 0..200)) {
        let mut buf: RingBuffer<CAP> = RingBuffer::new();
        for op in ops {
            match op {
                Op::Add(b) => buf.add(b),
                Op::Remove => buf.remove_oldest(),
            }
            prop_assert!(buf.count() <= CAP);
            prop_assert_eq!(buf.is_empty(), buf.count() == 0);
            prop_assert_eq!(buf.free_capacity() + buf.count(), CAP);
        }
    }

    #[test]
    fn keeps_most_recent_bytes_in_order(bytes in proptest::collection::vec(any::<u8>(), CAP + 1..100)) {
        let mut buf: RingBuffer<CAP> = RingBuffer::new();
        for &b in &bytes {
            buf.add(b);
        }
        let kept: Vec<u8> = core::iter::from_fn(|| buf.pop_oldest()).collect();
        prop_assert_eq!(&kept[..], &bytes[bytes.len() - CAP..]);
    }

    #[test]
    fn behaves_like_bounded_deque(ops in proptest::collection::vec(op(), 0..200)) {
        let mut buf: RingBuffer<CAP> = RingBuffer::new();
        let mut model = std::collections::VecDeque::new();
        for op in ops {
            match op {
                Op::Add(b) => {
                    buf.add(b);
                    model.push_back(b);
                    if model.len() > CAP {
                        model.pop_front();
                    }
                }
                Op::Remove => {
                    buf.remove_oldest();
                    model.pop_front();
                }
            }
            prop_assert_eq!(buf.peek(), model.front().copied());
        }
        prop_assert!(buf.iter().eq(model.iter().copied()));
    }
}
