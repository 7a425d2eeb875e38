use bucket_deque::{deque, Deque, Error, Position, BUCKET_SIZE};

use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn simple() {
    let mut deque = deque![0, 1, 2];
    assert_eq!(deque[0], 0);
    assert_eq!(deque[1], 1);
    assert_eq!(deque[2], 2);

    for x in 3..1000 {
        deque.push_back(x);
        assert_eq!(deque[x], x);
        assert_eq!(deque.len(), x + 1);
    }

    for i in 0..1000 {
        assert_eq!(deque[i], i);
    }

    for (i, &x) in deque.iter().enumerate() {
        assert_eq!(i, x);
    }

    for (i, x) in deque.into_iter().enumerate() {
        assert_eq!(i, x);
    }
}

#[test]
fn simple_boxed() {
    let mut deque = deque![Box::new(0), Box::new(1), Box::new(2)];
    assert_eq!(deque[0], Box::new(0));
    assert_eq!(deque[1], Box::new(1));
    assert_eq!(deque[2], Box::new(2));

    for x in 3..1000 {
        deque.push_back(Box::new(x));
        assert_eq!(*deque[x], x);
    }

    for (i, x) in deque.iter().enumerate() {
        assert_eq!(i, **x);
    }

    for (i, x) in deque.into_iter().enumerate() {
        assert_eq!(i, *x);
    }
}

#[test]
fn stack_at_the_front() {
    let mut deque = Deque::new();
    for i in 0..40 {
        deque.push_front(i);
    }

    for i in (0..40).rev() {
        assert_eq!(deque.pop_front(), Some(i));
    }
    assert_eq!(deque.pop_front(), None);
}

#[test]
fn queue_orders() {
    // Back to front: first in, first out.
    let mut deque = Deque::new();
    for i in 0..40 {
        deque.push_back(i);
    }
    for i in 0..40 {
        assert_eq!(deque.pop_front(), Some(i));
    }
    assert!(deque.is_empty());

    // Front to back: the same order from the other end.
    for i in 0..40 {
        deque.push_front(i);
    }
    for i in 0..40 {
        assert_eq!(deque.pop_back(), Some(i));
    }
    assert_eq!(deque.pop_back(), None);
}

#[test]
fn distance_counts_increments() {
    let mut deque = Deque::new();
    for i in 0..13 {
        deque.push_front(i);
        deque.push_back(i);
    }

    let begin = deque.begin();
    let end = deque.end();
    assert_eq!(end - begin, deque.len() as isize);

    let mut a = begin;
    let mut increments = 0;
    while a != end {
        assert_eq!(a - begin, increments);
        assert_eq!(end - a, deque.len() as isize - increments);
        assert!(a < end);

        a.increment();
        increments += 1;
    }
    assert_eq!(increments, deque.len() as isize);

    // Jumping agrees with stepping.
    for n in 0..deque.len() {
        let position = begin + n as isize;
        assert_eq!(deque[position], deque[n]);
        assert_eq!(position - begin, n as isize);
        assert_eq!(end - (deque.len() - n) as isize, position);
    }
}

#[test]
fn copy_is_independent() {
    let mut original = deque![1, 2, 3, 4, 5, 6, 7];
    let mut copy = original.clone();
    assert_eq!(copy, original);

    copy.push_front(0);
    copy[3] = 30;
    original.pop_back();

    assert_eq!(original, [1, 2, 3, 4, 5, 6]);
    assert_eq!(copy, [0, 1, 2, 30, 4, 5, 6, 7]);
}

#[test]
fn clone_from_replaces_contents() {
    let source = deque![String::from("a"), String::from("b")];
    let mut destination = deque![String::from("x"); 20];

    destination.clone_from(&source);
    assert_eq!(destination, source);
    assert_eq!(destination.bucket_count(), source.bucket_count());
}

#[test]
fn move_leaves_source_empty() {
    let mut source = deque![1, 2, 3];
    let destination = source.take();

    assert_eq!(destination, [1, 2, 3]);
    assert!(source.is_empty());
    assert_eq!(source.bucket_count(), 0);

    // The source is still usable.
    source.push_back(4);
    assert_eq!(source, [4]);
}

#[test]
fn move_assignment() {
    let mut destination = deque![9; 11];
    let mut source: Deque<i32> = (0..6).collect();

    destination.take_from(&mut source);
    assert_eq!(destination, [0, 1, 2, 3, 4, 5]);
    assert!(source.is_empty());
}

#[test]
fn insert_then_erase_restores() {
    let original: Deque<usize> = (0..17).collect();

    for index in 1..original.len() {
        let mut deque = original.clone();
        let position = deque.position(index).unwrap();

        let inserted = deque.insert(position, 100);
        assert_eq!(deque.len(), original.len() + 1);
        assert_eq!(deque[index], 100);
        assert_eq!(deque[index + 1], original[index]);

        assert_eq!(deque.erase(inserted), 100);
        assert_eq!(deque, original);
    }
}

#[test]
fn insert_and_remove_by_index() {
    let mut deque: Deque<usize> = (0..9).collect();
    deque.insert_at(0, 100);
    deque.insert_at(5, 200);
    deque.insert_at(deque.len(), 300);
    assert_eq!(deque, [100, 0, 1, 2, 3, 200, 4, 5, 6, 7, 8, 300]);

    assert_eq!(deque.remove(5), Some(200));
    assert_eq!(deque.remove(0), Some(100));
    assert_eq!(deque.remove(deque.len() - 1), Some(300));
    assert_eq!(deque.remove(deque.len()), None);
    assert_eq!(deque, [0, 1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn grow_then_drain() {
    let mut deque = Deque::new();
    for i in 0..16 {
        deque.push_back(i);
    }
    // The initial table, then one growth to 2 * 3 + 1.
    assert_eq!(deque.bucket_count(), 7);

    for i in 0..16 {
        assert_eq!(deque.pop_front(), Some(i));
    }
    assert!(deque.is_empty());
    assert_eq!(deque.pop_front(), None);
    assert_eq!(deque.bucket_count(), 7);
}

#[test]
fn interleaved_ends() {
    let mut deque = Deque::new();
    for i in 0..8 {
        deque.push_back(i);
        deque.push_front(100 + i);
    }

    assert_eq!(
        deque,
        [107, 106, 105, 104, 103, 102, 101, 100, 0, 1, 2, 3, 4, 5, 6, 7]
    );
}

#[test]
fn checked_access() {
    let mut deque: Deque<i32> = (0..12).collect();

    for i in 0..deque.len() {
        assert_eq!(deque.at(i), Ok(&deque[i]));
    }

    assert_eq!(deque.at(12), Err(Error::IndexOutOfRange { index: 12, len: 12 }));
    assert_eq!(deque.at_mut(99), Err(Error::IndexOutOfRange { index: 99, len: 12 }));

    *deque.at_mut(3).unwrap() = -3;
    assert_eq!(deque[3], -3);
}

#[test]
fn growth_only_past_slack() {
    let mut deque = Deque::new();
    for i in 1..=6 {
        deque.push_back(i);
    }
    assert_eq!(deque, [1, 2, 3, 4, 5, 6]);
    assert_eq!(deque.bucket_count(), 3);

    // The middle bucket and the one after it hold ten elements.
    for i in 7..=10 {
        deque.push_back(i);
    }
    assert_eq!(deque.bucket_count(), 3);

    deque.push_back(11);
    assert_eq!(deque.bucket_count(), 7);
    assert_eq!(deque, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
}

#[test]
fn reverse_traversal() {
    let mut deque: Deque<usize> = (0..23).collect();

    let reversed: Vec<_> = deque.iter().rev().copied().collect();
    assert_eq!(reversed, (0..23).rev().collect::<Vec<_>>());

    for (i, x) in deque.iter_mut().rev().enumerate() {
        *x += i;
    }
    assert!(deque.iter().all(|&x| x == 22));
}

#[test]
fn range_between_positions() {
    let deque: Deque<usize> = (0..20).collect();
    let start = deque.begin() + 3;
    let end = deque.end() - 4;

    let values: Vec<_> = deque.range(start, end).copied().collect();
    assert_eq!(values, (3..16).collect::<Vec<_>>());
    assert_eq!(deque.range(start, start).count(), 0);
}

#[test]
#[should_panic]
fn range_out_of_order() {
    let deque: Deque<usize> = (0..20).collect();
    let _ = deque.range(deque.end(), deque.begin());
}

#[test]
fn stale_positions_are_checked() {
    let mut deque = deque![1, 2, 3];
    let last = deque.end() - 1;
    assert_eq!(deque.get_at(last), Some(&3));

    deque.pop_back();
    assert_eq!(deque.get_at(last), None);

    deque.clear();
    assert_eq!(deque.get_at(deque.begin()), None);
    assert_eq!(deque.begin(), Position::default());
}

#[test]
fn sized_constructors() {
    let zeros: Deque<u64> = Deque::with_len(12);
    assert_eq!(zeros.len(), 12);
    assert_eq!(zeros.bucket_count(), 12usize.div_ceil(BUCKET_SIZE));
    assert!(zeros.iter().all(|&x| x == 0));

    let filled = Deque::from_elem(String::from("ab"), 7);
    assert_eq!(filled.len(), 7);
    assert!(filled.iter().all(|x| x == "ab"));

    let empty: Deque<u64> = Deque::with_len(0);
    assert!(empty.is_empty());
    assert_eq!(empty.bucket_count(), 0);
}

#[test]
fn packed_deque_grows_at_the_front() {
    let mut deque = deque![1, 2, 3, 4, 5];
    assert_eq!(deque.bucket_count(), 1);

    deque.push_front(0);
    assert_eq!(deque.bucket_count(), 3);
    assert_eq!(deque, [0, 1, 2, 3, 4, 5]);

    deque.push_back(6);
    assert_eq!(deque, [0, 1, 2, 3, 4, 5, 6]);
}

#[test]
fn zero_sized() {
    let mut deque = Deque::new();
    for _ in 0..100 {
        deque.push_back(());
        deque.push_front(());
    }
    assert_eq!(deque.len(), 200);
    assert_eq!(deque.iter().count(), 200);

    while deque.pop_back().is_some() {}
    assert!(deque.is_empty());
}

#[test]
fn clear() {
    struct T<'a>(&'a AtomicUsize);
    impl Drop for T<'_> {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    let drops = AtomicUsize::new(0);

    let mut deque = Deque::new();
    deque.push_back(T(&drops));
    deque.push_back(T(&drops));

    let first_ptr: *const _ = deque.front().unwrap();

    deque.clear();
    assert_eq!(deque.len(), 0);
    assert_eq!(deque.iter().count(), 0);
    assert_eq!(drops.swap(0, Ordering::Relaxed), 2);

    deque.clear();
    assert_eq!(deque.len(), 0);
    assert_eq!(drops.load(Ordering::Relaxed), 0);

    // An emptied deque starts over in the middle bucket.
    deque.push_back(T(&drops));
    let ptr: *const _ = deque.front().unwrap();
    assert_eq!(ptr, first_ptr);

    drop(deque);
    assert_eq!(drops.load(Ordering::Relaxed), 1);
}

#[test]
fn into_iter_drops_the_rest() {
    struct T<'a>(&'a AtomicUsize);
    impl Drop for T<'_> {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    let drops = AtomicUsize::new(0);

    let mut deque = Deque::new();
    for _ in 0..30 {
        deque.push_front(T(&drops));
    }

    let mut iter = deque.into_iter();
    assert_eq!(iter.len(), 30);
    drop(iter.next());
    drop(iter.next_back());
    assert_eq!(iter.len(), 28);
    assert_eq!(drops.load(Ordering::Relaxed), 2);

    drop(iter);
    assert_eq!(drops.load(Ordering::Relaxed), 30);
}

#[test]
fn fused_iterator() {
    let deque = deque![0, 1, 2];
    let mut iter = deque.iter();
    assert_eq!(iter.by_ref().collect::<Vec<_>>(), [&0, &1, &2]);
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next_back(), None);
}
