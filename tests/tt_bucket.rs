use bitsearch::search::tt::{Bound, Tt};

// With a single bucket every hash lands in the same slots; the key is the
// upper half of the hash.
fn key(k: u64) -> u64 {
    k << 32
}

fn one_bucket() -> Tt {
    let mut tt = Tt::new();
    tt.set_capacity_entries(4);
    assert_eq!(tt.bucket_count(), 1);
    tt
}

#[test]
fn bucket_replacement_prefers_deeper() {
    let mut tt = one_bucket();
    for i in 1..=4u64 {
        tt.store(key(i), i as i32, 0, Bound::Exact, None, 0);
    }
    tt.store(key(100), 10, 0, Bound::Exact, None, 0);
    assert!(tt.peek(key(1)).is_none(), "shallow victim not evicted");
    assert!(tt.peek(key(100)).is_some(), "deeper entry not inserted");
    for i in 2..=4u64 {
        assert!(tt.peek(key(i)).is_some(), "entry {i} evicted");
    }
}

#[test]
fn bucket_same_key_replaced_if_deeper() {
    let mut tt = one_bucket();
    tt.store(key(7), 3, 1, Bound::Exact, None, 0);
    tt.store(key(7), 2, 2, Bound::Lower, None, 0);
    let e = tt.peek(key(7)).unwrap();
    assert_eq!((e.depth, e.score, e.bound), (3, 1, Bound::Exact));

    tt.store(key(7), 5, 3, Bound::Upper, None, 0);
    let e = tt.peek(key(7)).unwrap();
    assert_eq!((e.depth, e.score, e.bound), (5, 3, Bound::Upper));
    assert_eq!(tt.len(), 1, "same position stored twice");
}

#[test]
fn restore_without_move_keeps_previous_move() {
    let mut tt = one_bucket();
    tt.store(key(3), 2, 10, Bound::Lower, Some(0x0123), 0);
    tt.store(key(3), 4, 20, Bound::Upper, None, 0);
    let e = tt.peek(key(3)).unwrap();
    assert_eq!(e.best, Some(0x0123));
    assert_eq!(e.depth, 4);
    assert_eq!(tt.best_move(key(3)), Some(0x0123));
}

#[test]
fn probe_respects_bounds_and_depth() {
    let mut tt = one_bucket();
    tt.store(key(1), 6, 50, Bound::Lower, Some(77), 0);
    // Too shallow for depth 7: move only.
    let p = tt.probe(key(1), 7, 0, 40, 0);
    assert_eq!((p.score, p.best), (None, Some(77)));
    // Lower bound 50 fails high against beta 40.
    assert_eq!(tt.probe(key(1), 6, 0, 40, 0).score, Some(50));
    // but says nothing when beta is above it.
    assert_eq!(tt.probe(key(1), 6, 0, 60, 0).score, None);

    tt.store(key(2), 6, -30, Bound::Upper, None, 0);
    assert_eq!(tt.probe(key(2), 4, -20, 10, 0).score, Some(-30));
    assert_eq!(tt.probe(key(2), 4, -40, 10, 0).score, None);
}

#[test]
fn mate_scores_are_ply_relative() {
    use bitsearch::search::tt::MATE;
    let mut tt = one_bucket();
    // Mate found 5 plies from the root, stored at ply 3.
    tt.store(key(9), 8, MATE - 5, Bound::Exact, None, 3);
    assert_eq!(tt.peek(key(9)).unwrap().score, MATE - 2);
    assert_eq!(tt.probe(key(9), 1, -MATE, MATE, 1).score, Some(MATE - 3));
    tt.store(key(10), 8, -(MATE - 6), Bound::Exact, None, 2);
    assert_eq!(tt.probe(key(10), 1, -MATE, MATE, 4).score, Some(-(MATE - 8)));
}
