use keyed_set::KeyedSet;

use quickcheck_macros::quickcheck;

use std::collections::HashSet;

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let set: KeyedSet<i8> = xs.iter().copied().collect();

    xs.iter().all(|x| set.get(x) == Some(x))
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let set: KeyedSet<i8> = xs.iter().copied().collect();
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| set.get(x).is_none())
}

#[quickcheck]
fn size_counts_distinct_keys(xs: Vec<i8>) -> bool {
    let set: KeyedSet<i8> = xs.iter().copied().collect();
    let distinct: HashSet<_> = xs.iter().collect();

    set.len() == distinct.len() && set.is_balanced()
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut set: KeyedSet<i8> = xs.iter().copied().collect();
    for delete in &deletes {
        set = set.delete(delete);
    }

    let mut still_present = xs;
    for delete in &deletes {
        // We may have inserted the same value multiple times - delete each one.
        while let Some(pos) = still_present.iter().position(|x| x == delete) {
            still_present.swap_remove(pos);
        }
    }

    deletes.iter().all(|x| set.get(x).is_none())
        && still_present.iter().all(|x| set.get(x).is_some())
        && set.is_balanced()
        && set.is_ordered()
}

#[quickcheck]
fn delete_present_key_shrinks_by_one(xs: Vec<i8>) -> bool {
    let set: KeyedSet<i8> = xs.iter().copied().collect();
    let len = set.len();

    xs.iter().all(|x| {
        let (smaller, removed) = set.delete_by_key(x);
        removed && !smaller.contains_key(x) && smaller.len() == len - 1 && smaller.is_balanced()
    })
}

#[quickcheck]
fn delete_absent_key_returns_original(xs: Vec<i8>, key: i8) -> bool {
    let set: KeyedSet<i8> = xs.iter().copied().filter(|x| *x != key).collect();
    let (same, removed) = set.delete_by_key(&key);

    !removed && same.ptr_eq(&set)
}

#[quickcheck]
fn iteration_is_strictly_ascending(xs: Vec<i16>) -> bool {
    let set: KeyedSet<i16> = xs.into_iter().collect();
    let ascending: Vec<_> = set.iter().collect();

    ascending.windows(2).all(|pair| pair[0] < pair[1])
}

#[quickcheck]
fn reverse_iteration_mirrors_iteration(xs: Vec<i16>) -> bool {
    let set: KeyedSet<i16> = xs.into_iter().collect();
    let mut forward: Vec<_> = set.iter().collect();
    forward.reverse();

    set.rev_iter().eq(forward)
}

#[quickcheck]
fn delete_ends(xs: Vec<i8>) -> bool {
    let set: KeyedSet<i8> = xs.iter().copied().collect();

    let without_first = set.delete_first();
    let without_last = set.delete_last();

    without_first.iter().eq(set.iter().skip(1))
        && without_last.rev_iter().eq(set.rev_iter().skip(1))
        && without_first.is_balanced()
        && without_last.is_balanced()
}

#[quickcheck]
fn sorted_round_trip(xs: Vec<i8>) -> bool {
    let set: KeyedSet<i8> = xs.into_iter().collect();

    match KeyedSet::from_sorted(set.to_sorted_vec()) {
        Ok(rebuilt) => rebuilt == set && rebuilt.is_balanced(),
        Err(_) => false,
    }
}
