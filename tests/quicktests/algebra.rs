use keyed_set::{AlgebraConfig, KeyedSet, Strategy};

use quickcheck_macros::quickcheck;

use std::collections::BTreeSet;

const STRATEGIES: [Strategy; 3] = [Strategy::Auto, Strategy::Elementwise, Strategy::Rebuild];

fn config(strategy: Strategy) -> AlgebraConfig {
    AlgebraConfig::default().with_strategy(strategy)
}

/// Pairs keyed by the first field. The second field records which side an element came from.
fn tagged(keys: &[i8], tag: char) -> KeyedSet<(i8, char)> {
    keys.iter().map(|k| (*k, tag)).collect()
}

fn key_set(set: &KeyedSet<(i8, char)>) -> BTreeSet<i8> {
    set.keys().copied().collect()
}

#[quickcheck]
fn union_is_the_same_on_every_path(xs: Vec<i8>, ys: Vec<i8>) -> bool {
    let (a, b) = (tagged(&xs, 'a'), tagged(&ys, 'b'));
    let expected = a.union_with(&b, &config(Strategy::Rebuild));

    STRATEGIES
        .iter()
        .all(|strategy| a.union_with(&b, &config(*strategy)) == expected)
        && expected.is_balanced()
}

#[quickcheck]
fn union_matches_model(xs: Vec<i8>, ys: Vec<i8>) -> bool {
    let (a, b) = (tagged(&xs, 'a'), tagged(&ys, 'b'));
    let model: BTreeSet<i8> = xs.iter().chain(&ys).copied().collect();
    let union = a.union(&b);

    key_set(&union) == model
        && union
            .iter()
            .all(|(k, tag)| *tag == 'a' || !a.contains_key(k))
}

#[quickcheck]
fn union_commutes_on_keys(xs: Vec<i8>, ys: Vec<i8>) -> bool {
    let (a, b) = (tagged(&xs, 'a'), tagged(&ys, 'b'));

    key_set(&a.union(&b)) == key_set(&b.union(&a))
}

#[quickcheck]
fn union_size_is_inclusion_exclusion(xs: Vec<i8>, ys: Vec<i8>) -> bool {
    let a: KeyedSet<i8> = xs.into_iter().collect();
    let b: KeyedSet<i8> = ys.into_iter().collect();

    STRATEGIES.iter().all(|strategy| {
        let config = config(*strategy);
        let union = a.union_with(&b, &config);
        let intersection = a.intersection_with(&b, &config);
        union.len() == a.len() + b.len() - intersection.len()
    })
}

#[quickcheck]
fn intersection_is_the_same_on_every_path(xs: Vec<i8>, ys: Vec<i8>) -> bool {
    let (a, b) = (tagged(&xs, 'a'), tagged(&ys, 'b'));
    let expected = a.intersection_with(&b, &config(Strategy::Rebuild));
    let model: BTreeSet<i8> = key_set(&a).intersection(&key_set(&b)).copied().collect();

    STRATEGIES
        .iter()
        .all(|strategy| a.intersection_with(&b, &config(*strategy)) == expected)
        && key_set(&expected) == model
        && expected.iter().all(|(_, tag)| *tag == 'a')
}

#[quickcheck]
fn difference_of_union_recovers_left_only(xs: Vec<i8>, ys: Vec<i8>) -> bool {
    let a: KeyedSet<i8> = xs.iter().copied().collect();
    let b: KeyedSet<i8> = ys.iter().copied().collect();

    let expected: Vec<i8> = a.iter().copied().filter(|x| !b.contains_key(x)).collect();
    let difference = a.union(&b).difference(&b);

    difference.iter().copied().eq(expected) && difference.is_balanced()
}

#[quickcheck]
fn lopsided_sizes_agree_across_paths(small: Vec<i8>, offset: i8) -> bool {
    // Against a much larger set, short inputs take the fold paths under `Strategy::Auto`.
    let big: KeyedSet<i16> = (-300..300).map(|x| x * 3 + i16::from(offset % 3)).collect();
    let small: KeyedSet<i16> = small.into_iter().map(|x| i16::from(x) * 4).collect();

    let rebuild = config(Strategy::Rebuild);
    big.union(&small) == big.union_with(&small, &rebuild)
        && small.union(&big) == small.union_with(&big, &rebuild)
        && big.intersection(&small) == big.intersection_with(&small, &rebuild)
        && small.intersection(&big) == small.intersection_with(&big, &rebuild)
}

#[quickcheck]
fn filter_keeps_exactly_passing_elements(xs: Vec<i8>, modulus: u8) -> bool {
    let modulus = i8::try_from(modulus % 7 + 1).unwrap_or(1);
    let set: KeyedSet<i8> = xs.into_iter().collect();
    let filtered = set.filter(|x| x % modulus == 0);

    filtered
        .iter()
        .copied()
        .eq(set.iter().copied().filter(|x| x % modulus == 0))
        && filtered.is_balanced()
}
