// The benchmarks aim to only measure times of the operations in their names.
// That's why all use Bencher::iter_batched which enables non-benchmarked
// preparation before running the measured function.
// Map benchmarks run once per implementation kind, so "hash" and "ordered"
// are measured against the same workload.
// The counts of inserted/removed/searched elements are chosen at random from
// constant ranges in an attempt to avoid a single count performing better
// because of specific HW features of computers the code is benchmarked with.

extern crate criterion;
extern crate persistrie;
extern crate rand;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use persistrie::{AnyMap, MapKind, PersistentList};
use rand::seq::SliceRandom;
use rand::Rng;

// ranges of counts for different benchmarks (MINs are inclusive, MAXes exclusive):
const INSERT_COUNT_MIN: usize = 120;
const INSERT_COUNT_MAX: usize = 140;
const INSERT_COUNT_FOR_REMOVE_MIN: usize = 340;
const INSERT_COUNT_FOR_REMOVE_MAX: usize = 360;
const REMOVE_COUNT_MIN: usize = 120;
const REMOVE_COUNT_MAX: usize = 140;
const SEARCH_COUNT_MIN: usize = 120;
const SEARCH_COUNT_MAX: usize = 140;
const LIST_LEN_MIN: usize = 2000;
const LIST_LEN_MAX: usize = 2200;

const KINDS: [&str; 2] = ["hash", "ordered"];

pub fn map_insert(c: &mut Criterion) {
    for name in KINDS {
        let kind: MapKind = name.parse().unwrap();
        c.bench_function(&format!("map_insert_{}", name), |b| {
            b.iter_batched(
                || prepare_insert(kind),
                |(map, list)| insert_vec(map, list),
                BatchSize::SmallInput,
            )
        });
    }
}

pub fn map_remove(c: &mut Criterion) {
    for name in KINDS {
        let kind: MapKind = name.parse().unwrap();
        c.bench_function(&format!("map_remove_{}", name), |b| {
            b.iter_batched(
                || prepare_remove(kind),
                |(map, list)| remove_vec(map, &list),
                BatchSize::SmallInput,
            )
        });
    }
}

pub fn map_search(c: &mut Criterion) {
    for name in KINDS {
        let kind: MapKind = name.parse().unwrap();
        c.bench_function(&format!("map_search_{}", name), |b| {
            b.iter_batched(
                || prepare_search(kind),
                |(map, list)| search_vec(&map, &list),
                BatchSize::SmallInput,
            )
        });
    }
}

pub fn list_push_persistent(c: &mut Criterion) {
    c.bench_function("list_push_persistent", |b| {
        b.iter_batched(
            list_len,
            |len| {
                let mut list = PersistentList::new();
                for i in 0..len {
                    list = list.push(i);
                }
                list
            },
            BatchSize::SmallInput,
        )
    });
}

pub fn list_push_builder(c: &mut Criterion) {
    c.bench_function("list_push_builder", |b| {
        b.iter_batched(
            list_len,
            |len| {
                let mut builder = PersistentList::new().builder();
                for i in 0..len {
                    builder.push(i);
                }
                builder.build()
            },
            BatchSize::SmallInput,
        )
    });
}

pub fn list_insert_middle(c: &mut Criterion) {
    c.bench_function("list_insert_middle", |b| {
        b.iter_batched(
            || {
                let len = list_len();
                let list: PersistentList<usize> = (0..len).collect();
                let at = rand::rng().random_range(0..len);
                (list, at)
            },
            |(list, at)| list.insert(at, usize::MAX),
            BatchSize::SmallInput,
        )
    });
}

pub fn list_get(c: &mut Criterion) {
    c.bench_function("list_get", |b| {
        b.iter_batched(
            || {
                let len = list_len();
                let list: PersistentList<usize> = (0..len).collect();
                (list, random_order(len, len))
            },
            |(list, order)| {
                for i in order {
                    black_box(list.get(i as usize));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(map, map_insert, map_remove, map_search);
criterion_group!(
    list,
    list_push_persistent,
    list_push_builder,
    list_insert_middle,
    list_get
);
criterion_main!(map, list);

// Utility functions:

fn insert_vec(mut map: AnyMap<u32, u64>, list: Vec<(u32, u64)>) -> AnyMap<u32, u64> {
    for (k, v) in list.into_iter() {
        map = map.insert(k, v);
    }
    map
}

fn remove_vec(mut map: AnyMap<u32, u64>, list: &[u32]) -> AnyMap<u32, u64> {
    for i in list.iter() {
        map = map.remove(i);
    }
    map
}

fn search_vec(map: &AnyMap<u32, u64>, list: &[u32]) {
    for i in list.iter() {
        black_box(map.get(i));
    }
}

fn list_len() -> usize {
    rand::rng().random_range(LIST_LEN_MIN..LIST_LEN_MAX)
}

fn prepare_insert(kind: MapKind) -> (AnyMap<u32, u64>, Vec<(u32, u64)>) {
    let mut rng = rand::rng();
    let count = rng.random_range(INSERT_COUNT_MIN..INSERT_COUNT_MAX);
    let mut list = Vec::with_capacity(count);
    for _ in 0..count {
        list.push((
            rng.random_range(0..INSERT_COUNT_MAX << 8) as u32,
            rng.random(),
        ));
    }
    (AnyMap::empty(kind), list)
}

fn prepare_remove(kind: MapKind) -> (AnyMap<u32, u64>, Vec<u32>) {
    let mut rng = rand::rng();
    let insert_count = rng.random_range(INSERT_COUNT_FOR_REMOVE_MIN..INSERT_COUNT_FOR_REMOVE_MAX);
    let remove_count = rng.random_range(REMOVE_COUNT_MIN..REMOVE_COUNT_MAX);
    let mut map = AnyMap::empty(kind);
    for i in random_order(insert_count, insert_count) {
        map = map.insert(i, i as u64);
    }
    (map, random_order(insert_count, remove_count))
}

fn prepare_search(kind: MapKind) -> (AnyMap<u32, u64>, Vec<u32>) {
    let mut rng = rand::rng();
    let insert_count = rng.random_range(INSERT_COUNT_MIN..INSERT_COUNT_MAX);
    let search_count = rng.random_range(SEARCH_COUNT_MIN..SEARCH_COUNT_MAX);
    let mut map = AnyMap::empty(kind);
    for k in 0..insert_count as u32 {
        map = map.insert(k, k as u64);
    }
    // Search a third more keys than were inserted, so some lookups miss.
    let search_limit = (insert_count * 4 / 3) as u32;
    let list = (0..search_count)
        .map(|_| rng.random_range(0..search_limit))
        .collect();
    (map, list)
}

/// Returns a Vec of n elements from the range [0,up_to) in random order without repetition
fn random_order(up_to: usize, n: usize) -> Vec<u32> {
    let mut order: Vec<u32> = (0..up_to as u32).collect();
    order.shuffle(&mut rand::rng());
    order.truncate(n);
    order
}
