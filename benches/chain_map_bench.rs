use chain_hashmap::ChainHashMap;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_insert(c: &mut Criterion) {
    // Fixed bucket count: chains grow as entries accumulate, so insert cost
    // rises with population. Two bucket counts show the slope.
    for buckets in [13usize, 1024] {
        c.bench_function(&format!("chain_map_insert_10k_b{buckets}"), |b| {
            b.iter_batched(
                || ChainHashMap::<String, u64>::with_bucket_count(buckets),
                |mut m| {
                    for (i, x) in lcg(1).take(10_000).enumerate() {
                        m.insert(key(x), i as u64);
                    }
                    black_box(m)
                },
                BatchSize::SmallInput,
            )
        });
    }
}

fn bench_find_hit(c: &mut Criterion) {
    c.bench_function("chain_map_find_hit", |b| {
        let mut m = ChainHashMap::with_bucket_count(1024);
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().enumerate() {
            m.insert(k.clone(), i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k.as_str()).unwrap());
        })
    });
}

fn bench_find_miss(c: &mut Criterion) {
    c.bench_function("chain_map_find_miss", |b| {
        let mut m = ChainHashMap::with_bucket_count(1024);
        for (i, x) in lcg(11).take(10_000).enumerate() {
            m.insert(key(x), i as u64);
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // keys unlikely to be in the map
            let k = key(miss.next().unwrap());
            black_box(m.find(k.as_str()));
        })
    });
}

fn bench_traversal(c: &mut Criterion) {
    let mut m = ChainHashMap::with_bucket_count(256);
    for (i, x) in lcg(23).take(10_000).enumerate() {
        m.insert(key(x), i as u64);
    }
    c.bench_function("chain_map_iter_10k", |b| {
        b.iter(|| {
            let mut acc = 0u64;
            for (_, v) in m.iter() {
                acc = acc.wrapping_add(*v);
            }
            black_box(acc)
        })
    });
    c.bench_function("chain_map_iter_rev_10k", |b| {
        b.iter(|| {
            let mut acc = 0u64;
            for (_, v) in m.iter().rev() {
                acc = acc.wrapping_add(*v);
            }
            black_box(acc)
        })
    });
}

fn bench_erase_at_sweep(c: &mut Criterion) {
    c.bench_function("chain_map_erase_at_sweep_1k", |b| {
        b.iter_batched(
            || {
                let mut m = ChainHashMap::with_bucket_count(64);
                for (i, x) in lcg(31).take(1_000).enumerate() {
                    m.insert(key(x), i as u64);
                }
                m
            },
            |mut m| {
                let mut c = m.cursor_front().unwrap();
                while c.is_valid() {
                    m.erase_at(&mut c);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_millis(300))
        .measurement_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_find_hit, bench_find_miss, bench_traversal, bench_erase_at_sweep
}
criterion_main!(benches);
