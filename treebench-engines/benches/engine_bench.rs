use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use treebench_core::{generate, GENERIC_VALUE_LEN};
use treebench_engines::{CommitmentTree, MemStore, VersionedTree};

fn bench_commitment_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("commitment_commit");

    for size in [100, 1000, 10000].iter() {
        let pairs = generate(&mut StdRng::seed_from_u64(1), *size, GENERIC_VALUE_LEN);

        group.bench_with_input(BenchmarkId::from_parameter(size), &pairs, |b, pairs| {
            b.iter_batched(
                || {
                    let mut tree = CommitmentTree::new();
                    for p in pairs {
                        tree.insert(p.key, p.value.clone()).unwrap();
                    }
                    tree
                },
                |mut tree| black_box(tree.commit()),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_versioned_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("versioned_save");

    for size in [100, 1000, 10000].iter() {
        let pairs = generate(&mut StdRng::seed_from_u64(1), *size, GENERIC_VALUE_LEN);

        group.bench_with_input(BenchmarkId::from_parameter(size), &pairs, |b, pairs| {
            b.iter_batched(
                || {
                    let mut tree = VersionedTree::new(MemStore::new());
                    for p in pairs {
                        tree.set(p.key, p.value.clone()).unwrap();
                    }
                    tree
                },
                |mut tree| black_box(tree.save_version().unwrap()),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_recommit_clean(c: &mut Criterion) {
    let pairs = generate(&mut StdRng::seed_from_u64(2), 1000, GENERIC_VALUE_LEN);
    let mut tree = CommitmentTree::new();
    for p in &pairs {
        tree.insert(p.key, p.value.clone()).unwrap();
    }
    tree.commit();

    c.bench_function("commitment_recommit_clean", |b| {
        b.iter(|| black_box(tree.commit()));
    });
}

criterion_group!(benches, bench_commitment_commit, bench_versioned_save, bench_recommit_clean);
criterion_main!(benches);
