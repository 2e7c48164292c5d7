//! Divan rendition of the scenario catalog.
//!
//! `AllocProfiler` reports allocations and bytes per iteration next to each
//! timing. Bulk loads take the empty tree as an untimed input, so only inserts
//! and the commit are measured. Steady-state edits build their tree before the
//! loop and keep editing it across iterations.

use divan::{black_box, AllocProfiler, Bencher};
use rand::Rng;
use treebench_core::{
    edit_payload, fanout_pairs, generate, order, random_keys, OrderedWorkloads, OrderingMode, RunRng,
    Workload, FULL_FANOUT, GENERIC_VALUE_LEN, INITIAL_EDIT_VALUE_LEN,
};
use treebench_harness::scenario::{LEAF_COUNTS, MODIFY_EDIT_BATCH, MODIFY_TREE_SIZE};
use treebench_harness::{CommitmentAdapter, TreeAdapter, VersionedAdapter};

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

fn load<A: TreeAdapter>(adapter: &A, tree: &mut A::Tree, pairs: &Workload, ordered: bool) {
    for p in pairs {
        let result = if ordered {
            adapter.insert_ordered(tree, p.key, &p.value)
        } else {
            adapter.insert(tree, p.key, &p.value)
        };
        result.unwrap();
    }
    black_box(adapter.commit(tree).unwrap());
}

fn bulk_load<A: TreeAdapter + Default>(bencher: Bencher, size: usize, ordering: OrderingMode) {
    let adapter = A::default();
    let mut rng = RunRng::new(None);
    let workloads = OrderedWorkloads::derive(generate(rng.entropy(), size, GENERIC_VALUE_LEN));
    let workload = workloads.get(ordering);
    let ordered = ordering == OrderingMode::SortedByKey;

    bencher
        .with_inputs(|| adapter.create_empty())
        .bench_local_refs(|tree| load(&adapter, tree, workload, ordered));
}

#[divan::bench(types = [CommitmentAdapter, VersionedAdapter], args = LEAF_COUNTS)]
fn insert<A: TreeAdapter + Default>(bencher: Bencher, size: usize) {
    bulk_load::<A>(bencher, size, OrderingMode::Random);
}

#[divan::bench(name = "insertOrdered", types = [CommitmentAdapter, VersionedAdapter], args = LEAF_COUNTS)]
fn insert_ordered<A: TreeAdapter + Default>(bencher: Bencher, size: usize) {
    bulk_load::<A>(bencher, size, OrderingMode::SortedByKey);
}

#[divan::bench(types = [CommitmentAdapter, VersionedAdapter])]
fn fullnode<A: TreeAdapter + Default>(bencher: Bencher) {
    let adapter = A::default();
    let workload = order(fanout_pairs(FULL_FANOUT), OrderingMode::Random);

    bencher
        .with_inputs(|| adapter.create_empty())
        .bench_local_refs(|tree| load(&adapter, tree, &workload, false));
}

#[divan::bench(types = [CommitmentAdapter, VersionedAdapter], sample_count = 10, sample_size = 1)]
fn modify<A: TreeAdapter + Default>(bencher: Bencher) {
    let adapter = A::default();
    let mut rng = RunRng::new(None);
    let keys = random_keys(rng.entropy(), MODIFY_TREE_SIZE);
    let mut tree = adapter.create_empty();
    for key in &keys {
        adapter.insert(&mut tree, *key, &[0u8; INITIAL_EDIT_VALUE_LEN]).unwrap();
    }
    adapter.commit(&mut tree).unwrap();

    let mut iteration = 0u32;
    bencher.bench_local(|| {
        let payload = edit_payload(iteration);
        iteration = iteration.wrapping_add(1);
        for _ in 0..MODIFY_EDIT_BATCH {
            let key = keys[rng.picker().gen_range(0..keys.len())];
            adapter.insert(&mut tree, key, &payload).unwrap();
        }
        black_box(adapter.commit(&mut tree).unwrap());
    });
}
