use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use evograph_core::graph::{ancestor_chain, common_ancestor, project_graph};
use evograph_core::{AnimalId, Forest, NewAnimal};

const DEPTHS: [usize; 3] = [8, 64, 512];

/// A single spine of `depth` taxa with two leaves hanging off the bottom
/// and one off the root, so LCA queries walk the full height.
fn spine(depth: usize) -> (Forest, AnimalId, AnimalId, AnimalId) {
    let mut forest = Forest::new();
    let root = forest
        .insert(NewAnimal::named("taxon-0"), None)
        .map(|n| n.id)
        .unwrap_or_else(|err| panic!("seed root: {err}"));
    let mut parent = root;
    for level in 1..depth {
        parent = forest
            .insert(NewAnimal::named(format!("taxon-{level}")), Some(parent))
            .map(|n| n.id)
            .unwrap_or_else(|err| panic!("seed taxon: {err}"));
    }
    let leaf = |forest: &mut Forest, name: &str, under| {
        forest
            .insert(
                NewAnimal::named(name).with_scientific_name(format!("Genus {name}")),
                Some(under),
            )
            .map(|n| n.id)
            .unwrap_or_else(|err| panic!("seed leaf: {err}"))
    };
    let deep_a = leaf(&mut forest, "deep-a", parent);
    let deep_b = leaf(&mut forest, "deep-b", parent);
    let shallow = leaf(&mut forest, "shallow", root);
    (forest, deep_a, deep_b, shallow)
}

/// `width` leaves under a single root.
fn wide(width: usize) -> Forest {
    let mut forest = Forest::new();
    let Ok(root) = forest.insert(NewAnimal::named("root"), None) else {
        panic!("seed root");
    };
    for i in 0..width {
        let new = NewAnimal::named(format!("leaf-{i}")).with_scientific_name(format!("Genus s{i}"));
        if forest.insert(new, Some(root.id)).is_err() {
            panic!("seed leaf {i}");
        }
    }
    forest
}

fn bench_chain_and_lca(c: &mut Criterion) {
    let mut group = c.benchmark_group("lca.depth");

    for depth in DEPTHS {
        let (forest, deep_a, deep_b, shallow) = spine(depth);
        group.throughput(Throughput::Elements(depth as u64));

        group.bench_with_input(BenchmarkId::new("chain", depth), &forest, |b, forest| {
            b.iter(|| black_box(ancestor_chain(forest, deep_a)))
        });

        group.bench_with_input(BenchmarkId::new("siblings", depth), &forest, |b, forest| {
            b.iter(|| black_box(common_ancestor(forest, deep_a, deep_b)))
        });

        group.bench_with_input(BenchmarkId::new("deep_vs_shallow", depth), &forest, |b, forest| {
            b.iter(|| black_box(common_ancestor(forest, deep_a, shallow)))
        });
    }

    group.finish();
}

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection.width");

    for width in [100_usize, 1_000, 10_000] {
        let forest = wide(width);
        group.throughput(Throughput::Elements(width as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &forest, |b, forest| {
            b.iter(|| black_box(project_graph(forest.iter())))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_chain_and_lca, bench_projection);
criterion_main!(benches);
