// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for relayout discovery and refresh over synthetic layout trees.

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use kurbo::Size;
use understory_relayout::{LayoutTree, LocalBox, NodeId, RelayoutOrderer, StackLayout};

/// Full tree of stacks with `fanout` children per container and leaves at `depth`.
fn build(fanout: usize, depth: usize) -> (LayoutTree, NodeId, usize) {
    let mut tree = LayoutTree::new();
    let root = tree
        .insert(None, LocalBox::stack(StackLayout::vertical()))
        .expect("fresh tree");
    let mut level = vec![root];
    for d in 1..=depth {
        let mut next = Vec::with_capacity(level.len() * fanout);
        for &parent in &level {
            for i in 0..fanout {
                let local = if d == depth {
                    LocalBox::leaf(Size::new(10.0 + i as f64, 8.0))
                } else if d % 2 == 0 {
                    LocalBox::stack(StackLayout::vertical().with_spacing(2.0))
                } else {
                    LocalBox::stack(StackLayout::horizontal().with_spacing(2.0))
                };
                next.push(tree.insert(Some(parent), local).expect("live parent"));
            }
        }
        level = next;
    }
    let nodes = tree.len();
    (tree, root, nodes)
}

fn bench_discover(c: &mut Criterion) {
    let mut group = c.benchmark_group("relayout/discover");

    for (fanout, depth) in [(4usize, 4usize), (8, 3), (2, 10), (32, 2)] {
        let (tree, root, nodes) = build(fanout, depth);
        group.throughput(Throughput::Elements(nodes as u64));
        let id = BenchmarkId::from_parameter(format!("{fanout}x{depth}"));

        group.bench_with_input(id, &tree, |b, tree| {
            let mut orderer = RelayoutOrderer::new();
            b.iter(|| black_box(orderer.discover(tree, root)));
        });
    }

    group.finish();
}

fn bench_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("relayout/refresh");

    for (fanout, depth) in [(4usize, 4usize), (8, 3), (2, 10)] {
        let (tree, root, nodes) = build(fanout, depth);
        group.throughput(Throughput::Elements(nodes as u64));
        let label = format!("{fanout}x{depth}");

        // Cached structure: only the reverse rebuild pass.
        group.bench_with_input(BenchmarkId::new("cached", &label), &tree, |b, tree| {
            let mut tree = tree.clone();
            let mut orderer = RelayoutOrderer::new();
            orderer.discover(&tree, root);
            b.iter(|| black_box(orderer.refresh(&mut tree, Some(root))));
        });

        // Cold orderer: discovery plus rebuild pass.
        group.bench_with_input(BenchmarkId::new("cold", &label), &tree, |b, tree| {
            b.iter_batched(
                || (tree.clone(), RelayoutOrderer::new()),
                |(mut tree, mut orderer)| {
                    black_box(orderer.refresh(&mut tree, Some(root)));
                    black_box(tree);
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_discover, bench_refresh);
criterion_main!(benches);
