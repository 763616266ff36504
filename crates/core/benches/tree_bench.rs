//! Tree normalization and merge benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gallery_core::{merge_fragment, Image, Node};

/// Build a tree with `folders` top-level folders, each with nested subfolders
fn generate_tree(folders: usize, images_per_folder: usize, salt: &str) -> Node {
    let mut root = Node::root();
    for f in (0..folders).rev() {
        for sub in 0..4 {
            let node = root.get_or_create_node(&format!("Folder{f}/Sub{sub}"));
            for i in (0..images_per_folder).rev() {
                node.add_image(Image::uploaded(format!("IMG_{salt}_{i:04}.jpg"), "2024-01-01"));
            }
        }
    }
    root
}

fn bench_normalize(c: &mut Criterion) {
    let small = generate_tree(10, 10, "a");
    let large = generate_tree(100, 25, "a");

    c.bench_function("normalize_small", |b| {
        b.iter(|| {
            let mut tree = small.clone();
            tree.normalize();
            black_box(tree)
        });
    });

    c.bench_function("normalize_large", |b| {
        b.iter(|| {
            let mut tree = large.clone();
            tree.normalize();
            black_box(tree)
        });
    });
}

fn bench_merge(c: &mut Criterion) {
    let existing = generate_tree(100, 25, "a");
    let overlapping = generate_tree(100, 25, "a");
    let disjoint = generate_tree(100, 25, "b");

    c.bench_function("merge_overlapping", |b| {
        b.iter(|| black_box(merge_fragment(Some(existing.clone()), overlapping.clone())));
    });

    c.bench_function("merge_disjoint", |b| {
        b.iter(|| black_box(merge_fragment(Some(existing.clone()), disjoint.clone())));
    });
}

criterion_group!(benches, bench_normalize, bench_merge);
criterion_main!(benches);
