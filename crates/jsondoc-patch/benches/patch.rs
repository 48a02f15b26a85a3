use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use jsondoc::{ArrayBuilder, ObjectBuilder, Value};
use jsondoc_patch::{merge, Patch, Pointer};

/// A document with `width` members per object, nested `depth` levels.
fn nested_document(depth: usize, width: u64) -> Value {
    let mut current = ObjectBuilder::new().insert("leaf", true).build();
    for _ in 0..depth {
        let mut object = ObjectBuilder::new().insert("child", current.clone());
        for index in 0..width {
            object = object.insert(
                format!("sibling{index}"),
                ArrayBuilder::new().push(index).push("payload").build(),
            );
        }
        current = object.build();
    }
    current
}

fn deep_pointer(depth: usize) -> Pointer {
    let mut pointer = Pointer::root();
    for _ in 0..depth {
        pointer = pointer.join("child");
    }
    pointer.join("leaf")
}

fn bench_pointer(c: &mut Criterion) {
    let mut group = c.benchmark_group("pointer");
    for depth in [4, 16, 64] {
        let document = nested_document(depth, 8);
        let pointer = deep_pointer(depth);
        group.bench_with_input(
            BenchmarkId::new("resolve", depth),
            &(&document, &pointer),
            |b, (document, pointer)| {
                b.iter(|| pointer.resolve(document).expect("leaf exists"));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("replace", depth),
            &(&document, &pointer),
            |b, (document, pointer)| {
                b.iter(|| {
                    pointer
                        .replace(document, Value::from(false))
                        .expect("leaf exists")
                });
            },
        );
    }
    group.finish();
}

fn bench_patch(c: &mut Criterion) {
    let document = nested_document(16, 8);
    let patch: Patch = r#"[
        {"op": "test", "path": "/sibling0/0", "value": 0},
        {"op": "add", "path": "/sibling0/-", "value": "appended"},
        {"op": "replace", "path": "/child/sibling1/1", "value": "swapped"},
        {"op": "copy", "from": "/child/child", "path": "/snapshot"},
        {"op": "remove", "path": "/snapshot"}
    ]"#
    .parse()
    .expect("valid patch");
    c.bench_function("patch/apply", |b| {
        b.iter(|| patch.apply(&document).expect("valid patch"));
    });

    let target = patch.apply(&document).expect("valid patch");
    c.bench_function("patch/diff", |b| {
        b.iter(|| Patch::diff(&document, &target));
    });
}

fn bench_merge(c: &mut Criterion) {
    let target = nested_document(8, 8);
    let patch: Value = r#"{"child": {"sibling0": null, "child": {"leaf": false}}}"#
        .parse()
        .expect("valid JSON");
    c.bench_function("merge/apply", |b| {
        b.iter(|| merge(&target, &patch));
    });
}

criterion_group!(benches, bench_pointer, bench_patch, bench_merge);
criterion_main!(benches);
