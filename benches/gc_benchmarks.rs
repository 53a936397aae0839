use criterion::{black_box, criterion_group, criterion_main, Criterion};
use minivm::Vm;

fn bench_scalar_churn(c: &mut Criterion) {
    // Allocate-and-drop: every object is garbage by the next
    // threshold crossing, so this exercises the sweep and the
    // free-list reuse path.
    c.bench_function("scalar churn 10k", |b| {
        b.iter(|| {
            let mut vm = Vm::new();
            for i in 0..10_000 {
                vm.new_scalar(i).unwrap();
                vm.pop().unwrap();
            }
            black_box(vm.live_count())
        })
    });
}

fn bench_rooted_survivors(c: &mut Criterion) {
    // Everything stays rooted, so collections mark the full stack and
    // sweep nothing.
    c.bench_function("collect 100 rooted", |b| {
        b.iter(|| {
            let mut vm = Vm::with_config(120, 4);
            for i in 0..100 {
                vm.new_scalar(i).unwrap();
            }
            black_box(vm.collect().remaining)
        })
    });
}

fn bench_deep_chain_mark(c: &mut Criterion) {
    // A single root holding a 1000-pair chain; stresses the mark
    // work-list rather than the sweep.
    c.bench_function("mark deep chain 1k", |b| {
        b.iter(|| {
            let mut vm = Vm::with_config(4096, 4096);
            vm.new_scalar(0).unwrap();
            for i in 0..1_000 {
                vm.new_scalar(i).unwrap();
                vm.new_pair().unwrap();
            }
            black_box(vm.collect().remaining)
        })
    });
}

fn bench_cyclic_graph_collect(c: &mut Criterion) {
    // Mutually referencing pairs, unrooted before the collection.
    c.bench_function("collect 500 cyclic pairs", |b| {
        b.iter(|| {
            let mut vm = Vm::with_config(4096, 4096);
            for i in 0..500 {
                vm.new_scalar(i).unwrap();
                vm.new_scalar(i).unwrap();
                let p1 = vm.new_pair().unwrap();
                vm.new_scalar(i).unwrap();
                vm.new_scalar(i).unwrap();
                let p2 = vm.new_pair().unwrap();
                vm.set_second(p1, p2).unwrap();
                vm.set_second(p2, p1).unwrap();
                vm.pop().unwrap();
                vm.pop().unwrap();
            }
            black_box(vm.collect().collected)
        })
    });
}

criterion_group!(
    benches,
    bench_scalar_churn,
    bench_rooted_survivors,
    bench_deep_chain_mark,
    bench_cyclic_graph_collect
);
criterion_main!(benches);
