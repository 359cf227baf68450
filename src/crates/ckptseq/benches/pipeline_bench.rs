use ckptseq::{BlockwiseShuffle, ChunkedSource, Map, NativeSource, Stage};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sample_data(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn pipeline_throughput_benchmark(c: &mut Criterion) {
    let data = sample_data(10_000);

    c.bench_function("chunked source drain", |b| {
        b.iter(|| {
            let mut stage = ChunkedSource::new(data.clone(), 4, 0).unwrap();
            while let Some(item) = stage.next().unwrap() {
                black_box(item);
            }
        });
    });

    c.bench_function("map over chunked source drain", |b| {
        b.iter(|| {
            let mut stage = Map::new(ChunkedSource::new(data.clone(), 4, 0).unwrap(), |x: i64| x * 2);
            while let Some(item) = stage.next().unwrap() {
                black_box(item);
            }
        });
    });

    c.bench_function("blockwise shuffle drain", |b| {
        b.iter(|| {
            let mut stage = BlockwiseShuffle::new(NativeSource::new(data.clone()), 256, 42).unwrap();
            while let Some(item) = stage.next().unwrap() {
                black_box(item);
            }
        });
    });
}

fn checkpoint_overhead_benchmark(c: &mut Criterion) {
    let data = sample_data(10_000);

    c.bench_function("getstate mid-stream", |b| {
        let mut stage = ChunkedSource::new(data.clone(), 1, 0).unwrap();
        for _ in 0..5_000 {
            stage.next().unwrap();
        }
        b.iter(|| black_box(stage.getstate()));
    });

    c.bench_function("setstate mid-stream restore", |b| {
        let mut stage = ChunkedSource::new(data.clone(), 1, 0).unwrap();
        for _ in 0..5_000 {
            stage.next().unwrap();
        }
        let token = stage.getstate();
        b.iter(|| stage.setstate(Some(token.clone())).unwrap());
    });
}

criterion_group!(benches, pipeline_throughput_benchmark, checkpoint_overhead_benchmark);
criterion_main!(benches);
