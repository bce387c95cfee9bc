//! Benchmarks for whole sessions

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use formcheck_core::{PipelineConfig, SkeletonLayout};
use formcheck_test::{PoseGenerator, PoseNoise, ScenarioBuilder};

fn bench_session_300_frames(c: &mut Criterion) {
    let mut generator = PoseGenerator::with_seed(SkeletonLayout::MediaPipe, 5);
    let reference = generator.track(300, &PoseNoise::none());
    let performed = generator.track(300, &PoseNoise::sloppy());

    c.bench_function("session_300_frames", |b| {
        b.iter_batched(
            || {
                ScenarioBuilder::new(PipelineConfig::default())
                    .performed(performed.clone())
                    .reference(reference.clone())
            },
            |scenario| scenario.run().unwrap(),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_session_300_frames);
criterion_main!(benches);
