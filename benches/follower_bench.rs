//! Performance benchmarks for score following
//!
//! One `step` must finish well within one hop (about 93 ms at 44.1 kHz with
//! the default hop of 4096) to keep up with live input.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stratum_follow::{
    AlignmentConfig, ChromaExtractor, Chromagram, FollowerConfig, OnlineTimeWarping,
    ReferencePreprocessor, ScoreFollower,
};

fn synth(seconds: usize) -> Vec<f32> {
    // Stepped pitch so the chromagram is not constant
    (0..44100 * seconds)
        .map(|i| {
            let note = (i / 8192) % 12;
            let freq = 261.63 * 2f32.powf(note as f32 / 12.0);
            (i as f32 * freq * 2.0 * std::f32::consts::PI / 44100.0).sin() * 0.5
        })
        .collect()
}

fn bench_chroma_extract(c: &mut Criterion) {
    let extractor = ChromaExtractor::new(44100, 8192, 0.0).unwrap();
    let frame = synth(1)[..8192].to_vec();

    c.bench_function("chroma_extract_8192", |b| {
        b.iter(|| extractor.extract(black_box(&frame)).unwrap());
    });
}

fn bench_reference_preprocess(c: &mut Criterion) {
    let samples = synth(30);
    let preprocessor = ReferencePreprocessor::new(&FollowerConfig::default()).unwrap();

    c.bench_function("reference_preprocess_30s", |b| {
        b.iter(|| preprocessor.process_samples(black_box(&samples), 44100).unwrap());
    });
}

fn bench_otw_insert(c: &mut Criterion) {
    let samples = synth(60);
    let reference: Chromagram = ReferencePreprocessor::new(&FollowerConfig::default())
        .unwrap()
        .process_samples(&samples, 44100)
        .unwrap();
    let live: Vec<Vec<f32>> = reference.columns().map(|c| c.to_vec()).collect();

    c.bench_function("otw_insert_full_reference", |b| {
        b.iter(|| {
            let mut otw = OnlineTimeWarping::new(reference.clone(), AlignmentConfig::default()).unwrap();
            for frame in &live {
                black_box(otw.insert(frame).unwrap());
            }
        });
    });
}

fn bench_follower_step(c: &mut Criterion) {
    let _ = env_logger::builder().is_test(true).try_init();

    let samples = synth(30);
    let config = FollowerConfig::default();
    let follower = ScoreFollower::from_reference_samples(&samples, 44100, config.clone()).unwrap();
    let frame = samples[..config.n_fft].to_vec();

    c.bench_function("follower_step", |b| {
        b.iter_batched(
            || follower.clone(),
            |mut f| f.step(black_box(&frame)).unwrap(),
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_chroma_extract,
    bench_reference_preprocess,
    bench_otw_insert,
    bench_follower_step
);
criterion_main!(benches);
