use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use parallax_media::{CameraFeed, FeedPosition, PatternLayout, PatternSource, Plane};
use parallax_render::MemoryRenderer;

fn bench_feed_cycle(c: &mut Criterion) {
    let renderer = Arc::new(MemoryRenderer::new());
    let feed = CameraFeed::new("bench-rgb", FeedPosition::Unspecified, renderer.clone()).unwrap();
    feed.set_active(true).unwrap();

    let mut rgb = PatternSource::new(1280, 720, PatternLayout::Rgb, 0);
    let rgb_frame = rgb.next_frame().unwrap();
    c.bench_function("rgb_720p_write_read", |b| {
        b.iter(|| {
            if let Some(slot) = feed.begin_write() {
                feed.commit_frame(slot, &rgb_frame).unwrap();
            }
            feed.read_texture(Plane::Primary)
        })
    });

    // Separate feed so layout switches do not reallocate inside the timed loop.
    let feed = CameraFeed::new("bench-ycbcr", FeedPosition::Unspecified, renderer).unwrap();
    feed.set_active(true).unwrap();

    let mut yuv = PatternSource::new(1280, 720, PatternLayout::YCbCr, 0);
    let yuv_frame = yuv.next_frame().unwrap();
    c.bench_function("ycbcr_720p_write_read", |b| {
        b.iter(|| {
            if let Some(slot) = feed.begin_write() {
                feed.commit_frame(slot, &yuv_frame).unwrap();
            }
            feed.read_texture(Plane::Primary);
            feed.read_texture(Plane::Chroma)
        })
    });
}

criterion_group!(benches, bench_feed_cycle);
criterion_main!(benches);
