//! Tracker benchmarks using Criterion.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Luma, Rgb};

use roi_tracker::depth::roi_depth_median;
use roi_tracker::filter::NoFilter;
use roi_tracker::{
    BoxFilter, CameraIntrinsics, ColorImage, DepthImage, DepthSamplingConfig, MotionFilter, Roi, RoiTracker,
    RoiTrackerConfig,
};

/// Frame with a two-tone square at `(x, y)`.
fn create_color_frame(x: u32, y: u32, size: u32) -> ColorImage {
    ColorImage::from_fn(320, 240, |px, py| {
        if px >= x && px < x + size && py >= y && py < y + size {
            if px - x < size / 2 {
                Rgb([240, 240, 240])
            } else {
                Rgb([40, 180, 220])
            }
        } else {
            Rgb([16, 16, 24])
        }
    })
}

/// Depth ramp with periodic holes.
fn create_depth_frame() -> DepthImage {
    DepthImage::from_fn(640, 480, |x, y| {
        if (x + y) % 17 == 0 {
            Luma([0])
        } else {
            Luma([(800 + x + y) as u16])
        }
    })
}

fn benchmark_motion_filter_predict_correct(c: &mut Criterion) {
    let mut filter = MotionFilter::default();
    filter.correct(&Roi::new(100.0, 80.0, 40.0, 40.0));

    let mut t = 0.0;
    c.bench_function("motion_filter_predict_correct", |b| {
        b.iter(|| {
            t += 1.0;
            black_box(filter.predict());
            filter.correct(black_box(&Roi::new(100.0 + t % 50.0, 80.0, 40.0, 40.0)));
        })
    });
}

fn benchmark_no_filter_predict_correct(c: &mut Criterion) {
    let mut filter = NoFilter::new();
    let roi = Roi::new(100.0, 80.0, 40.0, 40.0);

    c.bench_function("no_filter_predict_correct", |b| {
        b.iter(|| {
            filter.correct(black_box(&roi));
            black_box(filter.predict());
        })
    });
}

fn benchmark_depth_median_small_roi(c: &mut Criterion) {
    let depth = create_depth_frame();
    let config = DepthSamplingConfig::default();
    let roi = Roi::new(300.0, 220.0, 40.0, 40.0);

    c.bench_function("depth_median_40x40", |b| {
        b.iter(|| black_box(roi_depth_median(&depth, black_box(&roi), &config)))
    });
}

fn benchmark_depth_median_large_roi(c: &mut Criterion) {
    let depth = create_depth_frame();
    let config = DepthSamplingConfig::default();
    let roi = Roi::new(120.0, 90.0, 400.0, 300.0);

    c.bench_function("depth_median_400x300", |b| {
        b.iter(|| black_box(roi_depth_median(&depth, black_box(&roi), &config)))
    });
}

fn benchmark_deproject(c: &mut Criterion) {
    let intrinsics =
        CameraIntrinsics::from_pinhole(615.0, 615.0, 320.0, 240.0, [0.1, -0.05, 0.001, 0.001, 0.01]).expect("valid intrinsics");

    c.bench_function("deproject", |b| {
        b.iter(|| black_box(intrinsics.deproject(black_box(400.0), black_box(200.0), black_box(1500.0))))
    });
}

fn benchmark_tracker_update(c: &mut Criterion) {
    let mut tracker = RoiTracker::with_template_tracker(RoiTrackerConfig::default()).expect("valid tracker");
    tracker
        .set_camera_intrinsics(CameraIntrinsics::from_pinhole(300.0, 300.0, 160.0, 120.0, [0.0; 5]).expect("valid intrinsics"))
        .expect("valid intrinsics");

    let frames: Vec<ColorImage> = (0..2).map(|i| create_color_frame(100 + i, 80, 32)).collect();
    let depth = DepthImage::from_pixel(320, 240, Luma([1200]));

    tracker.init_roi(Roi::new(100.0, 80.0, 32.0, 32.0));
    tracker.update(&frames[0], Some(&depth));

    // Alternate between two positions so the search never settles on a
    // zero displacement
    let mut i = 0;
    c.bench_function("tracker_update_320x240", |b| {
        b.iter(|| {
            i = (i + 1) % frames.len();
            black_box(tracker.update(black_box(&frames[i]), Some(&depth)));
        })
    });
}

criterion_group!(
    benches,
    benchmark_motion_filter_predict_correct,
    benchmark_no_filter_predict_correct,
    benchmark_depth_median_small_roi,
    benchmark_depth_median_large_roi,
    benchmark_deproject,
    benchmark_tracker_update,
);
criterion_main!(benches);
