//! Replay a synthetic RGB-D scene through the ROI tracker.
//!
//! A two-tone square moves at constant velocity over a dark background,
//! optionally hidden for a few frames. The tracker is initialized on the
//! square in the first frame and its 3-D estimate is logged every frame.

use anyhow::{Context, Result};
use clap::Parser;
use image::{Luma, Rgb};
use log::{info, warn};

use roi_tracker::overlay::draw_overlay;
use roi_tracker::{CameraIntrinsics, ColorImage, DepthImage, Roi, RoiTracker, RoiTrackerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of frames to replay
    #[arg(long, default_value = "60")]
    frames: u32,

    /// Frame width in pixels
    #[arg(long, default_value = "320")]
    width: u32,

    /// Frame height in pixels
    #[arg(long, default_value = "240")]
    height: u32,

    /// Side length of the target square in pixels
    #[arg(long, default_value = "32")]
    size: u32,

    /// Target velocity along x in pixels per frame
    #[arg(long, default_value = "2.0", allow_negative_numbers = true)]
    vx: f64,

    /// Target velocity along y in pixels per frame
    #[arg(long, default_value = "1.0", allow_negative_numbers = true)]
    vy: f64,

    /// Raw depth of the target
    #[arg(long, default_value = "1200")]
    target_depth: u16,

    /// Raw depth of the background
    #[arg(long, default_value = "3000")]
    background_depth: u16,

    /// First frame during which the target is hidden
    #[arg(long)]
    occlude_from: Option<u32>,

    /// Number of hidden frames
    #[arg(long, default_value = "5")]
    occlude_for: u32,

    /// Path to a JSON tracker configuration
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Write the overlay of the last frame to this PNG file
    #[arg(long)]
    overlay_out: Option<String>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

struct Scene {
    width: u32,
    height: u32,
    size: u32,
    target_depth: u16,
    background_depth: u16,
}

impl Scene {
    fn render(&self, target: Option<(i64, i64)>) -> (ColorImage, DepthImage) {
        let size = self.size as i64;
        let inside = |x: u32, y: u32| match target {
            Some((tx, ty)) => {
                let (x, y) = (x as i64, y as i64);
                x >= tx && x < tx + size && y >= ty && y < ty + size
            }
            None => false,
        };

        let color = ColorImage::from_fn(self.width, self.height, |x, y| {
            if !inside(x, y) {
                return Rgb([16, 16, 24]);
            }
            let (tx, _) = target.unwrap_or_default();
            if (x as i64 - tx) < size / 2 {
                Rgb([240, 240, 240])
            } else {
                Rgb([40, 180, 220])
            }
        });

        let depth = DepthImage::from_fn(self.width, self.height, |x, y| {
            if inside(x, y) {
                Luma([self.target_depth])
            } else {
                Luma([self.background_depth])
            }
        });

        (color, depth)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    let config = match &args.config {
        Some(path) => RoiTrackerConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path))?,
        None => RoiTrackerConfig::default(),
    };

    let mut tracker = RoiTracker::with_template_tracker(config)?;
    let intrinsics = CameraIntrinsics::from_pinhole(
        600.0,
        600.0,
        args.width as f64 / 2.0,
        args.height as f64 / 2.0,
        [0.0; 5],
    )?;
    tracker.set_camera_intrinsics(intrinsics)?;

    let scene = Scene {
        width: args.width,
        height: args.height,
        size: args.size,
        target_depth: args.target_depth,
        background_depth: args.background_depth,
    };

    let start = (args.width as f64 / 4.0, args.height as f64 / 4.0);
    let occluded = |frame: u32| match args.occlude_from {
        Some(from) => frame >= from && frame < from + args.occlude_for,
        None => false,
    };

    info!(
        "Replaying {} frames of {}x{}, target {}px moving ({}, {}) px/frame",
        args.frames, args.width, args.height, args.size, args.vx, args.vy
    );

    let mut last_color = None;
    let mut lost_frames = 0;
    for frame in 0..args.frames {
        let x = start.0 + args.vx * frame as f64;
        let y = start.1 + args.vy * frame as f64;
        let target = (!occluded(frame)).then_some((x.round() as i64, y.round() as i64));
        let (color, depth) = scene.render(target);

        if frame == 0 {
            tracker.init_roi(Roi::new(x.round(), y.round(), args.size as f64, args.size as f64));
        }

        let tracked = tracker.update(&color, Some(&depth));
        let p = tracker.position_3d();
        if tracked {
            info!(
                "frame {:3} Tracked   POS=[{:8.2}, {:8.2}, {:8.2}] ROI={:?}",
                frame, p.x, p.y, p.z, tracker.roi()
            );
        } else {
            lost_frames += 1;
            info!(
                "frame {:3} Predicted POS=[{:8.2}, {:8.2}, {:8.2}] ROI={:?}",
                frame, p.x, p.y, p.z, tracker.roi()
            );
        }

        last_color = Some(color);
    }

    if lost_frames > 0 {
        warn!("target lost in {} of {} frames", lost_frames, args.frames);
    }

    if let (Some(path), Some(mut color)) = (&args.overlay_out, last_color) {
        if let Some(text) = draw_overlay(&tracker, &mut color) {
            info!("overlay status: {}", text);
        }
        color
            .save(path)
            .with_context(|| format!("failed to write overlay {}", path))?;
        info!("overlay written to {}", path);
    }

    Ok(())
}
