//! Parallax CLI tools: camera feed simulation, XR diagnostics.

#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use glam::Affine3A;
use parallax_common::Config;
use parallax_media::{CameraFeed, CameraServer, PatternLayout, PatternSource, Plane};
use parallax_render::MemoryRenderer;
use parallax_xr::{Eye, LocalXrServer, MixedRealityInterface, XrInterface};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "parallax")]
#[command(about = "Parallax CLI tools")]
struct Args {
    /// JSON configuration file
    #[arg(short, long, env = "PARALLAX_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a synthetic camera producer against a polling renderer
    Simulate {
        /// Number of render ticks to run
        #[arg(short, long, default_value_t = 120)]
        frames: u32,

        #[arg(long, default_value_t = 640)]
        width: u32,

        #[arg(long, default_value_t = 480)]
        height: u32,

        /// Produce luma + chroma frames instead of RGB
        #[arg(long)]
        ycbcr: bool,

        #[arg(long, default_value_t = 30)]
        capture_fps: u16,

        #[arg(long, default_value_t = 60)]
        render_fps: u16,
    },

    /// Print eye transforms and projection for the configured headset
    Eyes {
        #[arg(long, default_value_t = 1.0)]
        aspect: f32,

        #[arg(long, default_value_t = 0.05)]
        z_near: f32,

        #[arg(long, default_value_t = 100.0)]
        z_far: f32,

        /// Override the configured world scale
        #[arg(long)]
        world_scale: Option<f32>,
    },

    /// Print the effective configuration
    ShowConfig,

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    parallax_common::init_tracing();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    match args.command {
        Command::Simulate {
            frames,
            width,
            height,
            ycbcr,
            capture_fps,
            render_fps,
        } => {
            let layout = if ycbcr {
                PatternLayout::YCbCr
            } else {
                PatternLayout::Rgb
            };
            simulate(&config, frames, width, height, layout, capture_fps, render_fps)?;
        }
        Command::Eyes {
            aspect,
            z_near,
            z_far,
            world_scale,
        } => {
            let mut xr = config.xr.clone();
            if let Some(scale) = world_scale {
                xr.world_scale = scale;
            }
            eyes(xr, aspect, z_near, z_far)?;
        }
        Command::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Command::Version => {
            println!("parallax {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn simulate(
    config: &Config,
    frames: u32,
    width: u32,
    height: u32,
    layout: PatternLayout,
    capture_fps: u16,
    render_fps: u16,
) -> Result<()> {
    if render_fps == 0 {
        return Err(anyhow!("render fps must be non-zero"));
    }

    let renderer = Arc::new(MemoryRenderer::new());
    let cameras = CameraServer::new();
    let feed = Arc::new(CameraFeed::from_config(&config.camera, renderer)?);
    cameras.add_feed(feed.clone())?;
    feed.set_active(true)?;

    let stop = Arc::new(AtomicBool::new(false));
    let producer = {
        let feed = feed.clone();
        let stop = stop.clone();
        std::thread::spawn(move || -> Result<(u64, u64)> {
            let mut source = PatternSource::new(width, height, layout, capture_fps);
            let (mut committed, mut dropped) = (0u64, 0u64);
            while !stop.load(Ordering::Relaxed) {
                let frame = source.next_frame()?;
                match feed.begin_write() {
                    Some(slot) => {
                        feed.commit_frame(slot, &frame)?;
                        committed += 1;
                    }
                    None => dropped += 1,
                }
            }
            Ok((committed, dropped))
        })
    };

    let tick = Duration::from_secs_f64(1.0 / render_fps as f64);
    let mut fresh = 0u64;
    let mut last = None;
    for _ in 0..frames {
        let texture = cameras
            .feed_texture(feed.id(), Plane::Primary)
            .ok_or_else(|| anyhow!("feed {} disappeared", feed.id()))?;
        if layout == PatternLayout::YCbCr {
            cameras.feed_texture(feed.id(), Plane::Chroma);
        }
        if last != Some(texture) {
            fresh += 1;
            last = Some(texture);
        }
        std::thread::sleep(tick);
    }

    stop.store(true, Ordering::Relaxed);
    let (committed, dropped) = producer
        .join()
        .map_err(|_| anyhow!("producer thread panicked"))??;
    feed.set_active(false)?;

    info!(committed, dropped, fresh, "simulation finished");
    println!("Feed:       {} ({})", feed.name(), feed.id());
    println!("Committed:  {}", committed);
    println!("Dropped:    {}", dropped);
    println!("Displayed:  {} distinct of {} ticks", fresh, frames);
    Ok(())
}

fn eyes(xr: parallax_common::XrConfig, aspect: f32, z_near: f32, z_far: f32) -> Result<()> {
    let server = Arc::new(LocalXrServer::from_config(&xr)?);
    let renderer = Arc::new(MemoryRenderer::new());
    let iface = MixedRealityInterface::new(xr, server.clone(), renderer)?;
    iface.initialize()?;
    server.set_primary_interface(iface.name());

    let size = iface.render_target_size();
    let mut report = serde_json::json!({
        "interface": iface.name(),
        "stereo": iface.is_stereo(),
        "render_target": [size.x, size.y],
        "projection": iface.projection_for_eye(Eye::Mono, aspect, z_near, z_far).to_cols_array(),
    });
    for (label, eye) in [("mono", Eye::Mono), ("left", Eye::Left), ("right", Eye::Right)] {
        let transform = iface.transform_for_eye(eye, Affine3A::IDENTITY);
        report[label] = serde_json::json!({
            "origin": transform.translation.to_array(),
        });
    }
    println!("{}", serde_json::to_string_pretty(&report)?);

    iface.uninitialize();
    Ok(())
}
