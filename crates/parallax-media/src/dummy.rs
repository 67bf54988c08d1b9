use std::time::{Duration, Instant};

use parallax_render::{Image, ImageFormat};

use crate::{FramePlanes, MediaResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternLayout {
    Rgb,
    YCbCr,
}

/// Synthetic capture source producing flat-colored frames at a fixed rate.
pub struct PatternSource {
    start: Instant,
    seq: u64,
    fps: u16,
    width: u32,
    height: u32,
    layout: PatternLayout,
}

impl PatternSource {
    /// `fps == 0` produces frames as fast as they are requested.
    pub fn new(width: u32, height: u32, layout: PatternLayout, fps: u16) -> Self {
        Self {
            start: Instant::now(),
            seq: 0,
            fps,
            width,
            height,
            layout,
        }
    }

    pub fn frames_produced(&self) -> u64 {
        self.seq
    }

    pub fn next_frame(&mut self) -> MediaResult<FramePlanes> {
        // Simulate frame timing
        if self.fps > 0 {
            let frame_interval = Duration::from_secs_f64(1.0 / self.fps as f64);
            let target_time = self.start + frame_interval.mul_f64(self.seq as f64);
            if let Some(wait) = target_time.checked_duration_since(Instant::now()) {
                std::thread::sleep(wait);
            }
        }

        let shade = (self.seq % 256) as u8;
        self.seq += 1;

        let frame = match self.layout {
            PatternLayout::Rgb => {
                FramePlanes::Rgb(Image::filled(self.width, self.height, ImageFormat::Rgb8, shade)?)
            }
            PatternLayout::YCbCr => FramePlanes::YCbCr {
                luma: Image::filled(self.width, self.height, ImageFormat::L8, shade)?,
                // 4:2:0 subsampling
                chroma: Image::filled(
                    self.width.div_ceil(2),
                    self.height.div_ceil(2),
                    ImageFormat::Rg8,
                    0x80,
                )?,
            },
        };
        Ok(frame)
    }
}
