//! Frame transport: where frames come from.
//!
//! The pipeline only needs a blocking "next frame" call that hands over an
//! exclusively owned copy of the pixels together with a capture timestamp.

use crate::utils::safe_cast::{f64_to_i64, i32_to_u32};
use crate::{Error, Result};
use log::{info, warn};
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH};
use std::collections::VecDeque;
use std::time::Instant;

/// One captured frame
#[derive(Debug)]
pub struct Frame {
    /// BGR or BGRA pixels, owned by the current loop iteration
    pub image: Mat,
    /// Capture time in microseconds
    pub timestamp_us: i64,
}

/// Source of frames for the processing loop
pub trait FrameSource {
    /// Block until the next frame is available.
    ///
    /// Returns `Ok(None)` when the stream has ended normally.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` if the source failed or delivered a frame of
    /// the wrong size; the loop must not continue after that.
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Frame size `(width, height)` this source delivers
    fn frame_size(&self) -> (u32, u32);

    /// Human-readable source name for logs and window titles
    fn name(&self) -> &str;
}

/// Video source type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// Camera index
    Camera(i32),
    /// Video file path
    File(String),
}

/// Frames read through `OpenCV`'s video capture from a camera or a video file
pub struct CaptureSource {
    capture: VideoCapture,
    source: VideoSource,
    width: u32,
    height: u32,
    opened_at: Instant,
    name: String,
}

impl CaptureSource {
    /// Open a capture source expecting frames of `width` x `height`
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` if the camera or file cannot be opened or
    /// reports a frame size other than `width` x `height`
    pub fn open(source: VideoSource, width: u32, height: u32) -> Result<Self> {
        let (capture, name) = match &source {
            VideoSource::Camera(index) => {
                info!("Opening camera {}", index);
                let mut cap = VideoCapture::new(*index, videoio::CAP_ANY)?;

                // Keep at most one frame queued so the loop always sees the latest one
                if cap.set(CAP_PROP_BUFFERSIZE, 1.0)? {
                    info!("Camera buffer size set to 1 for low latency");
                }
                cap.set(CAP_PROP_FRAME_WIDTH, f64::from(width))?;
                cap.set(CAP_PROP_FRAME_HEIGHT, f64::from(height))?;

                (cap, format!("camera {index}"))
            }
            VideoSource::File(path) => {
                info!("Opening video file: {}", path);
                (VideoCapture::from_file(path, videoio::CAP_ANY)?, path.clone())
            }
        };

        if !capture.is_opened()? {
            return Err(Error::Transport(format!("Failed to open {name}")));
        }

        let reported = (capture.get(CAP_PROP_FRAME_WIDTH)?, capture.get(CAP_PROP_FRAME_HEIGHT)?);
        check_reported_size(&name, reported, (width, height))?;

        Ok(Self {
            capture,
            source,
            width,
            height,
            opened_at: Instant::now(),
            name,
        })
    }

    fn timestamp_us(&self) -> Result<i64> {
        match self.source {
            VideoSource::File(_) => f64_to_i64(self.capture.get(videoio::CAP_PROP_POS_MSEC)? * 1000.0),
            VideoSource::Camera(_) => i64::try_from(self.opened_at.elapsed().as_micros())
                .map_err(|_| Error::InvalidInput("Capture timestamp overflow".to_string())),
        }
    }
}

impl FrameSource for CaptureSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let mut image = Mat::default();
        if !self.capture.read(&mut image)? || image.empty() {
            return match self.source {
                VideoSource::File(_) => {
                    info!("End of video file reached");
                    Ok(None)
                }
                VideoSource::Camera(_) => Err(Error::Transport(format!("{} stopped delivering frames", self.name))),
            };
        }

        let size = (i32_to_u32(image.cols())?, i32_to_u32(image.rows())?);
        if size != (self.width, self.height) {
            return Err(Error::Transport(format!(
                "{} delivered a {}x{} frame, expected {}x{}",
                self.name, size.0, size.1, self.width, self.height
            )));
        }

        let timestamp_us = self.timestamp_us()?;
        Ok(Some(Frame { image, timestamp_us }))
    }

    fn frame_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Compare the size a capture device reports with the expected frame size.
///
/// Backends that cannot tell report 0; those are left to the per-frame check.
///
/// # Errors
///
/// Returns `Error::Transport` on a mismatch
pub fn check_reported_size(name: &str, reported: (f64, f64), expected: (u32, u32)) -> Result<()> {
    if reported.0 <= 0.0 || reported.1 <= 0.0 {
        warn!("{name} does not report its frame size, checking every frame instead");
        return Ok(());
    }

    let expected_f = (f64::from(expected.0), f64::from(expected.1));
    if (reported.0 - expected_f.0).abs() > 0.5 || (reported.1 - expected_f.1).abs() > 0.5 {
        return Err(Error::Transport(format!(
            "{name} delivers {}x{} frames, expected {}x{}",
            reported.0, reported.1, expected.0, expected.1
        )));
    }
    Ok(())
}

/// Frames queued in memory, for replays, tests and benchmarks
pub struct MemorySource {
    frames: VecDeque<Frame>,
    width: u32,
    height: u32,
}

impl MemorySource {
    /// Create an empty source for frames of `width` x `height`
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frames: VecDeque::new(),
            width,
            height,
        }
    }

    /// Queue images stamped `interval_us` apart, starting at 0
    ///
    /// # Errors
    ///
    /// Returns an error if an image does not match the frame size
    pub fn from_images(images: Vec<Mat>, width: u32, height: u32, interval_us: i64) -> Result<Self> {
        let mut source = Self::new(width, height);
        let mut timestamp_us = 0;
        for image in images {
            source.push(Frame { image, timestamp_us })?;
            timestamp_us += interval_us;
        }
        Ok(source)
    }

    /// Queue a frame
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` if the frame does not match the source size
    pub fn push(&mut self, frame: Frame) -> Result<()> {
        let size = (i32_to_u32(frame.image.cols())?, i32_to_u32(frame.image.rows())?);
        if size != (self.width, self.height) {
            return Err(Error::Transport(format!(
                "Frame of {}x{} does not match source size {}x{}",
                size.0, size.1, self.width, self.height
            )));
        }
        self.frames.push_back(frame);
        Ok(())
    }

    /// Number of frames still queued
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for MemorySource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        Ok(self.frames.pop_front())
    }

    fn frame_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
