//! Main application loop: frames in, steering angles out, plus diagnostics.

use crate::{
    calibration::Direction,
    config::Config,
    constants::{KEY_ESCAPE, KEY_QUIT},
    error::{Error, Result},
    frame_source::{Frame, FrameSource},
    pipeline::{FrameReport, Phase, SteeringPipeline},
    utils::{frame_log_line, overlay_text},
    vehicle_bus::VehicleBus,
};
use chrono::Utc;
use log::{debug, info};
use opencv::{
    core::{Mat, Point, Scalar},
    highgui::{self, WINDOW_NORMAL},
    imgproc::{self, FONT_HERSHEY_DUPLEX, LINE_8},
};

const FRAME_WINDOW: &str = "Cone Steering";
const BLUE_MASK_WINDOW: &str = "Blue Mask";
const YELLOW_MASK_WINDOW: &str = "Yellow Mask";

/// Summary returned when the loop ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Frames processed
    pub frames: u64,
    /// Direction at the end of the run
    pub direction: Direction,
    /// Angle after the last frame
    pub last_angle: f64,
}

/// Main application struct
pub struct SteeringApp<S: FrameSource, B: VehicleBus> {
    source: S,
    bus: B,
    pipeline: SteeringPipeline,
    config: Config,
}

impl<S: FrameSource, B: VehicleBus> SteeringApp<S, B> {
    /// Create the application
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the configuration is invalid or does not
    /// match the source's frame size, or an `OpenCV` error if windows cannot be created
    pub fn new(config: Config, source: S, bus: B) -> Result<Self> {
        info!("Initializing cone steering application");

        let source_size = source.frame_size();
        if source_size != (config.frame.width, config.frame.height) {
            return Err(Error::ConfigError(format!(
                "Source {} delivers {}x{} frames but the configuration expects {}x{}",
                source.name(),
                source_size.0,
                source_size.1,
                config.frame.width,
                config.frame.height
            )));
        }

        let pipeline = SteeringPipeline::new(&config)?.with_masks(config.display.enabled && config.display.verbose);

        // Create GUI windows if needed
        if config.display.enabled {
            highgui::named_window(FRAME_WINDOW, WINDOW_NORMAL)?;
            if config.display.verbose {
                highgui::named_window(BLUE_MASK_WINDOW, WINDOW_NORMAL)?;
                highgui::named_window(YELLOW_MASK_WINDOW, WINDOW_NORMAL)?;
            }
        }

        info!(
            "Calibrating direction over the first {} frames from {}",
            config.calibration.sample_size.saturating_sub(1),
            source.name()
        );

        Ok(Self {
            source,
            bus,
            pipeline,
            config,
        })
    }

    /// Run until the bus stops, the source ends or the user quits
    ///
    /// # Errors
    ///
    /// Returns an error on transport failures or if a frame does not match the
    /// configured size
    pub fn run(&mut self) -> Result<RunSummary> {
        info!("Starting main application loop");

        while self.bus.is_running() {
            let Some(frame) = self.source.next_frame()? else {
                break;
            };

            let report = self.pipeline.process(&frame.image)?;
            let reference = self.bus.reference_steering().map(|r| r.angle);

            println!(
                "{}",
                frame_log_line(&self.config.display.label, frame.timestamp_us, report.angle, reference)
            );

            if self.config.display.enabled {
                self.display_results(&frame, &report)?;

                let key = highgui::wait_key(1)?;
                if key == KEY_ESCAPE || key == KEY_QUIT {
                    info!("Exit requested by user");
                    break;
                }
            }
        }

        if !self.bus.is_running() {
            info!("Control session ended");
        }
        if self.config.display.enabled {
            highgui::destroy_all_windows()?;
        }

        let summary = RunSummary {
            frames: self.pipeline.frame_counter(),
            direction: self.pipeline.direction(),
            last_angle: self.pipeline.angle(),
        };
        info!(
            "Application shutting down after {} frames (direction {}, last angle {:.4})",
            summary.frames, summary.direction, summary.last_angle
        );
        Ok(summary)
    }

    /// Display results in GUI windows
    fn display_results(&self, frame: &Frame, report: &FrameReport) -> Result<()> {
        let mut display_frame = frame.image.clone();
        let display = &self.config.display;

        // Windows of interest; the active one is drawn thicker
        let (side_thickness, center_thickness) = match report.phase {
            Phase::Calibrating => (2, 1),
            Phase::Steering => (1, 2),
        };
        imgproc::rectangle(
            &mut display_frame,
            self.config.regions.side.to_rect()?,
            Scalar::new(255.0, 0.0, 0.0, 0.0),
            side_thickness,
            LINE_8,
            0,
        )?;
        imgproc::rectangle(
            &mut display_frame,
            self.config.regions.center.to_rect()?,
            Scalar::new(0.0, 255.0, 255.0, 0.0),
            center_thickness,
            LINE_8,
            0,
        )?;

        // Timestamp overlay
        imgproc::put_text(
            &mut display_frame,
            &overlay_text(Utc::now(), frame.timestamp_us, &display.label),
            Point::new(25, 50),
            FONT_HERSHEY_DUPLEX,
            0.5,
            Scalar::new(154.0, 250.0, 0.0, 0.0),
            1,
            LINE_8,
            false,
        )?;

        let status = format!("{:?} | {} | angle {:+.3}", report.phase, report.direction, report.angle);
        imgproc::put_text(
            &mut display_frame,
            &status,
            Point::new(25, 75),
            FONT_HERSHEY_DUPLEX,
            0.5,
            Scalar::new(154.0, 250.0, 0.0, 0.0),
            1,
            LINE_8,
            false,
        )?;

        highgui::imshow(FRAME_WINDOW, &display_frame)?;

        if display.verbose {
            if let Some(masks) = &report.masks {
                show_mask(BLUE_MASK_WINDOW, masks.blue.as_ref())?;
                show_mask(YELLOW_MASK_WINDOW, masks.yellow.as_ref())?;
            }
        }

        debug!("Displayed frame {}", report.frame_counter);
        Ok(())
    }
}

fn show_mask(window: &str, mask: Option<&Mat>) -> Result<()> {
    if let Some(mask) = mask {
        highgui::imshow(window, mask)?;
    }
    Ok(())
}
