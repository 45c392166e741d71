//! Cone steering application: calibrates the driving direction from roadside
//! markers and then steers between blue and yellow cones.

use anyhow::{Context, Result};
use clap::Parser;
use cone_steering::{
    app::SteeringApp,
    config::{Config, EXAMPLE_CONFIG},
    frame_source::{CaptureSource, VideoSource},
    vehicle_bus::LocalBus,
};
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera index to use
    #[arg(long, conflicts_with = "video")]
    cam: Option<i32>,

    /// Video file to process
    #[arg(short, long)]
    video: Option<String>,

    /// Expected frame width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Expected frame height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Show the cleaned color masks
    #[arg(long)]
    verbose: bool,

    /// Run without any GUI windows
    #[arg(long)]
    no_display: bool,

    /// Label printed with every frame
    #[arg(short, long)]
    label: Option<String>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print an example configuration and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    /// Apply command line overrides on top of the loaded configuration
    fn apply_to(&self, config: &mut Config) {
        if let Some(width) = self.width {
            config.frame.width = width;
        }
        if let Some(height) = self.height {
            config.frame.height = height;
        }
        if self.verbose {
            config.display.verbose = true;
        }
        if self.no_display {
            config.display.enabled = false;
        }
        if let Some(label) = &self.label {
            config.display.label.clone_from(label);
        }
    }

    fn video_source(&self) -> VideoSource {
        match &self.video {
            Some(path) => VideoSource::File(path.clone()),
            None => VideoSource::Camera(self.cam.unwrap_or(0)),
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Cone Steering");

    // Configuration problems are fatal at startup
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        Config::from_file(config_path).with_context(|| format!("Failed to load config file {config_path}"))?
    } else {
        Config::default()
    };
    args.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;

    let source = CaptureSource::open(args.video_source(), config.frame.width, config.frame.height)
        .context("Failed to open video source")?;
    // Nothing publishes to this bus: the reference column stays empty and the
    // session ends with the stream, ESC/q or Ctrl-C
    let bus = LocalBus::new();
    info!("No vehicle reference source attached; reference steering will not be logged");

    // Create and run application
    let mut app = SteeringApp::new(config, source, bus)?;
    let summary = app.run()?;
    info!(
        "Processed {} frames, final direction {}, final angle {:.4}",
        summary.frames, summary.direction, summary.last_angle
    );

    Ok(())
}
