//! Constants used throughout the application

/// Default expected frame width in pixels
pub const DEFAULT_FRAME_WIDTH: u32 = 640;

/// Default expected frame height in pixels
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;

/// Side window used while calibrating the turning direction (x, y, width, height)
pub const DEFAULT_SIDE_ROI: (u32, u32, u32, u32) = (410, 255, 230, 100);

/// Center window used in steady state (x, y, width, height)
pub const DEFAULT_CENTER_ROI: (u32, u32, u32, u32) = (170, 255, 300, 100);

/// Blue cone hue bounds (min, max)
pub const DEFAULT_BLUE_HUE: (u8, u8) = (36, 147);

/// Blue cone saturation bounds (min, max)
pub const DEFAULT_BLUE_SATURATION: (u8, u8) = (85, 202);

/// Blue cone value bounds (min, max)
pub const DEFAULT_BLUE_VALUE: (u8, u8) = (46, 222);

/// Yellow cone hue bounds (min, max)
pub const DEFAULT_YELLOW_HUE: (u8, u8) = (0, 46);

/// Yellow cone saturation bounds (min, max)
pub const DEFAULT_YELLOW_SATURATION: (u8, u8) = (101, 221);

/// Yellow cone value bounds (min, max)
pub const DEFAULT_YELLOW_VALUE: (u8, u8) = (177, 255);

/// Largest hue value in OpenCV's 8-bit HSV representation
pub const HSV_HUE_MAX: u8 = 180;

/// Minimum contour area (pixels²) a blob needs to count as a cone
pub const DEFAULT_MIN_BLOB_AREA: f64 = 100.0;

/// Gaussian blur kernel size used by the mask cleaner
pub const DEFAULT_BLUR_KERNEL_SIZE: i32 = 5;

/// Side length of the rectangular structuring element
pub const DEFAULT_STRUCTURING_ELEMENT_SIZE: i32 = 3;

/// Frames spent looking for blue cones on the side window
pub const DEFAULT_CALIBRATION_SAMPLE_SIZE: u64 = 5;

/// Per-frame steering increment
pub const DEFAULT_STEERING_STEP: f64 = 0.025;

/// Lower steering bound
pub const DEFAULT_STEERING_MIN: f64 = -0.3;

/// Upper steering bound
pub const DEFAULT_STEERING_MAX: f64 = 0.3;

/// Label written into the per-frame log line and the overlay
pub const DEFAULT_LABEL: &str = "cone-steering";

/// ESC key code, stops the display loop
pub const KEY_ESCAPE: i32 = 27;

/// 'q' key code, stops the display loop
pub const KEY_QUIT: i32 = b'q' as i32;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
